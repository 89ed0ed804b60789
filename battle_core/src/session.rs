//! GameSession - one player's rules, state and event bus in one place
//!
//! The session owns the single `Hero`, `EconomyLedger` and spell collection
//! of a player and hands borrowed views of them to the rule components. All
//! access goes through `&mut self`, so operations never interleave.

use crate::build::{
    BattleCheck, BuildChange, BuildSlotManager, BuildStatus, ClearReport, EquipReport,
    SpellCollection, SpellLockCoordinator, UnlockReport,
};
use crate::combat::DamageResolver;
use crate::config::RulesConfig;
use crate::economy::{Conversion, EconomyLedger, PackagePurchase, Purchase, Receipt};
use crate::effects::StatusEffectTracker;
use crate::error::{RulesError, RulesResult};
use crate::events::{EventBus, EventSink, GameEvent};
use crate::hero::{DeathReport, Hero, HeroLifecycleManager, RevivalInfo, RevivalReport};
use crate::persistence::{Persistence, PersistenceError, PlayerState};
use crate::spell::Spell;
use crate::types::{BuildType, Currency};
use chrono::Utc;
use tracing::{info, warn};

/// Single-player facade over the rules core
pub struct GameSession {
    rules: RulesConfig,
    state: PlayerState,
    events: EventBus,
    /// Set by `enter_battle`, cleared by `end_battle` and `handle_defeat`
    in_battle: bool,
}

impl GameSession {
    /// New player with starting balances
    pub fn new(rules: RulesConfig, hero_id: &str, hero_name: &str) -> Self {
        let state = PlayerState::new(&rules, hero_id, hero_name);
        Self::from_state(rules, state)
    }

    pub fn from_state(rules: RulesConfig, state: PlayerState) -> Self {
        GameSession {
            rules,
            state,
            events: EventBus::new(),
            in_battle: false,
        }
    }

    /// Resume from a store; `None` when the store is empty
    pub fn load(rules: RulesConfig, store: &impl Persistence) -> Result<Option<Self>, PersistenceError> {
        let Some(state) = store.load()? else {
            return Ok(None);
        };
        let state = state.restore(&rules)?;
        info!(
            "Loaded player state for hero {} (level {})",
            state.hero.id(),
            state.player_level
        );
        Ok(Some(Self::from_state(rules, state)))
    }

    pub fn save(&self, store: &mut impl Persistence) -> Result<(), PersistenceError> {
        store.save(&self.state).map_err(|err| {
            warn!("Failed to save hero {}: {}", self.state.hero.id(), err);
            err
        })
    }

    // === Accessors ===

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn hero(&self) -> &Hero {
        &self.state.hero
    }

    pub fn ledger(&self) -> &EconomyLedger {
        &self.state.ledger
    }

    pub fn collection(&self) -> &SpellCollection {
        &self.state.collection
    }

    /// Subscribe and unsubscribe observers here
    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn player_level(&self) -> u32 {
        self.state.player_level
    }

    pub fn set_player_level(&mut self, level: u32) -> RulesResult<()> {
        if level == 0 {
            return Err(RulesError::validation("player level starts at 1"));
        }
        self.state.player_level = level;
        Ok(())
    }

    pub fn in_battle(&self) -> bool {
        self.in_battle
    }

    pub fn resolver(&self) -> DamageResolver<'_> {
        DamageResolver::new(&self.rules)
    }

    pub fn status_effects(&self) -> StatusEffectTracker<'_> {
        StatusEffectTracker::new(&self.rules)
    }

    // === Economy ===

    pub fn award(&mut self, currency: Currency, amount: u64, source: &str) -> RulesResult<Receipt> {
        let receipt = self.state.ledger.award(currency, amount, source)?;
        if currency == Currency::Souls {
            self.souls_gained(amount, source);
        }
        Ok(receipt)
    }

    pub fn spend(&mut self, currency: Currency, amount: u64, purpose: &str) -> RulesResult<Receipt> {
        let receipt = self.state.ledger.spend(currency, amount, purpose)?;
        if currency == Currency::Souls {
            self.events.publish(GameEvent::SoulsSpent {
                amount,
                balance: receipt.balance_after,
                purpose: purpose.to_string(),
                at: Utc::now(),
            });
        }
        Ok(receipt)
    }

    pub fn convert(&mut self, gold_amount: u64) -> RulesResult<Conversion> {
        let conversion = self.state.ledger.convert(gold_amount)?;
        self.souls_gained(conversion.souls_gained, "gold conversion");
        Ok(conversion)
    }

    pub fn purchase_soul_package(&mut self, package_id: &str) -> RulesResult<PackagePurchase> {
        let purchase = self.state.ledger.purchase_soul_package(package_id)?;
        self.souls_gained(purchase.souls_gained, &format!("soul package {}", package_id));
        Ok(purchase)
    }

    pub fn purchase_spell_unlocker(&mut self) -> RulesResult<Purchase> {
        self.state.ledger.purchase_spell_unlocker()
    }

    pub fn grant_item(&mut self, item: &str, quantity: u64, source: &str) -> RulesResult<u64> {
        self.state.ledger.grant_item(item, quantity, source)
    }

    fn souls_gained(&mut self, amount: u64, source: &str) {
        self.events.publish(GameEvent::SoulsGained {
            amount,
            balance: self.state.ledger.balance(Currency::Souls),
            source: source.to_string(),
            at: Utc::now(),
        });
    }

    // === Hero ===

    /// Record a lost battle
    pub fn handle_defeat(&mut self) -> RulesResult<DeathReport> {
        let report =
            HeroLifecycleManager::new(&self.rules).die(&mut self.state.hero, &mut self.events)?;
        self.in_battle = false;
        Ok(report)
    }

    pub fn revive(&mut self) -> RulesResult<RevivalReport> {
        HeroLifecycleManager::new(&self.rules).revive(
            &mut self.state.hero,
            &mut self.state.ledger,
            &mut self.events,
        )
    }

    pub fn revival_info(&self) -> RevivalInfo {
        HeroLifecycleManager::new(&self.rules)
            .revival_info(&self.state.hero, self.state.ledger.balance(Currency::Souls))
    }

    // === Builds ===

    /// Add a new spell to the collection
    pub fn add_spell(&mut self, spell: Spell) -> RulesResult<()> {
        if let Some((build, slot)) = self.state.hero.find_equipped(&spell.id) {
            return Err(RulesError::invalid_state(format!(
                "spell '{}' is already equipped in {} slot {}",
                spell.id, build, slot
            )));
        }
        self.state.collection.add(spell)
    }

    pub fn equip(&mut self, build: BuildType, index: usize, spell_id: &str) -> RulesResult<EquipReport> {
        SpellLockCoordinator::new(&self.rules).equip(
            &mut self.state.hero,
            build,
            index,
            spell_id,
            &mut self.state.collection,
            &mut self.events,
        )
    }

    pub fn unlock(&mut self, build: BuildType, index: usize) -> RulesResult<UnlockReport> {
        SpellLockCoordinator::new(&self.rules).unlock(
            &mut self.state.hero,
            build,
            index,
            &mut self.state.ledger,
            &mut self.state.collection,
            &mut self.events,
        )
    }

    pub fn switch_build(&mut self, target: BuildType) -> RulesResult<BuildChange> {
        BuildSlotManager::new(&self.rules).switch_active_build(
            &mut self.state.hero,
            target,
            self.state.player_level,
            self.in_battle,
            &mut self.events,
        )
    }

    pub fn copy_build(&mut self, from: BuildType, to: BuildType) -> RulesResult<BuildChange> {
        BuildSlotManager::new(&self.rules).copy_build(
            &mut self.state.hero,
            from,
            to,
            self.state.player_level,
            &mut self.state.collection,
            &mut self.events,
        )
    }

    pub fn clear_build(&mut self, build: BuildType) -> RulesResult<ClearReport> {
        SpellLockCoordinator::new(&self.rules).clear_build(
            &mut self.state.hero,
            build,
            &mut self.state.ledger,
            &mut self.state.collection,
            &mut self.events,
        )
    }

    pub fn build_status(&self) -> BuildStatus {
        BuildSlotManager::new(&self.rules).build_status(&self.state.hero, self.state.player_level)
    }

    pub fn can_enter_battle(&self) -> BattleCheck {
        BuildSlotManager::new(&self.rules).can_enter_battle(&self.state.hero)
    }

    /// Battle entry guard; marks the session as in battle on success
    pub fn enter_battle(&mut self) -> RulesResult<()> {
        if self.in_battle {
            return Err(RulesError::invalid_state("already in battle"));
        }
        let check = self.can_enter_battle();
        if !check.can_battle {
            return Err(RulesError::invalid_state(
                check.reason.unwrap_or_else(|| "hero cannot battle".to_string()),
            ));
        }
        self.in_battle = true;
        Ok(())
    }

    /// Leave a battle the hero survived
    pub fn end_battle(&mut self) {
        self.in_battle = false;
    }
}
