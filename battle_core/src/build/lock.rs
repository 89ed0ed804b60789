//! SpellLockCoordinator - paid unlocking of locked slots
//!
//! Unlocking touches three owners at once: the build slot, the player's
//! collection and the economy ledger. Each operation checks every
//! precondition before mutating any of them.

use super::collection::SpellCollection;
use super::manager::{BuildSlotManager, EquipReport};
use super::slot::SlotState;
use crate::config::RulesConfig;
use crate::economy::EconomyLedger;
use crate::error::{RulesError, RulesResult, Shortfall};
use crate::events::{EventSink, GameEvent};
use crate::hero::Hero;
use crate::types::{BuildType, Currency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a slot unlock was paid for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum UnlockPayment {
    /// One inventory item consumed
    Item { item: String },
    /// Gems spent
    Gems { amount: u64 },
}

/// Outcome of a single slot unlock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockReport {
    pub build: BuildType,
    pub slot: usize,
    pub spell_id: String,
    pub payment: UnlockPayment,
    pub unlocked_at: DateTime<Utc>,
}

/// Outcome of clearing a whole build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReport {
    pub build: BuildType,
    pub slots_unlocked: usize,
    pub items_used: u64,
    pub gems_spent: u64,
    /// Spells returned to the collection, in slot order
    pub returned: Vec<String>,
}

/// Whether a slot could be unlocked right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockCheck {
    pub can_unlock: bool,
    pub has_item: bool,
    pub has_gems: bool,
    pub reason: Option<String>,
}

/// Equips through `BuildSlotManager` and unlocks against the ledger
pub struct SpellLockCoordinator<'a> {
    slots: BuildSlotManager<'a>,
}

impl<'a> SpellLockCoordinator<'a> {
    pub fn new(rules: &'a RulesConfig) -> Self {
        SpellLockCoordinator {
            slots: BuildSlotManager::new(rules),
        }
    }

    pub fn slots(&self) -> &BuildSlotManager<'a> {
        &self.slots
    }

    fn unlocker_item(&self) -> &'a str {
        &self.slots.rules().economy.spell_unlocker_item
    }

    fn gem_cost(&self) -> u64 {
        self.slots.rules().economy.spell_unlocker_gem_cost
    }

    pub fn equip(
        &self,
        hero: &mut Hero,
        build: BuildType,
        index: usize,
        spell_id: &str,
        collection: &mut SpellCollection,
        events: &mut impl EventSink,
    ) -> RulesResult<EquipReport> {
        self.slots.equip(hero, build, index, spell_id, collection, events)
    }

    /// Unlock a slot, paying with a Spell Unlocker when one is owned and
    /// with gems otherwise
    pub fn unlock(
        &self,
        hero: &mut Hero,
        build: BuildType,
        index: usize,
        ledger: &mut EconomyLedger,
        collection: &mut SpellCollection,
        events: &mut impl EventSink,
    ) -> RulesResult<UnlockReport> {
        self.locked_spell_id(hero, build, index, collection)?;

        let item = self.unlocker_item();
        if ledger.item_count(item) > 0 {
            return self.unlock_with_item(hero, build, index, ledger, collection, events);
        }
        if ledger.can_afford(Currency::Gems, self.gem_cost()) {
            return self.unlock_with_gems(hero, build, index, ledger, collection, events);
        }

        Err(RulesError::insufficient(
            format!(
                "need a {} or {} gems to unlock {} slot {}",
                item,
                self.gem_cost(),
                build,
                index
            ),
            vec![
                Shortfall::item(item, 1, 0),
                Shortfall::currency(Currency::Gems, self.gem_cost(), ledger.balance(Currency::Gems)),
            ],
        ))
    }

    /// Unlock a slot by consuming one Spell Unlocker
    pub fn unlock_with_item(
        &self,
        hero: &mut Hero,
        build: BuildType,
        index: usize,
        ledger: &mut EconomyLedger,
        collection: &mut SpellCollection,
        events: &mut impl EventSink,
    ) -> RulesResult<UnlockReport> {
        self.locked_spell_id(hero, build, index, collection)?;

        let item = self.unlocker_item();
        ledger.consume_item(item, 1)?;
        let payment = UnlockPayment::Item {
            item: item.to_string(),
        };
        self.release(hero, build, index, payment, collection, events)
    }

    /// Unlock a slot by paying gems
    pub fn unlock_with_gems(
        &self,
        hero: &mut Hero,
        build: BuildType,
        index: usize,
        ledger: &mut EconomyLedger,
        collection: &mut SpellCollection,
        events: &mut impl EventSink,
    ) -> RulesResult<UnlockReport> {
        let spell_id = self.locked_spell_id(hero, build, index, collection)?;

        let cost = self.gem_cost();
        ledger.spend(Currency::Gems, cost, &format!("unlock {}", spell_id))?;
        self.release(hero, build, index, UnlockPayment::Gems { amount: cost }, collection, events)
    }

    /// Unlock every locked slot of a build in one transaction
    ///
    /// Spell Unlockers pay for slots while they last, gems pay for the
    /// rest. When the two together fall short nothing changes and both
    /// shortfalls are reported.
    pub fn clear_build(
        &self,
        hero: &mut Hero,
        build: BuildType,
        ledger: &mut EconomyLedger,
        collection: &mut SpellCollection,
        events: &mut impl EventSink,
    ) -> RulesResult<ClearReport> {
        let locked: Vec<usize> = hero
            .build(build)
            .slots()
            .iter()
            .filter(|slot| slot.is_locked())
            .map(|slot| slot.index())
            .collect();

        if locked.is_empty() {
            return Ok(ClearReport {
                build,
                slots_unlocked: 0,
                items_used: 0,
                gems_spent: 0,
                returned: Vec::new(),
            });
        }
        for &index in &locked {
            self.locked_spell_id(hero, build, index, collection)?;
        }

        // Step 1: price the whole build
        let item = self.unlocker_item();
        let needed = locked.len() as u64;
        let owned = ledger.item_count(item);
        let items_used = owned.min(needed);
        let gems_needed = (needed - items_used) * self.gem_cost();
        let gems_owned = ledger.balance(Currency::Gems);

        if gems_owned < gems_needed {
            return Err(RulesError::insufficient(
                format!("clearing {} build needs {} unlocks", build, needed),
                vec![
                    Shortfall::item(item, needed, owned),
                    Shortfall::currency(Currency::Gems, gems_needed, gems_owned),
                ],
            ));
        }

        // Step 2: pay
        if items_used > 0 {
            ledger.consume_item(item, items_used)?;
        }
        if gems_needed > 0 {
            ledger.spend(Currency::Gems, gems_needed, &format!("clear {} build", build))?;
        }

        // Step 3: return every spell
        let mut returned = Vec::with_capacity(locked.len());
        for &index in &locked {
            let spell = hero.build_mut(build).slot_mut(index)?.release()?;
            returned.push(spell.id.clone());
            collection.add(spell)?;
        }

        debug!(
            "Cleared {} build of {}: {} slots, {} items, {} gems",
            build,
            hero.id(),
            returned.len(),
            items_used,
            gems_needed
        );
        events.publish(GameEvent::BuildCleared {
            hero_id: hero.id().to_string(),
            build,
            slots_unlocked: returned.len(),
            items_used,
            gems_spent: gems_needed,
            at: Utc::now(),
        });

        Ok(ClearReport {
            build,
            slots_unlocked: returned.len(),
            items_used,
            gems_spent: gems_needed,
            returned,
        })
    }

    pub fn can_unlock_slot(
        &self,
        hero: &Hero,
        build: BuildType,
        index: usize,
        ledger: &EconomyLedger,
    ) -> UnlockCheck {
        let has_item = ledger.item_count(self.unlocker_item()) > 0;
        let has_gems = ledger.can_afford(Currency::Gems, self.gem_cost());

        let reason = match hero.build(build).slot(index) {
            Err(err) => Some(err.to_string()),
            Ok(slot) if slot.state() != SlotState::Locked => {
                Some(format!("{} slot {} is not locked", build, index))
            }
            Ok(_) if !has_item && !has_gems => Some(format!(
                "need a {} or {} gems",
                self.unlocker_item(),
                self.gem_cost()
            )),
            Ok(_) => None,
        };

        UnlockCheck {
            can_unlock: reason.is_none(),
            has_item,
            has_gems,
            reason,
        }
    }

    /// Id of the spell in a locked slot, checking it can go back to the
    /// collection
    fn locked_spell_id(
        &self,
        hero: &Hero,
        build: BuildType,
        index: usize,
        collection: &SpellCollection,
    ) -> RulesResult<String> {
        let slot = hero.build(build).slot(index)?;
        if !slot.is_locked() {
            return Err(RulesError::invalid_state(format!(
                "{} slot {} is not locked",
                build, index
            )));
        }
        let spell = slot.spell().ok_or_else(|| {
            RulesError::invalid_state(format!("{} slot {} holds no spell", build, index))
        })?;
        if collection.contains(&spell.id) {
            return Err(RulesError::invalid_state(format!(
                "spell '{}' is already in the collection",
                spell.id
            )));
        }
        Ok(spell.id.clone())
    }

    fn release(
        &self,
        hero: &mut Hero,
        build: BuildType,
        index: usize,
        payment: UnlockPayment,
        collection: &mut SpellCollection,
        events: &mut impl EventSink,
    ) -> RulesResult<UnlockReport> {
        let slot = hero.build_mut(build).slot_mut(index)?;
        let spell = slot.release()?;
        let unlocked_at = slot.unlocked_at().unwrap_or_else(Utc::now);
        let spell_id = spell.id.clone();
        collection.add(spell)?;

        debug!(
            "Unlocked {} slot {} of {} ({:?}), {} returned to collection",
            build,
            index,
            hero.id(),
            payment,
            spell_id
        );
        events.publish(GameEvent::SpellUnlocked {
            hero_id: hero.id().to_string(),
            build,
            slot: index,
            spell_id: spell_id.clone(),
            payment: payment.clone(),
            at: unlocked_at,
        });

        Ok(UnlockReport {
            build,
            slot: index,
            spell_id,
            payment,
            unlocked_at,
        })
    }
}
