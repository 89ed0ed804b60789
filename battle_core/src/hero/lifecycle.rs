//! HeroLifecycleManager - death and soul-paid revival

use super::model::Hero;
use crate::config::RulesConfig;
use crate::economy::EconomyLedger;
use crate::error::{RulesError, RulesResult};
use crate::events::{EventSink, GameEvent};
use crate::types::{Currency, HeroStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of a hero's death
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathReport {
    pub death_count: u32,
    pub revival_cost: u64,
    pub at: DateTime<Utc>,
}

/// Outcome of a revival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevivalReport {
    pub souls_spent: u64,
    pub souls_remaining: u64,
    pub death_count: u32,
    pub next_revival_cost: u64,
}

/// What reviving would take right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevivalInfo {
    pub status: HeroStatus,
    pub cost: u64,
    pub souls: u64,
    /// Souls still missing, zero when affordable
    pub shortfall: u64,
    pub can_revive: bool,
    pub death_count: u32,
    pub last_death_at: Option<DateTime<Utc>>,
}

/// Lifetime death figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathStats {
    pub death_count: u32,
    pub status: HeroStatus,
    pub current_revival_cost: u64,
    /// Souls paid for every revival so far
    pub total_souls_spent: u64,
    pub last_death_at: Option<DateTime<Utc>>,
}

/// Drives the Alive -> Dead -> Alive cycle
pub struct HeroLifecycleManager<'a> {
    rules: &'a RulesConfig,
}

impl<'a> HeroLifecycleManager<'a> {
    pub fn new(rules: &'a RulesConfig) -> Self {
        HeroLifecycleManager { rules }
    }

    /// Mark a living hero dead and price the revival
    pub fn die(&self, hero: &mut Hero, events: &mut impl EventSink) -> RulesResult<DeathReport> {
        if !hero.is_alive() {
            return Err(RulesError::invalid_state(format!(
                "hero '{}' is already dead",
                hero.id()
            )));
        }

        let at = Utc::now();
        hero.mark_dead(&self.rules.revival, at);

        debug!(
            "Hero {} died (deaths {}, revival cost {})",
            hero.id(),
            hero.death_count(),
            hero.revival_cost()
        );
        events.publish(GameEvent::HeroDied {
            hero_id: hero.id().to_string(),
            death_count: hero.death_count(),
            revival_cost: hero.revival_cost(),
            at,
        });

        Ok(DeathReport {
            death_count: hero.death_count(),
            revival_cost: hero.revival_cost(),
            at,
        })
    }

    /// Spend exactly the revival cost in souls and bring the hero back
    pub fn revive(
        &self,
        hero: &mut Hero,
        ledger: &mut EconomyLedger,
        events: &mut impl EventSink,
    ) -> RulesResult<RevivalReport> {
        if hero.is_alive() {
            return Err(RulesError::invalid_state(format!(
                "hero '{}' is alive",
                hero.id()
            )));
        }

        let cost = hero.revival_cost();
        let receipt = ledger.spend(Currency::Souls, cost, &format!("revive {}", hero.id()))?;
        hero.mark_revived(&self.rules.revival);

        debug!(
            "Hero {} revived for {} souls (next revival {})",
            hero.id(),
            cost,
            hero.revival_cost()
        );
        let at = Utc::now();
        events.publish(GameEvent::SoulsSpent {
            amount: cost,
            balance: receipt.balance_after,
            purpose: format!("revive {}", hero.id()),
            at,
        });
        events.publish(GameEvent::HeroRevived {
            hero_id: hero.id().to_string(),
            death_count: hero.death_count(),
            souls_spent: cost,
            next_revival_cost: hero.revival_cost(),
            at,
        });

        Ok(RevivalReport {
            souls_spent: cost,
            souls_remaining: receipt.balance_after,
            death_count: hero.death_count(),
            next_revival_cost: hero.revival_cost(),
        })
    }

    /// Alive with a complete active build
    pub fn can_battle(&self, hero: &Hero) -> bool {
        hero.is_battle_ready()
    }

    pub fn can_revive(&self, hero: &Hero, souls: u64) -> bool {
        !hero.is_alive() && souls >= hero.revival_cost()
    }

    pub fn revival_info(&self, hero: &Hero, souls: u64) -> RevivalInfo {
        let cost = hero.revival_cost();
        RevivalInfo {
            status: hero.status(),
            cost,
            souls,
            shortfall: cost.saturating_sub(souls),
            can_revive: self.can_revive(hero, souls),
            death_count: hero.death_count(),
            last_death_at: hero.last_death_at(),
        }
    }

    /// Cost of one revival after `death_count` earlier ones
    pub fn revival_cost(&self, death_count: u32) -> u64 {
        self.rules.revival.cost_for(death_count)
    }

    /// Souls needed for `revivals` consecutive revivals starting at
    /// `death_count`
    pub fn estimate_soul_cost(&self, death_count: u32, revivals: u32) -> u64 {
        (0..revivals)
            .map(|i| self.revival_cost(death_count.saturating_add(i)))
            .sum()
    }

    pub fn death_stats(&self, hero: &Hero) -> DeathStats {
        DeathStats {
            death_count: hero.death_count(),
            status: hero.status(),
            current_revival_cost: hero.revival_cost(),
            total_souls_spent: self.estimate_soul_cost(0, hero.death_count()),
            last_death_at: hero.last_death_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Resource};

    fn setup() -> (RulesConfig, Hero) {
        let rules = RulesConfig::default();
        let hero = Hero::new("h", "Hero", &rules.revival);
        (rules, hero)
    }

    #[test]
    fn test_die_twice_fails() {
        let (rules, mut hero) = setup();
        let lifecycle = HeroLifecycleManager::new(&rules);
        let mut events: Vec<GameEvent> = Vec::new();

        let report = lifecycle.die(&mut hero, &mut events).unwrap();
        assert_eq!(report.revival_cost, 10);
        assert_eq!(hero.status(), HeroStatus::Dead);

        let err = lifecycle.die(&mut hero, &mut events).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_revive_short_on_souls() {
        let (rules, mut hero) = setup();
        let lifecycle = HeroLifecycleManager::new(&rules);
        let mut ledger = EconomyLedger::empty(&rules.economy);
        ledger.award(Currency::Souls, 5, "test").unwrap();
        let mut events: Vec<GameEvent> = Vec::new();

        lifecycle.die(&mut hero, &mut events).unwrap();
        let err = lifecycle.revive(&mut hero, &mut ledger, &mut events).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientResource);
        assert_eq!(err.shortfall_of(&Resource::Currency(Currency::Souls)), Some(5));
        assert_eq!(hero.status(), HeroStatus::Dead);
        assert_eq!(ledger.balance(Currency::Souls), 5);
    }

    #[test]
    fn test_revival_cycle_scales_cost() {
        let (rules, mut hero) = setup();
        let lifecycle = HeroLifecycleManager::new(&rules);
        let mut ledger = EconomyLedger::empty(&rules.economy);
        ledger.award(Currency::Souls, 200, "test").unwrap();
        let mut events: Vec<GameEvent> = Vec::new();

        let mut paid = Vec::new();
        for _ in 0..4 {
            lifecycle.die(&mut hero, &mut events).unwrap();
            let report = lifecycle.revive(&mut hero, &mut ledger, &mut events).unwrap();
            paid.push(report.souls_spent);
        }

        assert_eq!(paid, vec![10, 25, 50, 50]);
        assert_eq!(hero.death_count(), 4);
        assert_eq!(ledger.balance(Currency::Souls), 65);
        assert_eq!(lifecycle.death_stats(&hero).total_souls_spent, 135);

        let names: Vec<_> = events.iter().take(3).map(GameEvent::name).collect();
        assert_eq!(names, vec!["hero_died", "souls_spent", "hero_revived"]);
    }

    #[test]
    fn test_revive_alive_hero_fails() {
        let (rules, mut hero) = setup();
        let lifecycle = HeroLifecycleManager::new(&rules);
        let mut ledger = EconomyLedger::new(&rules.economy);

        let err = lifecycle
            .revive(&mut hero, &mut ledger, &mut Vec::<GameEvent>::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(ledger.balance(Currency::Souls), 10);
    }

    #[test]
    fn test_queries() {
        let (rules, mut hero) = setup();
        let lifecycle = HeroLifecycleManager::new(&rules);

        assert!(!lifecycle.can_battle(&hero));
        assert!(!lifecycle.can_revive(&hero, 100));
        assert_eq!(lifecycle.estimate_soul_cost(0, 3), 85);
        assert_eq!(lifecycle.estimate_soul_cost(5, 2), 100);

        lifecycle.die(&mut hero, &mut Vec::<GameEvent>::new()).unwrap();
        let info = lifecycle.revival_info(&hero, 4);
        assert_eq!(info.shortfall, 6);
        assert!(!info.can_revive);
        assert!(info.last_death_at.is_some());
        assert!(lifecycle.can_revive(&hero, 10));
    }
}
