//! BuildSlotManager - equipping spells and managing the two builds

use super::collection::SpellCollection;
use super::slot::{SlotState, BUILD_SIZE};
use crate::config::RulesConfig;
use crate::error::{RulesError, RulesResult};
use crate::events::{EventSink, GameEvent};
use crate::hero::Hero;
use crate::types::BuildType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of equipping a spell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipReport {
    pub build: BuildType,
    pub slot: usize,
    pub spell_id: String,
    pub locked_at: Option<DateTime<Utc>>,
}

/// Outcome of a build switch or copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildChange {
    pub from: BuildType,
    pub to: BuildType,
}

/// Read-only view of one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub index: usize,
    pub spell_id: Option<String>,
    pub locked: bool,
}

/// Read-only view of one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub build: BuildType,
    pub active: bool,
    pub complete: bool,
    pub filled: usize,
    pub locked: usize,
    pub empty: usize,
    pub slots: Vec<SlotInfo>,
}

/// Level gate status of one build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildUnlock {
    pub build: BuildType,
    pub unlocked: bool,
    pub required_level: u32,
    pub levels_until_unlock: u32,
}

/// Both builds at a glance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub active: BuildType,
    pub primary: BuildInfo,
    pub secondary: BuildInfo,
    pub secondary_unlocked: bool,
    pub battle_ready: bool,
}

/// A locked spell and when it was locked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedSpell {
    pub slot: usize,
    pub spell_id: String,
    pub locked_at: Option<DateTime<Utc>>,
}

/// Battle entry verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleCheck {
    pub can_battle: bool,
    pub requires_revival: bool,
    pub reason: Option<String>,
}

/// Equips spells into build slots and moves the hero between builds
///
/// Holds no state of its own; every operation works on the caller's hero
/// and collection and publishes into the caller's event sink.
pub struct BuildSlotManager<'a> {
    rules: &'a RulesConfig,
}

impl<'a> BuildSlotManager<'a> {
    pub fn new(rules: &'a RulesConfig) -> Self {
        BuildSlotManager { rules }
    }

    pub fn rules(&self) -> &'a RulesConfig {
        self.rules
    }

    /// Move a spell from the collection into an empty slot and lock it
    pub fn equip(
        &self,
        hero: &mut Hero,
        build: BuildType,
        index: usize,
        spell_id: &str,
        collection: &mut SpellCollection,
        events: &mut impl EventSink,
    ) -> RulesResult<EquipReport> {
        // Step 1: slot must exist and be empty
        let slot = hero.build(build).slot(index)?;
        if slot.state() != SlotState::Empty {
            return Err(RulesError::invalid_state(format!(
                "{} slot {} is locked; unlock it before equipping",
                build, index
            )));
        }

        // Step 2: move the spell out of the collection
        let spell = collection.take(spell_id)?;

        // Step 3: lock it into the slot
        let slot = hero.build_mut(build).slot_mut(index)?;
        slot.fill(spell)?;
        let locked_at = slot.locked_at();

        debug!(
            "Equipped {} into {} slot {} of {}",
            spell_id,
            build,
            index,
            hero.id()
        );
        events.publish(GameEvent::SpellLocked {
            hero_id: hero.id().to_string(),
            build,
            slot: index,
            spell_id: spell_id.to_string(),
            at: locked_at.unwrap_or_else(Utc::now),
        });

        Ok(EquipReport {
            build,
            slot: index,
            spell_id: spell_id.to_string(),
            locked_at,
        })
    }

    /// Make another build the active one
    ///
    /// Refused during battle. Otherwise the target must be unlocked at
    /// `player_level`, complete and not already active.
    pub fn switch_active_build(
        &self,
        hero: &mut Hero,
        target: BuildType,
        player_level: u32,
        in_battle: bool,
        events: &mut impl EventSink,
    ) -> RulesResult<BuildChange> {
        if in_battle {
            return Err(RulesError::invalid_state("cannot switch builds during battle"));
        }

        let from = hero.active_build();
        if from == target {
            return Err(RulesError::invalid_state(format!(
                "already using the {} build",
                target
            )));
        }

        if !self.is_build_unlocked(target, player_level) {
            return Err(RulesError::invalid_state(format!(
                "{} build unlocks at level {} (current level {})",
                target,
                self.required_level(target),
                player_level
            )));
        }

        if !hero.is_build_complete(target) {
            let info = self.build_info(hero, target);
            return Err(RulesError::invalid_state(format!(
                "{} build is not complete ({}/{} locked)",
                target, info.locked, BUILD_SIZE
            )));
        }

        hero.set_active_build(target);
        debug!("{} switched build {} -> {}", hero.id(), from, target);
        events.publish(GameEvent::BuildSwitched {
            hero_id: hero.id().to_string(),
            from,
            to: target,
            at: Utc::now(),
        });

        Ok(BuildChange { from, to: target })
    }

    /// Fill an unlocked build with fresh copies of another build's spells
    ///
    /// Both builds must be open at `player_level`, the source complete and
    /// the target free of locked slots. Each target slot takes another
    /// instance of the same base spell from the collection; when any slot
    /// has no such instance nothing is moved.
    pub fn copy_build(
        &self,
        hero: &mut Hero,
        from: BuildType,
        to: BuildType,
        player_level: u32,
        collection: &mut SpellCollection,
        events: &mut impl EventSink,
    ) -> RulesResult<BuildChange> {
        if from == to {
            return Err(RulesError::validation("cannot copy a build onto itself"));
        }
        if !self.is_build_unlocked(from, player_level) || !self.is_build_unlocked(to, player_level) {
            return Err(RulesError::invalid_state(format!(
                "both builds must be unlocked (secondary opens at level {})",
                self.rules.builds.secondary_unlock_level
            )));
        }
        if !hero.is_build_complete(from) {
            return Err(RulesError::invalid_state(format!(
                "source build ({}) is not complete",
                from
            )));
        }
        if hero.build(to).has_locked_slot() {
            return Err(RulesError::invalid_state(format!(
                "{} build has locked slots; unlock them first",
                to
            )));
        }

        // Step 1: pick one distinct collection instance per source slot
        let mut picks: Vec<String> = Vec::with_capacity(BUILD_SIZE);
        let mut missing = Vec::new();
        for spell in hero.build(from).spells() {
            let instance = collection
                .instances_of(&spell.base_id)
                .into_iter()
                .find(|id| !picks.iter().any(|p| p == id));
            match instance {
                Some(id) => picks.push(id.to_string()),
                None => missing.push(spell.base_id.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(RulesError::not_found(format!(
                "no spare copy of {} in the collection",
                missing.join(", ")
            )));
        }

        // Step 2: move and lock
        for (index, id) in picks.iter().enumerate() {
            let spell = collection.take(id)?;
            hero.build_mut(to).slot_mut(index)?.fill(spell)?;
        }

        debug!("{} copied build {} -> {}", hero.id(), from, to);
        events.publish(GameEvent::BuildCopied {
            hero_id: hero.id().to_string(),
            from,
            to,
            at: Utc::now(),
        });

        Ok(BuildChange { from, to })
    }

    // === Queries ===

    pub fn is_build_complete(&self, hero: &Hero, build: BuildType) -> bool {
        hero.is_build_complete(build)
    }

    pub fn is_build_unlocked(&self, build: BuildType, player_level: u32) -> bool {
        player_level >= self.required_level(build)
    }

    fn required_level(&self, build: BuildType) -> u32 {
        match build {
            BuildType::Primary => 1,
            BuildType::Secondary => self.rules.builds.secondary_unlock_level,
        }
    }

    pub fn build_unlock_status(&self, player_level: u32) -> Vec<BuildUnlock> {
        BuildType::all()
            .iter()
            .map(|&build| {
                let required_level = self.required_level(build);
                BuildUnlock {
                    build,
                    unlocked: player_level >= required_level,
                    required_level,
                    levels_until_unlock: required_level.saturating_sub(player_level),
                }
            })
            .collect()
    }

    pub fn build_info(&self, hero: &Hero, build: BuildType) -> BuildInfo {
        let slots = hero.build(build).slots();
        let filled = slots.iter().filter(|s| !s.is_empty()).count();
        BuildInfo {
            build,
            active: hero.active_build() == build,
            complete: hero.is_build_complete(build),
            filled,
            locked: slots.iter().filter(|s| s.is_locked()).count(),
            empty: BUILD_SIZE - filled,
            slots: slots
                .iter()
                .map(|slot| SlotInfo {
                    index: slot.index(),
                    spell_id: slot.spell().map(|s| s.id.clone()),
                    locked: slot.is_locked(),
                })
                .collect(),
        }
    }

    pub fn build_status(&self, hero: &Hero, player_level: u32) -> BuildStatus {
        BuildStatus {
            active: hero.active_build(),
            primary: self.build_info(hero, BuildType::Primary),
            secondary: self.build_info(hero, BuildType::Secondary),
            secondary_unlocked: self.is_build_unlocked(BuildType::Secondary, player_level),
            battle_ready: hero.is_battle_ready(),
        }
    }

    /// Whether `equip` on this slot would pass the slot checks
    pub fn can_equip_slot(&self, hero: &Hero, build: BuildType, index: usize) -> bool {
        hero.build(build)
            .slot(index)
            .map_or(false, |slot| slot.state() == SlotState::Empty)
    }

    pub fn locked_spells(&self, hero: &Hero, build: BuildType) -> Vec<LockedSpell> {
        hero.build(build)
            .slots()
            .iter()
            .filter(|slot| slot.is_locked())
            .filter_map(|slot| {
                slot.spell().map(|spell| LockedSpell {
                    slot: slot.index(),
                    spell_id: spell.id.clone(),
                    locked_at: slot.locked_at(),
                })
            })
            .collect()
    }

    /// `Ok` when the build is complete and battle ready
    pub fn validate_build(&self, hero: &Hero, build: BuildType) -> RulesResult<()> {
        let info = self.build_info(hero, build);
        if info.complete {
            return Ok(());
        }
        Err(RulesError::invalid_state(format!(
            "{} build incomplete: {}/{} spells, {}/{} locked",
            build, info.filled, BUILD_SIZE, info.locked, BUILD_SIZE
        )))
    }

    /// The build to fight with, if any is complete
    pub fn recommend_build(&self, hero: &Hero) -> Option<BuildType> {
        let primary = hero.is_build_complete(BuildType::Primary);
        let secondary = hero.is_build_complete(BuildType::Secondary);
        match (primary, secondary) {
            (true, true) => Some(hero.active_build()),
            (true, false) => Some(BuildType::Primary),
            (false, true) => Some(BuildType::Secondary),
            (false, false) => None,
        }
    }

    /// Battle entry guard
    pub fn can_enter_battle(&self, hero: &Hero) -> BattleCheck {
        if !hero.is_alive() {
            return BattleCheck {
                can_battle: false,
                requires_revival: true,
                reason: Some("hero is dead; revive to battle".to_string()),
            };
        }

        let active = hero.active_build();
        if let Err(err) = self.validate_build(hero, active) {
            return BattleCheck {
                can_battle: false,
                requires_revival: false,
                reason: Some(err.to_string()),
            };
        }

        BattleCheck {
            can_battle: true,
            requires_revival: false,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::spell::Spell;
    use crate::types::{Element, SpellCategory};

    fn spell(id: &str) -> Spell {
        Spell::new(id, id, Element::Water, SpellCategory::Damage)
    }

    fn collection_of(ids: &[&str]) -> SpellCollection {
        ids.iter().map(|id| spell(id)).collect()
    }

    fn fill_build(
        manager: &BuildSlotManager,
        hero: &mut Hero,
        build: BuildType,
        collection: &mut SpellCollection,
        prefix: &str,
    ) {
        for index in 0..BUILD_SIZE {
            let id = format!("{}{}", prefix, index);
            collection.add(spell(&id)).unwrap();
            manager
                .equip(hero, build, index, &id, collection, &mut Vec::<GameEvent>::new())
                .unwrap();
        }
    }

    #[test]
    fn test_equip_moves_spell_and_locks() {
        let rules = RulesConfig::default();
        let manager = BuildSlotManager::new(&rules);
        let mut hero = Hero::new("h", "Hero", &rules.revival);
        let mut collection = collection_of(&["wave"]);
        let mut events: Vec<GameEvent> = Vec::new();

        let report = manager
            .equip(&mut hero, BuildType::Primary, 0, "wave", &mut collection, &mut events)
            .unwrap();

        assert_eq!(report.slot, 0);
        assert!(collection.is_empty());
        assert!(hero.build(BuildType::Primary).slot(0).unwrap().is_locked());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "spell_locked");
    }

    #[test]
    fn test_equip_into_locked_slot_fails_without_change() {
        let rules = RulesConfig::default();
        let manager = BuildSlotManager::new(&rules);
        let mut hero = Hero::new("h", "Hero", &rules.revival);
        let mut collection = collection_of(&["a", "b"]);

        manager
            .equip(&mut hero, BuildType::Primary, 1, "a", &mut collection, &mut Vec::<GameEvent>::new())
            .unwrap();
        let err = manager
            .equip(&mut hero, BuildType::Primary, 1, "b", &mut collection, &mut Vec::<GameEvent>::new())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(collection.contains("b"));
        assert_eq!(
            hero.build(BuildType::Primary).slot(1).unwrap().spell().map(|s| s.id.as_str()),
            Some("a")
        );
    }

    #[test]
    fn test_equip_errors() {
        let rules = RulesConfig::default();
        let manager = BuildSlotManager::new(&rules);
        let mut hero = Hero::new("h", "Hero", &rules.revival);
        let mut collection = collection_of(&["a"]);

        let err = manager
            .equip(&mut hero, BuildType::Primary, 6, "a", &mut collection, &mut Vec::<GameEvent>::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = manager
            .equip(&mut hero, BuildType::Primary, 0, "ghost", &mut collection, &mut Vec::<GameEvent>::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!hero.build(BuildType::Primary).has_locked_slot());
    }

    #[test]
    fn test_switch_rules() {
        let rules = RulesConfig::default();
        let manager = BuildSlotManager::new(&rules);
        let mut hero = Hero::new("h", "Hero", &rules.revival);
        let mut collection = SpellCollection::new();
        let mut events: Vec<GameEvent> = Vec::new();

        let err = manager
            .switch_active_build(&mut hero, BuildType::Primary, 20, false, &mut events)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        fill_build(&manager, &mut hero, BuildType::Secondary, &mut collection, "s");

        let err = manager
            .switch_active_build(&mut hero, BuildType::Secondary, 14, false, &mut events)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(hero.active_build(), BuildType::Primary);

        let change = manager
            .switch_active_build(&mut hero, BuildType::Secondary, 15, false, &mut events)
            .unwrap();
        assert_eq!(change.from, BuildType::Primary);
        assert_eq!(hero.active_build(), BuildType::Secondary);
        assert_eq!(events.last().map(GameEvent::name), Some("build_switched"));
    }

    #[test]
    fn test_switch_refused_during_battle() {
        let rules = RulesConfig::default();
        let manager = BuildSlotManager::new(&rules);
        let mut hero = Hero::new("h", "Hero", &rules.revival);
        let mut collection = SpellCollection::new();
        fill_build(&manager, &mut hero, BuildType::Secondary, &mut collection, "s");
        let mut events: Vec<GameEvent> = Vec::new();

        let err = manager
            .switch_active_build(&mut hero, BuildType::Secondary, 30, true, &mut events)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(err.to_string().contains("during battle"));
        assert_eq!(hero.active_build(), BuildType::Primary);
        assert!(events.is_empty());

        // Checked before anything else, even for the already active build
        let err = manager
            .switch_active_build(&mut hero, BuildType::Primary, 30, true, &mut events)
            .unwrap_err();
        assert!(err.to_string().contains("during battle"));
    }

    #[test]
    fn test_copy_build_uses_spare_instances() {
        let rules = RulesConfig::default();
        let manager = BuildSlotManager::new(&rules);
        let mut hero = Hero::new("h", "Hero", &rules.revival);
        let mut collection = SpellCollection::new();
        fill_build(&manager, &mut hero, BuildType::Primary, &mut collection, "p");

        for index in 0..BUILD_SIZE {
            collection
                .add(spell(&format!("p{}", index)).copy_as(format!("p{}#copy", index)))
                .unwrap();
        }

        let mut events: Vec<GameEvent> = Vec::new();
        manager
            .copy_build(
                &mut hero,
                BuildType::Primary,
                BuildType::Secondary,
                15,
                &mut collection,
                &mut events,
            )
            .unwrap();

        assert!(hero.is_build_complete(BuildType::Secondary));
        assert!(collection.is_empty());
        assert_eq!(
            hero.build(BuildType::Secondary).slot(2).unwrap().spell().map(|s| s.id.as_str()),
            Some("p2#copy")
        );
        assert!(hero.check_invariants(&rules.revival, Some(&collection)).is_ok());
        assert_eq!(events[0].name(), "build_copied");
    }

    #[test]
    fn test_copy_build_is_all_or_nothing() {
        let rules = RulesConfig::default();
        let manager = BuildSlotManager::new(&rules);
        let mut hero = Hero::new("h", "Hero", &rules.revival);
        let mut collection = SpellCollection::new();
        fill_build(&manager, &mut hero, BuildType::Primary, &mut collection, "p");

        // Spares for all but the last slot
        for index in 0..BUILD_SIZE - 1 {
            collection
                .add(spell(&format!("p{}", index)).copy_as(format!("p{}#copy", index)))
                .unwrap();
        }

        let err = manager
            .copy_build(
                &mut hero,
                BuildType::Primary,
                BuildType::Secondary,
                15,
                &mut collection,
                &mut Vec::<GameEvent>::new(),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(collection.len(), BUILD_SIZE - 1);
        assert!(!hero.build(BuildType::Secondary).has_locked_slot());

        let err = manager
            .copy_build(
                &mut hero,
                BuildType::Primary,
                BuildType::Secondary,
                10,
                &mut collection,
                &mut Vec::<GameEvent>::new(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_queries() {
        let rules = RulesConfig::default();
        let manager = BuildSlotManager::new(&rules);
        let mut hero = Hero::new("h", "Hero", &rules.revival);
        let mut collection = collection_of(&["x"]);

        assert!(manager.can_equip_slot(&hero, BuildType::Primary, 0));
        assert!(!manager.can_equip_slot(&hero, BuildType::Primary, 9));
        assert_eq!(manager.recommend_build(&hero), None);

        manager
            .equip(&mut hero, BuildType::Primary, 4, "x", &mut collection, &mut Vec::<GameEvent>::new())
            .unwrap();
        assert!(!manager.can_equip_slot(&hero, BuildType::Primary, 4));

        let locked = manager.locked_spells(&hero, BuildType::Primary);
        assert_eq!(locked.len(), 1);
        assert_eq!(locked[0].slot, 4);

        let info = manager.build_info(&hero, BuildType::Primary);
        assert_eq!((info.filled, info.locked, info.empty), (1, 1, 5));
        assert!(info.active);

        let check = manager.can_enter_battle(&hero);
        assert!(!check.can_battle);
        assert!(!check.requires_revival);
        assert!(manager.validate_build(&hero, BuildType::Primary).is_err());

        let status = manager.build_unlock_status(10);
        assert!(status[0].unlocked);
        assert!(!status[1].unlocked);
        assert_eq!(status[1].levels_until_unlock, 5);
    }
}
