//! Hero - status, death count and the two spell builds

use crate::build::{Build, SlotState, SpellCollection};
use crate::config::RevivalSchedule;
use crate::error::{RulesError, RulesResult};
use crate::types::{BuildType, HeroStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A player's hero
///
/// Fields are private: status changes go through `HeroLifecycleManager`
/// and slot changes through the build managers, so the revival cost always
/// matches the death count and slots only move between legal states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    id: String,
    name: String,
    status: HeroStatus,
    death_count: u32,
    revival_cost: u64,
    builds: [Build; 2],
    active_build: BuildType,
    #[serde(default)]
    last_death_at: Option<DateTime<Utc>>,
}

impl Hero {
    /// Alive hero with empty builds and the primary build active
    pub fn new(id: impl Into<String>, name: impl Into<String>, schedule: &RevivalSchedule) -> Self {
        Hero {
            id: id.into(),
            name: name.into(),
            status: HeroStatus::Alive,
            death_count: 0,
            revival_cost: schedule.cost_for(0),
            builds: [Build::new(BuildType::Primary), Build::new(BuildType::Secondary)],
            active_build: BuildType::Primary,
            last_death_at: None,
        }
    }

    // === Queries ===

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> HeroStatus {
        self.status
    }

    pub fn is_alive(&self) -> bool {
        self.status == HeroStatus::Alive
    }

    /// Number of revivals so far
    pub fn death_count(&self) -> u32 {
        self.death_count
    }

    pub fn revival_cost(&self) -> u64 {
        self.revival_cost
    }

    pub fn last_death_at(&self) -> Option<DateTime<Utc>> {
        self.last_death_at
    }

    pub fn active_build(&self) -> BuildType {
        self.active_build
    }

    pub fn build(&self, kind: BuildType) -> &Build {
        &self.builds[kind.index()]
    }

    pub fn is_build_complete(&self, kind: BuildType) -> bool {
        self.build(kind).is_complete()
    }

    /// Alive with a complete active build
    pub fn is_battle_ready(&self) -> bool {
        self.is_alive() && self.is_build_complete(self.active_build)
    }

    /// Where a spell instance is equipped, if anywhere
    pub fn find_equipped(&self, spell_id: &str) -> Option<(BuildType, usize)> {
        self.builds.iter().find_map(|build| {
            build
                .slots()
                .iter()
                .find(|slot| slot.spell().map_or(false, |s| s.id == spell_id))
                .map(|slot| (build.kind(), slot.index()))
        })
    }

    // === Mutation (crate only) ===

    pub(crate) fn build_mut(&mut self, kind: BuildType) -> &mut Build {
        &mut self.builds[kind.index()]
    }

    pub(crate) fn set_active_build(&mut self, kind: BuildType) {
        self.active_build = kind;
    }

    pub(crate) fn mark_dead(&mut self, schedule: &RevivalSchedule, at: DateTime<Utc>) {
        self.status = HeroStatus::Dead;
        self.last_death_at = Some(at);
        self.revival_cost = schedule.cost_for(self.death_count);
    }

    pub(crate) fn mark_revived(&mut self, schedule: &RevivalSchedule) {
        self.status = HeroStatus::Alive;
        self.death_count = self.death_count.saturating_add(1);
        self.last_death_at = None;
        self.revival_cost = schedule.cost_for(self.death_count);
    }

    /// Check every structural invariant, e.g. after loading a save
    ///
    /// Slots must be empty or locked and sit at their own position, no
    /// spell instance may be equipped twice or also sit in `collection`,
    /// and the revival cost must match the schedule.
    pub fn check_invariants(
        &self,
        schedule: &RevivalSchedule,
        collection: Option<&SpellCollection>,
    ) -> RulesResult<()> {
        let expected = schedule.cost_for(self.death_count);
        if self.revival_cost != expected {
            return Err(RulesError::invalid_state(format!(
                "hero '{}' revival cost {} does not match {} for death count {}",
                self.id, self.revival_cost, expected, self.death_count
            )));
        }

        let mut seen = HashSet::new();
        for (position, build) in self.builds.iter().enumerate() {
            if build.kind().index() != position {
                return Err(RulesError::invalid_state(format!(
                    "hero '{}' has {} build in the wrong position",
                    self.id,
                    build.kind()
                )));
            }

            for (index, slot) in build.slots().iter().enumerate() {
                if slot.index() != index || slot.build() != build.kind() {
                    return Err(RulesError::invalid_state(format!(
                        "{} slot {} is mislabelled",
                        build.kind(),
                        index
                    )));
                }
                if slot.state() == SlotState::Inconsistent {
                    return Err(RulesError::invalid_state(format!(
                        "{} slot {} is neither empty nor locked",
                        build.kind(),
                        index
                    )));
                }

                let Some(spell) = slot.spell() else { continue };
                if !seen.insert(spell.id.as_str()) {
                    return Err(RulesError::invalid_state(format!(
                        "spell '{}' is equipped in more than one slot",
                        spell.id
                    )));
                }
                if collection.map_or(false, |c| c.contains(&spell.id)) {
                    return Err(RulesError::invalid_state(format!(
                        "spell '{}' is both equipped and in the collection",
                        spell.id
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::Spell;
    use crate::types::{Element, SpellCategory};

    #[test]
    fn test_new_hero() {
        let hero = Hero::new("h1", "Aria", &RevivalSchedule::default());
        assert!(hero.is_alive());
        assert_eq!(hero.death_count(), 0);
        assert_eq!(hero.revival_cost(), 10);
        assert_eq!(hero.active_build(), BuildType::Primary);
        assert!(!hero.is_battle_ready());
        assert!(hero.check_invariants(&RevivalSchedule::default(), None).is_ok());
    }

    #[test]
    fn test_death_and_revival_track_schedule() {
        let schedule = RevivalSchedule::default();
        let mut hero = Hero::new("h1", "Aria", &schedule);

        hero.mark_dead(&schedule, Utc::now());
        assert_eq!(hero.revival_cost(), 10);
        assert!(hero.last_death_at().is_some());

        hero.mark_revived(&schedule);
        assert_eq!(hero.death_count(), 1);
        assert_eq!(hero.revival_cost(), 25);
        assert!(hero.last_death_at().is_none());
    }

    #[test]
    fn test_invariants_catch_shared_ownership() {
        let schedule = RevivalSchedule::default();
        let mut hero = Hero::new("h1", "Aria", &schedule);
        let bolt = Spell::new("bolt", "Bolt", Element::Lightning, SpellCategory::Damage);

        hero.build_mut(BuildType::Primary)
            .slot_mut(0)
            .unwrap()
            .fill(bolt.clone())
            .unwrap();
        assert_eq!(hero.find_equipped("bolt"), Some((BuildType::Primary, 0)));

        let collection: SpellCollection = vec![bolt.clone()].into_iter().collect();
        assert!(hero.check_invariants(&schedule, Some(&collection)).is_err());

        hero.build_mut(BuildType::Secondary)
            .slot_mut(3)
            .unwrap()
            .fill(bolt)
            .unwrap();
        assert!(hero.check_invariants(&schedule, None).is_err());
    }
}
