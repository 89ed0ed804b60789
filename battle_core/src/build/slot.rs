//! Spell slots and six-slot builds

use crate::error::{RulesError, RulesResult};
use crate::spell::Spell;
use crate::types::BuildType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of slots in every build
pub const BUILD_SIZE: usize = 6;

/// Observable state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// No spell, unlocked
    Empty,
    /// Spell equipped and locked
    Locked,
    /// Spell without lock or lock without spell; never produced by the rules
    Inconsistent,
}

/// One position in a build
///
/// Only two states are legal: empty and unlocked, or occupied and locked.
/// `fill` and `release` are the only transitions between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellSlot {
    build: BuildType,
    index: usize,
    spell: Option<Spell>,
    locked: bool,
    locked_at: Option<DateTime<Utc>>,
    unlocked_at: Option<DateTime<Utc>>,
}

impl SpellSlot {
    pub fn new(build: BuildType, index: usize) -> Self {
        SpellSlot {
            build,
            index,
            spell: None,
            locked: false,
            locked_at: None,
            unlocked_at: None,
        }
    }

    pub fn build(&self) -> BuildType {
        self.build
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn spell(&self) -> Option<&Spell> {
        self.spell.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_empty(&self) -> bool {
        self.spell.is_none()
    }

    pub fn locked_at(&self) -> Option<DateTime<Utc>> {
        self.locked_at
    }

    pub fn unlocked_at(&self) -> Option<DateTime<Utc>> {
        self.unlocked_at
    }

    pub fn state(&self) -> SlotState {
        match (self.spell.is_some(), self.locked) {
            (false, false) => SlotState::Empty,
            (true, true) => SlotState::Locked,
            _ => SlotState::Inconsistent,
        }
    }

    /// Place a spell and lock the slot
    pub(crate) fn fill(&mut self, spell: Spell) -> RulesResult<()> {
        if self.state() != SlotState::Empty {
            return Err(RulesError::invalid_state(format!(
                "{} slot {} is locked; unlock it first",
                self.build, self.index
            )));
        }
        self.spell = Some(spell);
        self.locked = true;
        self.locked_at = Some(Utc::now());
        Ok(())
    }

    /// Take the spell out and unlock the slot
    pub(crate) fn release(&mut self) -> RulesResult<Spell> {
        if self.state() != SlotState::Locked {
            return Err(RulesError::invalid_state(format!(
                "{} slot {} is not locked",
                self.build, self.index
            )));
        }
        let spell = self.spell.take().ok_or_else(|| {
            RulesError::invalid_state(format!("{} slot {} holds no spell", self.build, self.index))
        })?;
        self.locked = false;
        self.unlocked_at = Some(Utc::now());
        Ok(spell)
    }
}

/// Six ordered slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    kind: BuildType,
    slots: [SpellSlot; BUILD_SIZE],
}

impl Build {
    pub fn new(kind: BuildType) -> Self {
        Build {
            kind,
            slots: std::array::from_fn(|index| SpellSlot::new(kind, index)),
        }
    }

    pub fn kind(&self) -> BuildType {
        self.kind
    }

    pub fn slots(&self) -> &[SpellSlot] {
        &self.slots
    }

    /// Slot by index, `Validation` when out of range
    pub fn slot(&self, index: usize) -> RulesResult<&SpellSlot> {
        self.slots.get(index).ok_or_else(|| out_of_range(index))
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> RulesResult<&mut SpellSlot> {
        self.slots.get_mut(index).ok_or_else(|| out_of_range(index))
    }

    /// Every slot occupied and locked
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.state() == SlotState::Locked)
    }

    pub fn locked_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_locked()).count()
    }

    pub fn has_locked_slot(&self) -> bool {
        self.slots.iter().any(SpellSlot::is_locked)
    }

    /// Equipped spells in slot order
    pub fn spells(&self) -> impl Iterator<Item = &Spell> {
        self.slots.iter().filter_map(SpellSlot::spell)
    }
}

fn out_of_range(index: usize) -> RulesError {
    RulesError::validation(format!(
        "slot index {} out of range (0-{})",
        index,
        BUILD_SIZE - 1
    ))
}
