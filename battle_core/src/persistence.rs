//! Saving and loading player state
//!
//! The core owns no file format. A `Persistence` implementation decides
//! where a `PlayerState` goes; `MemoryStore` keeps a JSON snapshot in
//! memory for tests and headless runs.

use crate::build::SpellCollection;
use crate::config::RulesConfig;
use crate::economy::EconomyLedger;
use crate::error::RulesError;
use crate::hero::Hero;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while saving or loading
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to serialize player state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Saved state is inconsistent: {0}")]
    Invalid(#[from] RulesError),
}

/// Everything the rules core needs to resume a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub player_level: u32,
    pub hero: Hero,
    pub ledger: EconomyLedger,
    #[serde(default)]
    pub collection: SpellCollection,
}

impl PlayerState {
    /// Fresh level 1 player with starting balances and an empty collection
    pub fn new(rules: &RulesConfig, hero_id: &str, hero_name: &str) -> Self {
        PlayerState {
            player_level: 1,
            hero: Hero::new(hero_id, hero_name, &rules.revival),
            ledger: EconomyLedger::new(&rules.economy),
            collection: SpellCollection::new(),
        }
    }

    /// Reattach rules to a deserialized state and check its invariants
    pub fn restore(mut self, rules: &RulesConfig) -> Result<Self, PersistenceError> {
        self.ledger.attach_rules(&rules.economy);
        self.hero
            .check_invariants(&rules.revival, Some(&self.collection))?;
        Ok(self)
    }
}

/// Persistence collaborator
pub trait Persistence {
    /// Last saved state, `None` when nothing was saved yet
    fn load(&self) -> Result<Option<PlayerState>, PersistenceError>;

    fn save(&mut self, state: &PlayerState) -> Result<(), PersistenceError>;
}

/// In-memory store holding one JSON snapshot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with raw JSON, e.g. a save from another build
    pub fn from_json(json: impl Into<String>) -> Self {
        MemoryStore {
            snapshot: Some(json.into()),
        }
    }

    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }
}

impl Persistence for MemoryStore {
    fn load(&self) -> Result<Option<PlayerState>, PersistenceError> {
        match &self.snapshot {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, state: &PlayerState) -> Result<(), PersistenceError> {
        self.snapshot = Some(serde_json::to_string(state)?);
        Ok(())
    }
}
