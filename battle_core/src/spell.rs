//! Spells owned by the player

use crate::config::DataTables;
use crate::types::{Element, Rarity, SpellCategory};
use serde::{Deserialize, Serialize};

/// Optional numeric stats of a spell
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpellStats {
    pub power: Option<f64>,
    pub mana_cost: Option<u32>,
    pub cooldown: Option<u32>,
}

/// One spell instance
///
/// `id` is unique per instance; `base_id` names the spell design shared by
/// every copy of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub id: String,
    pub base_id: String,
    pub name: String,
    pub element: Element,
    pub category: SpellCategory,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub stats: SpellStats,
}

impl Spell {
    pub fn new(id: impl Into<String>, name: impl Into<String>, element: Element, category: SpellCategory) -> Self {
        let id = id.into();
        Spell {
            base_id: id.clone(),
            id,
            name: name.into(),
            element,
            category,
            rarity: Rarity::Common,
            stats: SpellStats::default(),
        }
    }

    pub fn with_base(mut self, base_id: impl Into<String>) -> Self {
        self.base_id = base_id.into();
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_stats(mut self, stats: SpellStats) -> Self {
        self.stats = stats;
        self
    }

    /// Another instance of the same spell under a new id
    pub fn copy_as(&self, id: impl Into<String>) -> Self {
        Spell {
            id: id.into(),
            ..self.clone()
        }
    }

    /// Power scaled by the rarity multiplier
    pub fn effective_power(&self, tables: &impl DataTables) -> Option<f64> {
        self.stats
            .power
            .map(|power| power * tables.rarity_multiplier(self.rarity))
    }
}
