//! Active status effect instances

use crate::config::{StatusEffectDef, StatusEffectId};
use serde::{Deserialize, Serialize};

/// Optional overrides supplied when applying an effect
///
/// Anything left `None` comes from the catalog definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectPayload {
    pub duration: Option<i32>,
    pub damage_per_turn: Option<f64>,
    pub heal_per_turn: Option<f64>,
}

impl EffectPayload {
    pub fn with_duration(mut self, duration: i32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_damage(mut self, damage_per_turn: f64) -> Self {
        self.damage_per_turn = Some(damage_per_turn);
        self
    }

    pub fn with_healing(mut self, heal_per_turn: f64) -> Self {
        self.heal_per_turn = Some(heal_per_turn);
        self
    }
}

/// A status effect currently affecting an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub id: StatusEffectId,
    /// Turns left; removed once it reaches zero
    pub duration: i32,
    pub stacks: u32,
    /// Per stack
    pub damage_per_turn: f64,
    pub heal_per_turn: f64,
}

impl ActiveEffect {
    /// Create a single-stack effect from its definition and payload
    pub fn new(def: &StatusEffectDef, payload: &EffectPayload) -> Self {
        ActiveEffect {
            id: def.id,
            duration: payload.duration.unwrap_or(def.duration),
            stacks: 1,
            damage_per_turn: payload.damage_per_turn.unwrap_or(def.damage_per_turn),
            heal_per_turn: payload.heal_per_turn.unwrap_or(def.heal_per_turn),
        }
    }

    /// Damage dealt this turn, all stacks included
    pub fn tick_damage(&self) -> f64 {
        self.damage_per_turn * self.stacks as f64
    }

    pub fn is_expired(&self) -> bool {
        self.duration <= 0
    }
}
