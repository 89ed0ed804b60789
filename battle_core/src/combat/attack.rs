//! Attack descriptor handed to the resolver

use crate::types::{AttackModifier, DamageType, Element};
use serde::{Deserialize, Serialize};

/// One incoming attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDescriptor {
    pub base_damage: f64,
    #[serde(default = "default_damage_type")]
    pub damage_type: DamageType,
    #[serde(default)]
    pub element: Element,
    #[serde(default = "default_true")]
    pub can_crit: bool,
    #[serde(default = "default_true")]
    pub can_evade: bool,
    /// Applied in this order during the modifier step
    #[serde(default)]
    pub modifiers: Vec<AttackModifier>,
}

fn default_damage_type() -> DamageType {
    DamageType::Physical
}

fn default_true() -> bool {
    true
}

impl AttackDescriptor {
    /// Neutral physical attack that can crit and be evaded
    pub fn new(base_damage: f64) -> Self {
        AttackDescriptor {
            base_damage,
            damage_type: default_damage_type(),
            element: Element::Neutral,
            can_crit: true,
            can_evade: true,
            modifiers: Vec::new(),
        }
    }

    pub fn with_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    /// Disable both the crit and the evasion roll
    pub fn guaranteed(mut self) -> Self {
        self.can_crit = false;
        self.can_evade = false;
        self
    }

    pub fn no_crit(mut self) -> Self {
        self.can_crit = false;
        self
    }

    pub fn no_evade(mut self) -> Self {
        self.can_evade = false;
        self
    }

    pub fn with_modifier(mut self, modifier: AttackModifier) -> Self {
        if !self.modifiers.contains(&modifier) {
            self.modifiers.push(modifier);
        }
        self
    }

    pub fn has(&self, modifier: AttackModifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}
