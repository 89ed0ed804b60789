//! CombatEntity - one side of a battle exchange

use crate::config::{PlayerModifierDef, PlayerModifierEffect, StatusEffectId};
use crate::effects::{ActiveEffect, TurnResult};
use crate::types::{AttackModifier, DamageType, Element, EvasionType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Fractional resistances, each clamped into [0, 1]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resistances {
    physical: f64,
    magical: f64,
    true_damage: f64,
    /// Reduces the attacker's crit chance
    critical: f64,
    /// Chance to shrug off a status effect
    status: f64,
    elements: BTreeMap<Element, f64>,
}

impl Resistances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_damage_type(mut self, damage_type: DamageType, value: f64) -> Self {
        let value = clamp_unit(value);
        match damage_type {
            DamageType::Physical => self.physical = value,
            DamageType::Magical => self.magical = value,
            DamageType::True => self.true_damage = value,
            // Pure damage cannot be resisted
            DamageType::Pure => {}
        }
        self
    }

    pub fn with_element(mut self, element: Element, value: f64) -> Self {
        self.elements.insert(element, clamp_unit(value));
        self
    }

    pub fn with_critical(mut self, value: f64) -> Self {
        self.critical = clamp_unit(value);
        self
    }

    pub fn with_status(mut self, value: f64) -> Self {
        self.status = clamp_unit(value);
        self
    }

    pub fn damage_type(&self, damage_type: DamageType) -> f64 {
        match damage_type {
            DamageType::Physical => self.physical,
            DamageType::Magical => self.magical,
            DamageType::True => self.true_damage,
            DamageType::Pure => 0.0,
        }
    }

    pub fn element(&self, element: Element) -> f64 {
        self.elements.get(&element).copied().unwrap_or(0.0)
    }

    pub fn critical(&self) -> f64 {
        self.critical
    }

    pub fn status(&self) -> f64 {
        self.status
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Damage-absorbing barrier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub value: f64,
}

/// Per-type evasion chances, rolled before the standard dodge
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvasionChances {
    pub dodge: f64,
    pub parry: f64,
    pub deflect: f64,
    pub phase: f64,
}

impl EvasionChances {
    pub fn get(&self, evasion: EvasionType) -> f64 {
        match evasion {
            EvasionType::Dodge => self.dodge,
            EvasionType::Parry => self.parry,
            EvasionType::Deflect => self.deflect,
            EvasionType::Phase => self.phase,
        }
    }

    pub fn set(&mut self, evasion: EvasionType, chance: f64) {
        let chance = clamp_unit(chance);
        match evasion {
            EvasionType::Dodge => self.dodge = chance,
            EvasionType::Parry => self.parry = chance,
            EvasionType::Deflect => self.deflect = chance,
            EvasionType::Phase => self.phase = chance,
        }
    }
}

/// Battle-scoped stat changes (reave, shred)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporaryStats {
    pub attack: f64,
    pub defense: f64,
    /// Fraction of defense ignored, capped at 1
    pub armor_reduction: f64,
}

/// A player modifier carried by an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerModifier {
    pub id: String,
    pub effect: PlayerModifierEffect,
    /// Current stacks for stacking modifiers
    #[serde(default)]
    pub stacks: u32,
}

impl PlayerModifier {
    pub fn from_def(def: &PlayerModifierDef) -> Self {
        PlayerModifier {
            id: def.id.clone(),
            effect: def.effect.clone(),
            stacks: 0,
        }
    }

    pub fn with_stacks(mut self, stacks: u32) -> Self {
        self.stacks = stacks;
        self
    }
}

/// Everything the damage pipeline reads from or writes to a combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatEntity {
    // === Identity ===
    pub id: String,
    pub name: String,
    pub element: Element,

    // === Resources ===
    pub health: f64,
    pub max_health: f64,
    pub mana: f64,
    pub max_mana: f64,
    pub mana_regen: f64,
    pub shield: Option<Shield>,

    // === Offense ===
    pub attack: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub accuracy: f64,

    // === Defense ===
    pub defense: f64,
    pub magic_defense: f64,
    pub dodge_chance: f64,
    pub evasion: EvasionChances,
    pub resistances: Resistances,

    // === Modifiers ===
    pub status_effects: Vec<ActiveEffect>,
    pub player_modifiers: Vec<PlayerModifier>,
    pub attack_modifiers: Vec<AttackModifier>,

    // === Battle state ===
    pub temporary: TemporaryStats,
    /// Amplify stacks built up against each target id
    pub amplify_stacks: HashMap<String, u32>,
    pub last_damage_taken: Option<DamageType>,
    pub damaged_this_turn: bool,
    pub damaged_last_turn: bool,
}

impl CombatEntity {
    /// Create an entity at full health and mana with baseline stats
    pub fn new(id: impl Into<String>, max_health: f64, max_mana: f64) -> Self {
        let id = id.into();
        CombatEntity {
            name: id.clone(),
            id,
            element: Element::Neutral,
            health: max_health.max(0.0),
            max_health: max_health.max(0.0),
            mana: max_mana.max(0.0),
            max_mana: max_mana.max(0.0),
            mana_regen: 10.0,
            shield: None,
            attack: 0.0,
            crit_chance: 0.05,
            crit_damage: 1.5,
            accuracy: 1.0,
            defense: 0.0,
            magic_defense: 0.0,
            dodge_chance: 0.0,
            evasion: EvasionChances::default(),
            resistances: Resistances::default(),
            status_effects: Vec::new(),
            player_modifiers: Vec::new(),
            attack_modifiers: Vec::new(),
            temporary: TemporaryStats::default(),
            amplify_stacks: HashMap::new(),
            last_damage_taken: None,
            damaged_this_turn: false,
            damaged_last_turn: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn with_attack(mut self, attack: f64) -> Self {
        self.attack = attack;
        self
    }

    pub fn with_defense(mut self, defense: f64, magic_defense: f64) -> Self {
        self.defense = defense;
        self.magic_defense = magic_defense;
        self
    }

    pub fn with_crit(mut self, chance: f64, damage: f64) -> Self {
        self.crit_chance = chance;
        self.crit_damage = damage;
        self
    }

    pub fn with_dodge(mut self, chance: f64) -> Self {
        self.dodge_chance = clamp_unit(chance);
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_evasion(mut self, evasion: EvasionType, chance: f64) -> Self {
        self.evasion.set(evasion, chance);
        self
    }

    pub fn with_resistances(mut self, resistances: Resistances) -> Self {
        self.resistances = resistances;
        self
    }

    pub fn with_shield(mut self, value: f64) -> Self {
        self.shield = Some(Shield {
            value: value.max(0.0),
        });
        self
    }

    pub fn with_attack_modifier(mut self, modifier: AttackModifier) -> Self {
        if !self.attack_modifiers.contains(&modifier) {
            self.attack_modifiers.push(modifier);
        }
        self
    }

    pub fn with_player_modifier(mut self, modifier: PlayerModifier) -> Self {
        self.player_modifiers.push(modifier);
        self
    }

    // === Queries ===

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    pub fn mana_fraction(&self) -> f64 {
        if self.max_mana <= 0.0 {
            return 0.0;
        }
        self.mana / self.max_mana
    }

    pub fn shield_value(&self) -> f64 {
        self.shield.map_or(0.0, |s| s.value)
    }

    pub fn has_status(&self, id: StatusEffectId) -> bool {
        self.status_effects.iter().any(|e| e.id == id)
    }

    pub fn status(&self, id: StatusEffectId) -> Option<&ActiveEffect> {
        self.status_effects.iter().find(|e| e.id == id)
    }

    /// Remove a status effect, returning whether it was present
    pub fn remove_status(&mut self, id: StatusEffectId) -> bool {
        let before = self.status_effects.len();
        self.status_effects.retain(|e| e.id != id);
        self.status_effects.len() != before
    }

    pub fn has_attack_modifier(&self, modifier: AttackModifier) -> bool {
        self.attack_modifiers.contains(&modifier)
    }

    pub fn has_player_modifier(&self, id: &str) -> bool {
        self.player_modifiers.iter().any(|m| m.id == id)
    }

    /// Defense used against a damage type before penetration and shred
    pub fn defense_against(&self, damage_type: DamageType) -> f64 {
        match damage_type {
            DamageType::Physical => (self.defense + self.temporary.defense).max(0.0),
            DamageType::Magical => self.magic_defense.max(0.0),
            DamageType::True | DamageType::Pure => 0.0,
        }
    }

    // === Mutation ===

    /// Subtract health, never below zero; returns the amount removed
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        let removed = amount.max(0.0).min(self.health);
        self.health -= removed;
        removed
    }

    /// Restore health up to max; returns the amount healed
    pub fn heal(&mut self, amount: f64) -> f64 {
        let healed = amount.max(0.0).min(self.max_health - self.health).max(0.0);
        self.health += healed;
        healed
    }

    /// Restore mana up to max; returns the amount restored
    pub fn restore_mana(&mut self, amount: f64) -> f64 {
        let restored = amount.max(0.0).min(self.max_mana - self.mana).max(0.0);
        self.mana += restored;
        restored
    }

    /// Remove mana, never below zero; returns the amount removed
    pub fn drain_mana(&mut self, amount: f64) -> f64 {
        let removed = amount.max(0.0).min(self.mana);
        self.mana -= removed;
        removed
    }

    /// Add to the shield, creating one if needed
    pub fn gain_shield(&mut self, amount: f64) {
        let amount = amount.max(0.0);
        match self.shield.as_mut() {
            Some(shield) => shield.value += amount,
            None => self.shield = Some(Shield { value: amount }),
        }
    }

    /// Apply the outcome of a processed turn
    pub fn apply_turn(&mut self, turn: &TurnResult) {
        self.take_damage(turn.damage);
        self.heal(turn.healing);
        let net_mana = turn.mana_gain - turn.mana_loss;
        if net_mana >= 0.0 {
            self.restore_mana(net_mana);
        } else {
            self.drain_mana(-net_mana);
        }
    }
}
