//! Attack-modifier parameters and the player-modifier catalog

use serde::{Deserialize, Serialize};

/// Numbers behind the named attack modifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackModifierParams {
    /// Defender health fraction at or below which execute fires
    pub execute_threshold: f64,
    pub execute_multiplier: f64,
    pub amplify_per_stack: f64,
    pub amplify_max_stacks: u32,
    /// Armor reduction added to the defender per shred hit
    pub shred_per_application: f64,
    /// Remaining shield converted to bonus damage at `(multiplier - 1)`
    pub shatter_multiplier: f64,
    pub cleave_targets: u32,
    /// Fraction of defense ignored by penetration
    pub penetration: f64,
}

impl Default for AttackModifierParams {
    fn default() -> Self {
        AttackModifierParams {
            execute_threshold: 0.25,
            execute_multiplier: 2.0,
            amplify_per_stack: 0.10,
            amplify_max_stacks: 5,
            shred_per_application: 0.10,
            shatter_multiplier: 1.5,
            cleave_targets: 2,
            penetration: 0.30,
        }
    }
}

/// Stat a passive or stacking player modifier scales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierStat {
    Damage,
    CritChance,
    CritDamage,
    DodgeChance,
    Accuracy,
    ManaRegen,
}

/// Condition gating a conditional damage modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Attacker took no damage last turn
    NoDamageTaken,
    /// Attacker mana at or above the high-mana ratio
    HighMana,
    /// Attacker health at or below the low-health ratio
    LowHealth,
    /// Defender health at or below a threshold
    TargetBelowThreshold,
    /// Reserved for death-prevention effects; never holds during a hit
    FatalDamage,
}

/// What a player modifier does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerModifierEffect {
    /// `stat *= 1 + value`
    Passive { stat: ModifierStat, value: f64 },
    /// `stat *= 1 + min(stacks, max_stacks) * value_per_stack`
    Stacking {
        stat: ModifierStat,
        value_per_stack: f64,
        max_stacks: u32,
    },
    /// Adds `value` to the damage multiplier while `condition` holds
    Conditional {
        condition: Condition,
        value: f64,
        #[serde(default)]
        threshold: Option<f64>,
    },
    /// Extra resistance against the damage type taken last
    Adaptive { bonus: f64 },
    /// Final incoming damage multiplier
    Resilient { multiplier: f64 },
}

/// Catalog entry for a player modifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerModifierDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub effect: PlayerModifierEffect,
}

impl PlayerModifierDef {
    pub fn new(id: &str, name: &str, effect: PlayerModifierEffect) -> Self {
        PlayerModifierDef {
            id: id.to_string(),
            name: name.to_string(),
            effect,
        }
    }
}

/// Built-in player modifiers
pub fn default_player_modifiers() -> Vec<PlayerModifierDef> {
    use PlayerModifierEffect::*;

    vec![
        PlayerModifierDef::new(
            "empowered",
            "Empowered",
            Passive {
                stat: ModifierStat::Damage,
                value: 0.10,
            },
        ),
        PlayerModifierDef::new(
            "momentum",
            "Momentum",
            Stacking {
                stat: ModifierStat::Damage,
                value_per_stack: 0.05,
                max_stacks: 5,
            },
        ),
        PlayerModifierDef::new(
            "precise",
            "Precise",
            Passive {
                stat: ModifierStat::CritChance,
                value: 0.5,
            },
        ),
        PlayerModifierDef::new(
            "deadly",
            "Deadly",
            Passive {
                stat: ModifierStat::CritDamage,
                value: 0.25,
            },
        ),
        PlayerModifierDef::new(
            "evasive",
            "Evasive",
            Passive {
                stat: ModifierStat::DodgeChance,
                value: 0.5,
            },
        ),
        PlayerModifierDef::new(
            "focused",
            "Focused",
            Passive {
                stat: ModifierStat::Accuracy,
                value: 0.10,
            },
        ),
        PlayerModifierDef::new(
            "meditative",
            "Meditative",
            Passive {
                stat: ModifierStat::ManaRegen,
                value: 0.25,
            },
        ),
        PlayerModifierDef::new(
            "vigilant",
            "Vigilant",
            Conditional {
                condition: Condition::NoDamageTaken,
                value: 0.15,
                threshold: None,
            },
        ),
        PlayerModifierDef::new(
            "arcane_surge",
            "Arcane Surge",
            Conditional {
                condition: Condition::HighMana,
                value: 0.20,
                threshold: None,
            },
        ),
        PlayerModifierDef::new(
            "desperation",
            "Desperation",
            Conditional {
                condition: Condition::LowHealth,
                value: 0.30,
                threshold: None,
            },
        ),
        PlayerModifierDef::new(
            "executioner",
            "Executioner",
            Conditional {
                condition: Condition::TargetBelowThreshold,
                value: 0.25,
                threshold: Some(0.25),
            },
        ),
        PlayerModifierDef::new("adaptive", "Adaptive", Adaptive { bonus: 0.25 }),
        PlayerModifierDef::new(
            "resilient",
            "Resilient",
            Resilient { multiplier: 0.85 },
        ),
    ]
}
