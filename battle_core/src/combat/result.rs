//! DamageResult - Outcome of one attack

use crate::config::{ElementalRelation, StatusEffectId};
use crate::types::EvasionType;
use serde::{Deserialize, Serialize};

/// A multiplier or effect the pipeline applied, in application order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppliedModifier {
    /// Passive and stacking damage modifiers combined
    PlayerDamage { multiplier: f64 },
    /// Sum of conditional bonuses whose condition held
    Conditional { bonus: f64 },
    Critical { multiplier: f64, brittle: bool },
    Elemental { relation: ElementalRelation, multiplier: f64 },
    Shatter { bonus: f64 },
    Execute { multiplier: f64 },
    Amplify { stacks: u32, multiplier: f64 },
    Shred { armor_reduction: f64 },
    Cleave { targets: u32 },
    Overwhelm,
    Penetration { fraction: f64 },
    Status { effect: StatusEffectId, multiplier: f64 },
    Resilient { multiplier: f64 },
}

/// Stats moved from defender to attacker by reave
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StolenStats {
    pub attack: f64,
    pub defense: f64,
}

/// Side effects fired by the final damage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    pub lifesteal_healed: f64,
    pub mana_absorbed: f64,
    pub mana_siphoned: f64,
    pub shield_gained: f64,
    pub thorns_reflected: f64,
    pub countered: bool,
    pub counter_damage: f64,
    pub stats_stolen: Option<StolenStats>,
}

impl Reactions {
    /// Damage dealt back to the attacker
    pub fn damage_to_attacker(&self) -> f64 {
        self.thorns_reflected + self.counter_damage
    }

    pub fn any(&self) -> bool {
        *self != Reactions::default()
    }
}

/// Result of resolving one attack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    // === Damage ===
    /// Damage to subtract from the defender's health
    pub final_damage: u64,
    /// Base damage of the attack
    pub raw_damage: f64,
    pub shield_absorbed: f64,
    /// Effective defense used in the defense step
    pub defense_applied: f64,
    /// Clamped total resistance used in the resistance step
    pub resistance_applied: f64,

    // === Rolls ===
    pub was_crit: bool,
    pub was_evaded: bool,
    pub evasion_type: Option<EvasionType>,
    /// Counter-hit dealt to the attacker after an evasion
    pub riposte_damage: Option<u64>,

    // === Pipeline ===
    pub modifiers_applied: Vec<AppliedModifier>,
    pub reactions: Reactions,
    /// Extra targets the caller should hit
    pub cleave_targets: Option<u32>,
    /// Caller handles post-kill overflow
    pub overwhelm: bool,

    // === Flags ===
    /// Set by `strike` when the hit dropped the defender to zero
    pub killing_blow: bool,
}

impl DamageResult {
    pub fn new(raw_damage: f64) -> Self {
        DamageResult {
            raw_damage,
            ..Self::default()
        }
    }

    /// Whether a modifier of this kind was applied
    pub fn applied(&self, predicate: impl Fn(&AppliedModifier) -> bool) -> bool {
        self.modifiers_applied.iter().any(predicate)
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        if self.was_evaded {
            let kind = match self.evasion_type {
                Some(EvasionType::Parry) => "Parried",
                Some(EvasionType::Deflect) => "Deflected",
                Some(EvasionType::Phase) => "Phased",
                _ => "Dodged",
            };
            return match self.riposte_damage {
                Some(riposte) => format!("{}, riposte for {}", kind, riposte),
                None => kind.to_string(),
            };
        }

        let mut parts = vec![format!("{} damage", self.final_damage)];

        if self.was_crit {
            parts.push("critical".to_string());
        }

        if self.shield_absorbed > 0.0 {
            parts.push(format!("{:.0} absorbed by shield", self.shield_absorbed));
        }

        if self.reactions.lifesteal_healed > 0.0 {
            parts.push(format!("{:.0} lifesteal", self.reactions.lifesteal_healed));
        }

        if self.reactions.damage_to_attacker() > 0.0 {
            parts.push(format!(
                "{:.0} reflected",
                self.reactions.damage_to_attacker()
            ));
        }

        if self.killing_blow {
            parts.push("FATAL".to_string());
        }

        parts.join(", ")
    }
}
