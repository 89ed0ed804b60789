//! Combat resolution - Apply one attack between two combat entities

mod attack;
mod evasion;
mod mitigation;
mod resolution;
mod result;

pub use attack::AttackDescriptor;
pub use evasion::check_evasion;
pub use mitigation::{apply_defense, total_resistance};
pub use resolution::DamageResolver;
pub use result::{AppliedModifier, DamageResult, Reactions, StolenStats};

use rand::Rng;

/// Independent Bernoulli trial
///
/// Chances at or below zero never succeed and chances at or above one always
/// succeed; neither consumes randomness.
pub fn roll_chance(rng: &mut impl Rng, chance: f64) -> bool {
    if chance <= 0.0 || chance.is_nan() {
        return false;
    }
    if chance >= 1.0 {
        return true;
    }
    rng.gen::<f64>() < chance
}
