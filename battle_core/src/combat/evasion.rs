//! Evasion rolls

use super::roll_chance;
use crate::config::{ModifierStat, StatusEffectId};
use crate::effects::apply_stat_modifiers;
use crate::entity::CombatEntity;
use crate::types::EvasionType;
use rand::Rng;

/// Roll the defender's evasion against an attacker
///
/// A marked defender never evades. Otherwise each evasion type is rolled in
/// order, then the standard dodge chance scaled by the attacker's accuracy.
pub fn check_evasion(
    attacker: &CombatEntity,
    defender: &CombatEntity,
    rng: &mut impl Rng,
) -> Option<EvasionType> {
    if defender.has_status(StatusEffectId::Marked) {
        return None;
    }

    for evasion in EvasionType::all() {
        if roll_chance(rng, defender.evasion.get(*evasion)) {
            return Some(*evasion);
        }
    }

    let dodge = apply_stat_modifiers(defender.dodge_chance, defender, ModifierStat::DodgeChance);
    let accuracy = apply_stat_modifiers(attacker.accuracy, attacker, ModifierStat::Accuracy);

    // Accuracy above 1 shrinks the dodge chance, below 1 grows it
    if roll_chance(rng, dodge * (2.0 - accuracy)) {
        return Some(EvasionType::Dodge);
    }

    None
}
