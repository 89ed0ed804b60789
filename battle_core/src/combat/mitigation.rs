//! Defense, resistance, status multipliers and shields

use crate::config::{AttackModifierParams, BattleConstants, PlayerModifierEffect, StatusEffectId};
use crate::entity::CombatEntity;
use crate::types::{AttackModifier, DamageType, Element};

/// Defense the defender brings against this attack
///
/// Penetration ignores a fixed fraction and accumulated armor reduction
/// (shred) removes a further share.
pub fn effective_defense(
    defender: &CombatEntity,
    damage_type: DamageType,
    modifiers: &[AttackModifier],
    params: &AttackModifierParams,
) -> f64 {
    let mut defense = defender.defense_against(damage_type);

    if modifiers.contains(&AttackModifier::Penetration) {
        defense *= 1.0 - params.penetration;
    }

    defense *= 1.0 - defender.temporary.armor_reduction.clamp(0.0, 1.0);
    defense.max(0.0)
}

/// `max(min_hit, damage - defense / divisor)`; true and pure damage pass through
pub fn apply_defense(
    damage: f64,
    defense: f64,
    damage_type: DamageType,
    battle: &BattleConstants,
) -> f64 {
    if damage_type.ignores_defense() {
        return damage;
    }
    (damage - defense / battle.defense_divisor).max(battle.min_hit_damage)
}

/// Summed resistance against a hit, clamped to the resistance cap
///
/// Pure damage is never resisted.
pub fn total_resistance(
    defender: &CombatEntity,
    damage_type: DamageType,
    element: Element,
    battle: &BattleConstants,
) -> f64 {
    if damage_type.ignores_resistance() {
        return 0.0;
    }

    let mut resistance = defender.resistances.damage_type(damage_type);

    if !element.is_neutral() {
        resistance += defender.resistances.element(element);
    }

    if defender.last_damage_taken == Some(damage_type) {
        resistance += defender
            .player_modifiers
            .iter()
            .filter_map(|m| match m.effect {
                PlayerModifierEffect::Adaptive { bonus } => Some(bonus),
                _ => None,
            })
            .sum::<f64>();
    }

    resistance.clamp(0.0, battle.resistance_cap)
}

/// Multipliers from defender and attacker status effects
pub fn status_multipliers(
    attacker: &CombatEntity,
    defender: &CombatEntity,
    battle: &BattleConstants,
) -> Vec<(StatusEffectId, f64)> {
    let incoming = [
        (StatusEffectId::Vulnerability, battle.vulnerability_multiplier),
        (StatusEffectId::Fortified, battle.fortified_multiplier),
        (StatusEffectId::Marked, battle.marked_multiplier),
    ];
    let outgoing = [
        (StatusEffectId::Berserk, battle.berserk_multiplier),
        (StatusEffectId::Fear, battle.fear_damage_multiplier),
    ];

    incoming
        .into_iter()
        .filter(|(id, _)| defender.has_status(*id))
        .chain(
            outgoing
                .into_iter()
                .filter(|(id, _)| attacker.has_status(*id)),
        )
        .collect()
}

/// Soak damage into the defender's shield
///
/// Returns `(remaining_damage, absorbed)`.
pub fn absorb_with_shield(damage: f64, defender: &mut CombatEntity) -> (f64, f64) {
    match defender.shield.as_mut() {
        Some(shield) if shield.value > 0.0 && damage > 0.0 => {
            let absorbed = damage.min(shield.value);
            shield.value -= absorbed;
            (damage - absorbed, absorbed)
        }
        _ => (damage, 0.0),
    }
}

/// Final incoming multiplier from the defender's resilient modifiers
pub fn resilience_multiplier(defender: &CombatEntity) -> f64 {
    defender
        .player_modifiers
        .iter()
        .filter_map(|m| match m.effect {
            PlayerModifierEffect::Resilient { multiplier } => Some(multiplier),
            _ => None,
        })
        .product()
}
