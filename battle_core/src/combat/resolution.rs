//! Damage resolution - the ordered attack pipeline

use super::attack::AttackDescriptor;
use super::evasion::check_evasion;
use super::mitigation::{
    absorb_with_shield, apply_defense, effective_defense, resilience_multiplier,
    status_multipliers, total_resistance,
};
use super::result::{AppliedModifier, DamageResult, Reactions, StolenStats};
use super::roll_chance;
use crate::config::{
    Condition, DataTables, ElementalRelation, ModifierStat, PlayerModifierEffect, RulesConfig,
    StatusEffectId,
};
use crate::effects::apply_stat_modifiers;
use crate::entity::{CombatEntity, Shield};
use crate::types::{AttackModifier, DamageType};
use rand::Rng;
use tracing::{debug, trace};

/// Resolves attacks between two combat entities
///
/// Both entities are mutated in place: shields, mana, temporary stats,
/// amplify stacks and status effects (brittle) change as documented on
/// `resolve`.
pub struct DamageResolver<'a> {
    rules: &'a RulesConfig,
}

impl<'a> DamageResolver<'a> {
    pub fn new(rules: &'a RulesConfig) -> Self {
        DamageResolver { rules }
    }

    /// Resolve one attack without touching the defender's health
    ///
    /// Pipeline:
    /// 1. Evasion (riposte on success, then stop)
    /// 2. Passive and stacking damage modifiers
    /// 3. Conditional modifiers
    /// 4. Critical hit (brittle forces it and is consumed)
    /// 5. Elemental multiplier
    /// 6. Attack modifiers in descriptor order
    /// 7. Effective defense (penetration, armor reduction)
    /// 8. Defense
    /// 9. Resistance
    /// 10. Status effect multipliers
    /// 11. Shield absorption
    /// 12. Resilient
    /// 13. Floor
    /// 14. Reactions
    pub fn resolve(
        &self,
        attacker: &mut CombatEntity,
        defender: &mut CombatEntity,
        attack: &AttackDescriptor,
        rng: &mut impl Rng,
    ) -> DamageResult {
        let battle = &self.rules.battle;
        let params = &self.rules.attack_modifiers;
        let mut result = DamageResult::new(attack.base_damage);
        let mut damage = attack.base_damage.max(0.0);

        // Step 1: Evasion
        if attack.can_evade && !attack.has(AttackModifier::Pierce) {
            if let Some(evasion) = check_evasion(attacker, defender, rng) {
                result.was_evaded = true;
                result.evasion_type = Some(evasion);

                if defender.has_attack_modifier(AttackModifier::Riposte)
                    && roll_chance(rng, self.rules.reactions.riposte_chance)
                {
                    let riposte = (damage * self.rules.reactions.riposte_ratio).floor();
                    attacker.take_damage(riposte);
                    result.riposte_damage = Some(floor_damage(riposte));
                }

                debug!(
                    "{} evaded {}'s attack ({:?})",
                    defender.id, attacker.id, evasion
                );
                return result;
            }
        }

        // Step 2: Passive and stacking damage modifiers
        let boosted = apply_stat_modifiers(damage, attacker, ModifierStat::Damage);
        if damage > 0.0 && (boosted - damage).abs() > f64::EPSILON {
            result.modifiers_applied.push(AppliedModifier::PlayerDamage {
                multiplier: boosted / damage,
            });
        }
        damage = boosted;
        trace!("step 2 player modifiers: {}", damage);

        // Step 3: Conditional modifiers
        let bonus = self.conditional_bonus(attacker, defender);
        if bonus > 0.0 {
            damage *= 1.0 + bonus;
            result.modifiers_applied.push(AppliedModifier::Conditional { bonus });
        }
        trace!("step 3 conditional: {}", damage);

        // Step 4: Critical hit
        let brittle = defender.remove_status(StatusEffectId::Brittle);
        if attack.can_crit {
            let (chance, multiplier) = self.crit_profile(attacker, defender);
            if brittle || roll_chance(rng, chance) {
                damage *= multiplier;
                result.was_crit = true;
                result
                    .modifiers_applied
                    .push(AppliedModifier::Critical { multiplier, brittle });
            }
        }
        trace!("step 4 crit: {}", damage);

        // Step 5: Elemental multiplier
        let relation = self
            .rules
            .elemental_relation(attack.element, defender.element);
        let elemental = match relation {
            ElementalRelation::Advantage => battle.elemental_advantage_multiplier,
            ElementalRelation::Weakness => battle.elemental_weakness_multiplier,
            ElementalRelation::Neutral => 1.0,
        };
        if relation != ElementalRelation::Neutral {
            damage *= elemental;
            result.modifiers_applied.push(AppliedModifier::Elemental {
                relation,
                multiplier: elemental,
            });
        }
        trace!("step 5 elemental: {}", damage);

        // Step 6: Attack modifiers
        for modifier in &attack.modifiers {
            match modifier {
                AttackModifier::Shatter => {
                    let shield = defender.shield_value();
                    if shield > 0.0 {
                        let bonus = shield * (params.shatter_multiplier - 1.0);
                        damage += bonus;
                        defender.shield = Some(Shield { value: 0.0 });
                        result.modifiers_applied.push(AppliedModifier::Shatter { bonus });
                    }
                }
                AttackModifier::Execute => {
                    if defender.health_fraction() <= params.execute_threshold {
                        damage *= params.execute_multiplier;
                        result.modifiers_applied.push(AppliedModifier::Execute {
                            multiplier: params.execute_multiplier,
                        });
                    }
                }
                AttackModifier::Amplify => {
                    let entry = attacker
                        .amplify_stacks
                        .entry(defender.id.clone())
                        .or_insert(0);
                    let stacks = (*entry).min(params.amplify_max_stacks);
                    let multiplier = 1.0 + stacks as f64 * params.amplify_per_stack;
                    damage *= multiplier;
                    *entry = (stacks + 1).min(params.amplify_max_stacks);
                    result
                        .modifiers_applied
                        .push(AppliedModifier::Amplify { stacks, multiplier });
                }
                AttackModifier::Shred => {
                    let reduction = (defender.temporary.armor_reduction
                        + params.shred_per_application)
                        .min(1.0);
                    defender.temporary.armor_reduction = reduction;
                    result.modifiers_applied.push(AppliedModifier::Shred {
                        armor_reduction: reduction,
                    });
                }
                AttackModifier::Cleave => {
                    result.cleave_targets = Some(params.cleave_targets);
                    result.modifiers_applied.push(AppliedModifier::Cleave {
                        targets: params.cleave_targets,
                    });
                }
                AttackModifier::Overwhelm => {
                    result.overwhelm = true;
                    result.modifiers_applied.push(AppliedModifier::Overwhelm);
                }
                _ => {}
            }
        }
        trace!("step 6 attack modifiers: {}", damage);

        // Step 7: Effective defense
        let defense = effective_defense(defender, attack.damage_type, &attack.modifiers, params);
        if attack.has(AttackModifier::Penetration) && !attack.damage_type.ignores_defense() {
            result.modifiers_applied.push(AppliedModifier::Penetration {
                fraction: params.penetration,
            });
        }

        // Step 8: Defense
        if !attack.damage_type.ignores_defense() {
            result.defense_applied = defense;
        }
        damage = apply_defense(damage, defense, attack.damage_type, battle);
        trace!("step 8 defense {}: {}", defense, damage);

        // Step 9: Resistance
        let resistance = total_resistance(defender, attack.damage_type, attack.element, battle);
        result.resistance_applied = resistance;
        damage *= 1.0 - resistance;
        trace!("step 9 resistance {}: {}", resistance, damage);

        // Step 10: Status effect multipliers
        for (effect, multiplier) in status_multipliers(attacker, defender, battle) {
            damage *= multiplier;
            result
                .modifiers_applied
                .push(AppliedModifier::Status { effect, multiplier });
        }
        trace!("step 10 status: {}", damage);

        // Step 11: Shield
        let (remaining, absorbed) = absorb_with_shield(damage, defender);
        damage = remaining;
        result.shield_absorbed = absorbed;

        // Step 12: Resilient
        let resilience = resilience_multiplier(defender);
        if (resilience - 1.0).abs() > f64::EPSILON {
            damage *= resilience;
            result.modifiers_applied.push(AppliedModifier::Resilient {
                multiplier: resilience,
            });
        }

        // Step 13: Floor, clamped into the u64 range
        result.final_damage = floor_damage(damage);

        // Step 14: Reactions
        result.reactions = self.process_reactions(attacker, defender, attack, result.final_damage, rng);

        defender.last_damage_taken = Some(attack.damage_type);
        if result.final_damage > 0 {
            defender.damaged_this_turn = true;
        }

        debug!(
            "{} hit {} for {} ({})",
            attacker.id,
            defender.id,
            result.final_damage,
            result.summary()
        );
        result
    }

    /// Resolve an attack and subtract the final damage from the defender
    pub fn strike(
        &self,
        attacker: &mut CombatEntity,
        defender: &mut CombatEntity,
        attack: &AttackDescriptor,
        rng: &mut impl Rng,
    ) -> DamageResult {
        let was_alive = defender.is_alive();
        let mut result = self.resolve(attacker, defender, attack, rng);
        defender.take_damage(result.final_damage as f64);
        result.killing_blow = was_alive && !defender.is_alive();
        result
    }

    fn conditional_bonus(&self, attacker: &CombatEntity, defender: &CombatEntity) -> f64 {
        let battle = &self.rules.battle;

        attacker
            .player_modifiers
            .iter()
            .filter_map(|m| match m.effect {
                PlayerModifierEffect::Conditional {
                    condition,
                    value,
                    threshold,
                } => {
                    let holds = match condition {
                        Condition::NoDamageTaken => !attacker.damaged_last_turn,
                        Condition::HighMana => attacker.mana_fraction() >= battle.high_mana_ratio,
                        Condition::LowHealth => {
                            attacker.health_fraction() <= battle.low_health_ratio
                        }
                        Condition::TargetBelowThreshold => {
                            defender.health_fraction()
                                <= threshold.unwrap_or(battle.target_threshold)
                        }
                        Condition::FatalDamage => false,
                    };
                    holds.then_some(value)
                }
                _ => None,
            })
            .sum()
    }

    /// Crit chance and multiplier after modifiers and critical resistance
    fn crit_profile(&self, attacker: &CombatEntity, defender: &CombatEntity) -> (f64, f64) {
        let battle = &self.rules.battle;
        let base_chance = if attacker.crit_chance > 0.0 {
            attacker.crit_chance
        } else {
            battle.base_crit_chance
        };
        let base_multiplier = if attacker.crit_damage > 0.0 {
            attacker.crit_damage
        } else {
            battle.base_crit_multiplier
        };

        let chance = apply_stat_modifiers(base_chance, attacker, ModifierStat::CritChance)
            * (1.0 - defender.resistances.critical());
        let multiplier = apply_stat_modifiers(base_multiplier, attacker, ModifierStat::CritDamage);
        (chance, multiplier)
    }

    fn process_reactions(
        &self,
        attacker: &mut CombatEntity,
        defender: &mut CombatEntity,
        attack: &AttackDescriptor,
        final_damage: u64,
        rng: &mut impl Rng,
    ) -> Reactions {
        let ratios = &self.rules.reactions;
        let damage = final_damage as f64;
        let mut reactions = Reactions::default();
        let attacker_has =
            |a: &CombatEntity, m: AttackModifier| a.has_attack_modifier(m) || attack.has(m);

        if attacker_has(attacker, AttackModifier::Lifesteal) {
            reactions.lifesteal_healed = attacker.heal((damage * ratios.lifesteal_ratio).floor());
        }

        if defender.has_attack_modifier(AttackModifier::Absorb)
            && attack.damage_type == DamageType::Magical
        {
            reactions.mana_absorbed = defender.restore_mana((damage * ratios.absorb_ratio).floor());
        }

        if attacker_has(attacker, AttackModifier::Siphon) {
            let stolen = defender.drain_mana((defender.mana * ratios.siphon_ratio).floor());
            attacker.restore_mana(stolen);
            reactions.mana_siphoned = stolen;
        }

        if attacker_has(attacker, AttackModifier::Drain) {
            let gained = (damage * ratios.drain_ratio).floor();
            attacker.gain_shield(gained);
            reactions.shield_gained = gained;
        }

        if defender.has_status(StatusEffectId::Thorns) {
            reactions.thorns_reflected = attacker.take_damage((damage * ratios.thorns_ratio).floor());
        }

        if defender.has_attack_modifier(AttackModifier::Counter)
            && roll_chance(rng, ratios.counter_chance)
        {
            reactions.countered = true;
            reactions.counter_damage = attacker.take_damage((damage * ratios.counter_ratio).floor());
        }

        if attacker_has(attacker, AttackModifier::Reave) {
            let stolen = StolenStats {
                attack: (defender.attack.max(0.0) * ratios.reave_ratio).floor(),
                defense: (defender.defense.max(0.0) * ratios.reave_ratio).floor(),
            };
            attacker.temporary.attack += stolen.attack;
            attacker.temporary.defense += stolen.defense;
            defender.attack -= stolen.attack;
            defender.defense -= stolen.defense;
            reactions.stats_stolen = Some(stolen);
        }

        reactions
    }
}

/// Floor to a whole damage value; negatives and NaN become 0, huge values cap at `u64::MAX`
fn floor_damage(damage: f64) -> u64 {
    if damage.is_nan() || damage <= 0.0 {
        return 0;
    }
    if damage >= u64::MAX as f64 {
        return u64::MAX;
    }
    damage.floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatusEffectDef;
    use crate::effects::{ActiveEffect, EffectPayload};
    use crate::entity::{PlayerModifier, Resistances};
    use crate::types::{Element, EvasionType};
    use rand::rngs::mock::StepRng;

    const EPS: f64 = 1e-9;

    fn always() -> StepRng {
        StepRng::new(0, 0)
    }

    fn never() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn with_status(mut entity: CombatEntity, rules: &RulesConfig, id: StatusEffectId) -> CombatEntity {
        let def: &StatusEffectDef = rules.status_effect(id).unwrap();
        entity
            .status_effects
            .push(ActiveEffect::new(def, &EffectPayload::default()));
        entity
    }

    fn modifier(rules: &RulesConfig, id: &str) -> PlayerModifier {
        PlayerModifier::from_def(rules.player_modifier(id).unwrap())
    }

    #[test]
    fn test_plain_physical_hit() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 50.0);
        let mut defender = CombatEntity::new("d", 200.0, 50.0).with_defense(20.0, 0.0);

        let result = resolver.resolve(
            &mut attacker,
            &mut defender,
            &AttackDescriptor::new(100.0),
            &mut never(),
        );

        assert_eq!(result.final_damage, 90);
        assert!(!result.was_crit);
        assert!(!result.was_evaded);
        // resolve leaves health to the caller
        assert!((defender.health - 200.0).abs() < EPS);
        assert!(defender.damaged_this_turn);
        assert_eq!(defender.last_damage_taken, Some(DamageType::Physical));
    }

    #[test]
    fn test_pierce_skips_evasion() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 100.0, 0.0).with_evasion(EvasionType::Phase, 1.0);

        let attack = AttackDescriptor::new(10.0)
            .no_crit()
            .with_modifier(AttackModifier::Pierce);
        let result = resolver.resolve(&mut attacker, &mut defender, &attack, &mut always());
        assert!(!result.was_evaded);
        assert_eq!(result.final_damage, 10);
    }

    #[test]
    fn test_evasion_with_riposte() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 200.0, 0.0);
        let mut defender = CombatEntity::new("d", 100.0, 0.0)
            .with_dodge(0.5)
            .with_attack_modifier(AttackModifier::Riposte);

        let result = resolver.resolve(
            &mut attacker,
            &mut defender,
            &AttackDescriptor::new(55.0),
            &mut always(),
        );

        assert!(result.was_evaded);
        assert_eq!(result.final_damage, 0);
        assert_eq!(result.riposte_damage, Some(44));
        assert!((attacker.health - 156.0).abs() < EPS);
        assert!(!defender.damaged_this_turn);
    }

    #[test]
    fn test_passive_and_conditional_modifiers() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 100.0)
            .with_player_modifier(modifier(&rules, "empowered"))
            .with_player_modifier(modifier(&rules, "arcane_surge"))
            .with_player_modifier(modifier(&rules, "vigilant"));
        let mut defender = CombatEntity::new("d", 100.0, 0.0);

        // 100 * 1.10 * (1 + 0.20 + 0.15)
        let result = resolver.resolve(
            &mut attacker,
            &mut defender,
            &AttackDescriptor::new(100.0).guaranteed(),
            &mut never(),
        );
        assert_eq!(result.final_damage, 148);
    }

    #[test]
    fn test_stacking_modifier_capped() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0)
            .with_player_modifier(modifier(&rules, "momentum").with_stacks(9));
        let mut defender = CombatEntity::new("d", 100.0, 0.0);

        let result = resolver.resolve(
            &mut attacker,
            &mut defender,
            &AttackDescriptor::new(100.0).guaranteed(),
            &mut never(),
        );
        // 5 stacks * 5%
        assert_eq!(result.final_damage, 125);
    }

    #[test]
    fn test_brittle_forces_crit_and_is_consumed() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = with_status(CombatEntity::new("d", 500.0, 0.0), &rules, StatusEffectId::Brittle);

        let result = resolver.resolve(
            &mut attacker,
            &mut defender,
            &AttackDescriptor::new(100.0).no_evade(),
            &mut never(),
        );

        assert!(result.was_crit);
        assert_eq!(result.final_damage, 150);
        assert!(!defender.has_status(StatusEffectId::Brittle));
    }

    #[test]
    fn test_critical_resistance_blocks_crit() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 500.0, 0.0)
            .with_resistances(Resistances::new().with_critical(1.0));

        let result = resolver.resolve(
            &mut attacker,
            &mut defender,
            &AttackDescriptor::new(100.0).no_evade(),
            &mut always(),
        );
        assert!(!result.was_crit);
        assert_eq!(result.final_damage, 100);
    }

    #[test]
    fn test_elemental_advantage_and_weakness() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut ice = CombatEntity::new("ice", 500.0, 0.0).with_element(Element::Ice);
        let mut water = CombatEntity::new("water", 500.0, 0.0).with_element(Element::Water);

        let fire = AttackDescriptor::new(100.0)
            .guaranteed()
            .with_element(Element::Fire);

        let strong = resolver.resolve(&mut attacker, &mut ice, &fire, &mut never());
        assert_eq!(strong.final_damage, 150);

        let weak = resolver.resolve(&mut attacker, &mut water, &fire, &mut never());
        assert_eq!(weak.final_damage, 75);
    }

    #[test]
    fn test_shatter_consumes_shield() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 500.0, 0.0).with_shield(40.0);

        let attack = AttackDescriptor::new(100.0)
            .guaranteed()
            .with_modifier(AttackModifier::Shatter);
        let result = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());

        // 100 + 40 * 0.5, no shield left to absorb
        assert_eq!(result.final_damage, 120);
        assert!(result.shield_absorbed.abs() < EPS);
        assert!(defender.shield_value().abs() < EPS);
    }

    #[test]
    fn test_execute_below_threshold() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 100.0, 0.0);
        defender.health = 25.0;

        let attack = AttackDescriptor::new(10.0)
            .guaranteed()
            .with_modifier(AttackModifier::Execute);
        let result = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());
        assert_eq!(result.final_damage, 20);
    }

    #[test]
    fn test_amplify_reads_then_increments() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 10_000.0, 0.0);
        let attack = AttackDescriptor::new(100.0)
            .guaranteed()
            .with_modifier(AttackModifier::Amplify);

        let damages: Vec<u64> = (0..7)
            .map(|_| {
                resolver
                    .resolve(&mut attacker, &mut defender, &attack, &mut never())
                    .final_damage
            })
            .collect();

        assert_eq!(damages, vec![100, 110, 120, 130, 140, 150, 150]);
        assert_eq!(attacker.amplify_stacks.get("d"), Some(&5));
    }

    #[test]
    fn test_shred_accumulates() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 10_000.0, 0.0).with_defense(100.0, 0.0);
        let attack = AttackDescriptor::new(100.0)
            .guaranteed()
            .with_modifier(AttackModifier::Shred);

        let first = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());
        // defense 100 * 0.9 -> 100 - 45
        assert_eq!(first.final_damage, 55);

        let second = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());
        // defense 100 * 0.8 -> 100 - 40
        assert_eq!(second.final_damage, 60);
        assert!((defender.temporary.armor_reduction - 0.2).abs() < EPS);
    }

    #[test]
    fn test_cleave_and_overwhelm_recorded() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 100.0, 0.0);
        let attack = AttackDescriptor::new(10.0)
            .guaranteed()
            .with_modifier(AttackModifier::Cleave)
            .with_modifier(AttackModifier::Overwhelm);

        let result = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());
        assert_eq!(result.cleave_targets, Some(2));
        assert!(result.overwhelm);
        assert_eq!(result.final_damage, 10);
    }

    #[test]
    fn test_penetration() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 1000.0, 0.0).with_defense(100.0, 0.0);
        let attack = AttackDescriptor::new(100.0)
            .guaranteed()
            .with_modifier(AttackModifier::Penetration);

        let result = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());
        // 100 - 70 / 2
        assert_eq!(result.final_damage, 65);
    }

    #[test]
    fn test_true_and_pure_damage() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 1000.0, 0.0)
            .with_defense(100.0, 100.0)
            .with_resistances(
                Resistances::new()
                    .with_damage_type(DamageType::True, 0.5)
                    .with_element(Element::Dark, 0.5),
            );

        let true_hit = AttackDescriptor::new(100.0)
            .guaranteed()
            .with_type(DamageType::True);
        let result = resolver.resolve(&mut attacker, &mut defender, &true_hit, &mut never());
        assert_eq!(result.final_damage, 50);

        let pure_hit = AttackDescriptor::new(100.0)
            .guaranteed()
            .with_type(DamageType::Pure)
            .with_element(Element::Dark);
        let result = resolver.resolve(&mut attacker, &mut defender, &pure_hit, &mut never());
        assert_eq!(result.final_damage, 100);
    }

    #[test]
    fn test_status_multipliers() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = with_status(CombatEntity::new("a", 100.0, 0.0), &rules, StatusEffectId::Berserk);
        let mut defender = with_status(CombatEntity::new("d", 1000.0, 0.0), &rules, StatusEffectId::Vulnerability);

        let result = resolver.resolve(
            &mut attacker,
            &mut defender,
            &AttackDescriptor::new(100.0).guaranteed(),
            &mut never(),
        );
        // 100 * 1.5 * 1.3
        assert_eq!(result.final_damage, 195);
    }

    #[test]
    fn test_fortified_marked_and_fear() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let attack = AttackDescriptor::new(100.0).guaranteed();
        let hit = |attacker: &mut CombatEntity, defender: &mut CombatEntity| {
            resolver
                .resolve(attacker, defender, &attack, &mut never())
                .final_damage
        };

        let mut plain = CombatEntity::new("a", 100.0, 0.0);
        let mut fortified = with_status(CombatEntity::new("d", 1000.0, 0.0), &rules, StatusEffectId::Fortified);
        assert_eq!(hit(&mut plain, &mut fortified), 75);

        let mut marked = with_status(CombatEntity::new("d", 1000.0, 0.0), &rules, StatusEffectId::Marked);
        assert_eq!(hit(&mut plain, &mut marked), 125);

        let mut afraid = with_status(CombatEntity::new("a", 100.0, 0.0), &rules, StatusEffectId::Fear);
        let mut target = CombatEntity::new("d", 1000.0, 0.0);
        assert_eq!(hit(&mut afraid, &mut target), 90);

        // 100 * 0.75 * 1.25 * 0.9 = 84.375
        let both = with_status(CombatEntity::new("d", 1000.0, 0.0), &rules, StatusEffectId::Fortified);
        let mut both = with_status(both, &rules, StatusEffectId::Marked);
        assert_eq!(hit(&mut afraid, &mut both), 84);
    }

    #[test]
    fn test_desperation_at_low_health() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let attack = AttackDescriptor::new(100.0).guaranteed();
        let mut attacker = CombatEntity::new("a", 100.0, 0.0)
            .with_player_modifier(modifier(&rules, "desperation"));
        let mut defender = CombatEntity::new("d", 1000.0, 0.0);

        attacker.health = 50.0;
        let healthy = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());
        assert_eq!(healthy.final_damage, 100);

        attacker.health = 25.0;
        let desperate = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());
        assert_eq!(desperate.final_damage, 130);
    }

    #[test]
    fn test_executioner_on_wounded_target() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let attack = AttackDescriptor::new(100.0).guaranteed();
        let mut attacker = CombatEntity::new("a", 100.0, 0.0)
            .with_player_modifier(modifier(&rules, "executioner"));
        let mut defender = CombatEntity::new("d", 100.0, 0.0);

        defender.health = 60.0;
        let result = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());
        assert_eq!(result.final_damage, 100);

        defender.health = 20.0;
        let result = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());
        assert_eq!(result.final_damage, 125);
    }

    #[test]
    fn test_floor_damage_bounds() {
        assert_eq!(floor_damage(-5.0), 0);
        assert_eq!(floor_damage(f64::NAN), 0);
        assert_eq!(floor_damage(89.99), 89);
        assert_eq!(floor_damage(5_000_000_000.7), 5_000_000_000);
        assert_eq!(floor_damage(1e30), u64::MAX);
    }

    #[test]
    fn test_huge_hit_keeps_full_damage() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 1e12, 0.0);

        let attack = AttackDescriptor::new(1e10).guaranteed();
        let result = resolver.resolve(&mut attacker, &mut defender, &attack, &mut never());
        assert_eq!(result.final_damage, 10_000_000_000);
    }

    #[test]
    fn test_resilient_after_shield() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 1000.0, 0.0)
            .with_shield(60.0)
            .with_player_modifier(modifier(&rules, "resilient"));

        let result = resolver.resolve(
            &mut attacker,
            &mut defender,
            &AttackDescriptor::new(100.0).guaranteed(),
            &mut never(),
        );
        // (100 - 60) * 0.85
        assert_eq!(result.final_damage, 34);
        assert!((result.shield_absorbed - 60.0).abs() < EPS);
    }

    #[test]
    fn test_reactions() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 200.0, 100.0)
            .with_attack_modifier(AttackModifier::Lifesteal)
            .with_attack_modifier(AttackModifier::Drain);
        attacker.health = 100.0;
        attacker.mana = 0.0;
        let mut defender = with_status(
            CombatEntity::new("d", 1000.0, 100.0)
                .with_attack(50.0)
                .with_defense(0.0, 0.0)
                .with_attack_modifier(AttackModifier::Counter),
            &rules,
            StatusEffectId::Thorns,
        );

        let attack = AttackDescriptor::new(100.0)
            .no_crit()
            .no_evade()
            .with_modifier(AttackModifier::Siphon)
            .with_modifier(AttackModifier::Reave);
        let result = resolver.resolve(&mut attacker, &mut defender, &attack, &mut always());
        let reactions = &result.reactions;

        assert_eq!(result.final_damage, 100);
        assert!((reactions.lifesteal_healed - 20.0).abs() < EPS);
        assert!((reactions.shield_gained - 25.0).abs() < EPS);
        assert!((reactions.mana_siphoned - 15.0).abs() < EPS);
        assert!((reactions.thorns_reflected - 30.0).abs() < EPS);
        assert!(reactions.countered);
        assert!((reactions.counter_damage - 50.0).abs() < EPS);
        assert_eq!(
            reactions.stats_stolen,
            Some(StolenStats {
                attack: 5.0,
                defense: 0.0
            })
        );

        // 100 + 20 lifesteal - 30 thorns - 50 counter
        assert!((attacker.health - 40.0).abs() < EPS);
        assert!((attacker.mana - 15.0).abs() < EPS);
        assert!((defender.mana - 85.0).abs() < EPS);
        assert!((attacker.temporary.attack - 5.0).abs() < EPS);
        assert!((defender.attack - 45.0).abs() < EPS);
    }

    #[test]
    fn test_absorb_only_for_magical() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 1000.0, 100.0)
            .with_attack_modifier(AttackModifier::Absorb);
        defender.mana = 0.0;

        let physical = AttackDescriptor::new(100.0).guaranteed();
        resolver.resolve(&mut attacker, &mut defender, &physical, &mut never());
        assert!(defender.mana.abs() < EPS);

        let magical = physical.clone().with_type(DamageType::Magical);
        let result = resolver.resolve(&mut attacker, &mut defender, &magical, &mut never());
        assert!((result.reactions.mana_absorbed - 30.0).abs() < EPS);
        assert!((defender.mana - 30.0).abs() < EPS);
    }

    #[test]
    fn test_reave_defense_protects_attacker() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 1000.0, 0.0);
        let mut defender = CombatEntity::new("d", 1000.0, 0.0).with_defense(100.0, 0.0);

        let reave = AttackDescriptor::new(100.0)
            .guaranteed()
            .with_modifier(AttackModifier::Reave);
        resolver.resolve(&mut attacker, &mut defender, &reave, &mut never());

        assert!((attacker.defense_against(DamageType::Physical) - 10.0).abs() < EPS);
        assert!((defender.defense - 90.0).abs() < EPS);
    }

    #[test]
    fn test_strike_reports_killing_blow() {
        let rules = RulesConfig::default();
        let resolver = DamageResolver::new(&rules);
        let mut attacker = CombatEntity::new("a", 100.0, 0.0);
        let mut defender = CombatEntity::new("d", 50.0, 0.0);

        let attack = AttackDescriptor::new(80.0).guaranteed();
        let result = resolver.strike(&mut attacker, &mut defender, &attack, &mut never());

        assert!(result.killing_blow);
        assert!(defender.health.abs() < EPS);
        assert!(result.summary().contains("FATAL"));
    }
}
