//! Applying, expiring and ticking status effects

use super::{ActiveEffect, EffectPayload};
use crate::combat::roll_chance;
use crate::config::{
    DataTables, EffectKind, ModifierStat, PlayerModifierEffect, RulesConfig, StackRule,
    StatusEffectId,
};
use crate::entity::CombatEntity;
use crate::error::{RulesError, RulesResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// What happened when an effect was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// New entry recorded
    Applied,
    /// Existing entry gained a stack
    Stacked { stacks: u32 },
    /// Existing entry had its duration reset
    Refreshed,
    /// Status resistance rejected the application
    Resisted,
}

/// Contribution of one effect to a processed turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectTick {
    pub id: StatusEffectId,
    pub damage: f64,
    pub healing: f64,
    pub mana_gain: f64,
    pub mana_loss: f64,
}

/// Result of processing one turn of status effects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub damage: f64,
    pub healing: f64,
    pub mana_gain: f64,
    pub mana_loss: f64,
    pub processed: Vec<EffectTick>,
    /// Effects removed at the end of this turn
    pub expired: Vec<StatusEffectId>,
}

/// Whether an entity may act this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCheck {
    pub can_act: bool,
    /// Spellcasting specifically; false under silence
    pub can_cast: bool,
    pub confused: bool,
    /// Effect responsible when acting or casting is blocked
    pub blocked_by: Option<StatusEffectId>,
}

/// Owns the status effect rules for every entity it is handed
pub struct StatusEffectTracker<'a> {
    rules: &'a RulesConfig,
}

impl<'a> StatusEffectTracker<'a> {
    pub fn new(rules: &'a RulesConfig) -> Self {
        StatusEffectTracker { rules }
    }

    /// Apply an effect, stacking or refreshing an existing entry
    ///
    /// The target's status resistance is rolled first; a successful resist
    /// leaves the target untouched and reports `Resisted`.
    pub fn apply_effect(
        &self,
        target: &mut CombatEntity,
        id: StatusEffectId,
        payload: &EffectPayload,
        rng: &mut impl Rng,
    ) -> RulesResult<ApplyOutcome> {
        let def = self
            .rules
            .status_effect(id)
            .ok_or_else(|| RulesError::not_found(format!("status effect '{}'", id)))?;

        if let Some(duration) = payload.duration.filter(|d| *d <= 0) {
            return Err(RulesError::validation(format!(
                "{} duration must be positive, got {}",
                id, duration
            )));
        }

        if roll_chance(rng, target.resistances.status()) {
            debug!("{} resisted {}", target.id, id);
            return Ok(ApplyOutcome::Resisted);
        }

        let duration = payload.duration.unwrap_or(def.duration);

        let outcome = match target.status_effects.iter_mut().find(|e| e.id == id) {
            Some(existing) => match def.stacking {
                StackRule::Stack if existing.stacks < def.max_stacks => {
                    existing.stacks += 1;
                    ApplyOutcome::Stacked {
                        stacks: existing.stacks,
                    }
                }
                // Refresh-only effects and stackable effects at their cap
                _ => {
                    existing.duration = duration;
                    ApplyOutcome::Refreshed
                }
            },
            None => {
                target.status_effects.push(ActiveEffect::new(def, payload));
                ApplyOutcome::Applied
            }
        };

        debug!("{} on {}: {:?}", id, target.id, outcome);
        Ok(outcome)
    }

    /// Remove an effect; false when it was not present
    pub fn remove_effect(&self, target: &mut CombatEntity, id: StatusEffectId) -> bool {
        target.remove_status(id)
    }

    pub fn has_effect(&self, entity: &CombatEntity, id: StatusEffectId) -> bool {
        entity.has_status(id)
    }

    pub fn effect<'e>(&self, entity: &'e CombatEntity, id: StatusEffectId) -> Option<&'e ActiveEffect> {
        entity.status(id)
    }

    /// Drop every effect; returns how many were removed
    pub fn clear_all(&self, entity: &mut CombatEntity) -> usize {
        let count = entity.status_effects.len();
        entity.status_effects.clear();
        count
    }

    /// Advance every effect by one turn
    ///
    /// Each effect contributes its turn before its duration is decremented,
    /// so an effect on its final turn still ticks. The entity's health and
    /// mana are not touched; see `CombatEntity::apply_turn`.
    pub fn process_turn(&self, entity: &mut CombatEntity) -> TurnResult {
        let mut result = TurnResult::default();
        let shift = self.rules.turn.mana_regen_shift;
        let mana_regen = entity.mana_regen;

        let mut effects = std::mem::take(&mut entity.status_effects);
        effects.retain_mut(|effect| {
            let Some(def) = self.rules.status_effect(effect.id) else {
                warn!("Dropping {} from {}: not in catalog", effect.id, entity.id);
                return false;
            };

            let mut tick = EffectTick {
                id: effect.id,
                damage: 0.0,
                healing: 0.0,
                mana_gain: 0.0,
                mana_loss: 0.0,
            };

            // Step 1: Turn contribution
            match (def.kind, effect.id) {
                (EffectKind::Dot, _) => tick.damage = effect.tick_damage(),
                (EffectKind::Hot, _) => tick.healing = effect.heal_per_turn,
                (_, StatusEffectId::Clarity) => tick.mana_gain = mana_regen * shift,
                (_, StatusEffectId::Fear) => tick.mana_loss = mana_regen * shift,
                _ => {}
            }

            result.damage += tick.damage;
            result.healing += tick.healing;
            result.mana_gain += tick.mana_gain;
            result.mana_loss += tick.mana_loss;
            result.processed.push(tick);

            // Step 2: Decrement and expire
            effect.duration -= 1;
            if effect.is_expired() {
                result.expired.push(effect.id);
                return false;
            }
            true
        });
        entity.status_effects = effects;

        entity.damaged_last_turn = entity.damaged_this_turn;
        entity.damaged_this_turn = false;

        trace!(
            "{} turn: {} damage, {} healing, {} expired",
            entity.id,
            result.damage,
            result.healing,
            result.expired.len()
        );
        result
    }

    /// Whether the entity may act and cast this turn
    pub fn can_act(&self, entity: &CombatEntity, rng: &mut impl Rng) -> ActionCheck {
        if let Some(blocking) = entity.status_effects.iter().find(|e| e.id.blocks_action()) {
            return ActionCheck {
                can_act: false,
                can_cast: false,
                confused: false,
                blocked_by: Some(blocking.id),
            };
        }

        let confused = entity.has_status(StatusEffectId::Confuse);
        if confused && !roll_chance(rng, self.rules.turn.confuse_act_chance) {
            return ActionCheck {
                can_act: false,
                can_cast: false,
                confused,
                blocked_by: Some(StatusEffectId::Confuse),
            };
        }

        let silenced = entity.has_status(StatusEffectId::Silence);
        ActionCheck {
            can_act: true,
            can_cast: !silenced,
            confused,
            blocked_by: silenced.then_some(StatusEffectId::Silence),
        }
    }

    /// Mana regenerated per turn after modifiers and effects, floored
    pub fn calculate_mana_regen(&self, entity: &CombatEntity) -> u32 {
        let base = if entity.mana_regen > 0.0 {
            entity.mana_regen
        } else {
            self.rules.turn.mana_regen_per_turn
        };

        let mut regen = apply_stat_modifiers(base, entity, ModifierStat::ManaRegen);
        let shift = self.rules.turn.mana_regen_shift;
        if entity.has_status(StatusEffectId::Fear) {
            regen *= 1.0 - shift;
        }
        if entity.has_status(StatusEffectId::Clarity) {
            regen *= 1.0 + shift;
        }

        regen.max(0.0).floor() as u32
    }
}

/// Scale a stat by the entity's passive and stacking player modifiers
pub(crate) fn apply_stat_modifiers(value: f64, entity: &CombatEntity, stat: ModifierStat) -> f64 {
    entity
        .player_modifiers
        .iter()
        .fold(value, |acc, modifier| match &modifier.effect {
            PlayerModifierEffect::Passive { stat: s, value } if *s == stat => acc * (1.0 + value),
            PlayerModifierEffect::Stacking {
                stat: s,
                value_per_stack,
                max_stacks,
            } if *s == stat => {
                let stacks = modifier.stacks.min(*max_stacks) as f64;
                acc * (1.0 + value_per_stack * stacks)
            }
            _ => acc,
        })
}
