//! Status effects (burns, stuns, buffs) and their per-turn processing

mod active;
mod tracker;

pub use active::{ActiveEffect, EffectPayload};
pub(crate) use tracker::apply_stat_modifiers;
pub use tracker::{ActionCheck, ApplyOutcome, EffectTick, StatusEffectTracker, TurnResult};
