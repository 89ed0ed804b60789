//! battle_core - Rules core for a turn-based hero battler
//!
//! This library provides:
//! - DamageResolver: The ordered damage pipeline for one attack
//! - StatusEffectTracker: Per-entity status effects and turn processing
//! - HeroLifecycleManager: Death and soul-paid revival
//! - BuildSlotManager / SpellLockCoordinator: Equipping, locking and unlocking spells
//! - EconomyLedger: Currency balances, inventory and the transaction journal
//! - GameSession: One player's state, rules and event bus together

pub mod build;
pub mod combat;
pub mod config;
pub mod economy;
pub mod effects;
pub mod entity;
pub mod error;
pub mod events;
pub mod hero;
pub mod persistence;
pub mod prelude;
pub mod session;
pub mod spell;
pub mod types;

// Re-export core types for convenience
pub use build::{BuildSlotManager, SpellCollection, SpellLockCoordinator};
pub use combat::{AttackDescriptor, DamageResolver, DamageResult};
pub use config::{load_rules, parse_rules, ConfigError, DataTables, RulesConfig};
pub use economy::EconomyLedger;
pub use effects::{StatusEffectTracker, TurnResult};
pub use entity::CombatEntity;
pub use error::{ErrorKind, RulesError, RulesResult};
pub use events::{EventBus, EventSink, GameEvent};
pub use hero::{Hero, HeroLifecycleManager};
pub use persistence::{MemoryStore, Persistence, PlayerState};
pub use session::GameSession;
pub use spell::Spell;
