//! Prelude module for convenient imports
//!
//! ```rust
//! use battle_core::prelude::*;
//! ```

// Core types
pub use crate::types::{
    AttackModifier, BuildType, Currency, DamageType, Element, EvasionType, HeroStatus, Rarity,
    SpellCategory,
};
pub use crate::error::{ErrorKind, Resource, RulesError, RulesResult, Shortfall};

// Combat
pub use crate::combat::{AttackDescriptor, DamageResolver, DamageResult};
pub use crate::entity::{CombatEntity, PlayerModifier, Resistances};

// Status effects
pub use crate::config::StatusEffectId;
pub use crate::effects::{EffectPayload, StatusEffectTracker};

// Heroes and builds
pub use crate::build::{BuildSlotManager, SpellCollection, SpellLockCoordinator, BUILD_SIZE};
pub use crate::hero::{Hero, HeroLifecycleManager};
pub use crate::spell::Spell;

// Economy
pub use crate::economy::EconomyLedger;

// Config
pub use crate::config::{DataTables, RulesConfig};

// Events, persistence, session
pub use crate::events::{EventBus, EventSink, GameEvent};
pub use crate::persistence::{MemoryStore, Persistence, PlayerState};
pub use crate::session::GameSession;
