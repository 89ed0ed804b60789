//! Game events published by the rules core
//!
//! Components never call their observers directly. They publish a
//! `GameEvent` into an `EventSink`; an `EventBus` fans events out to
//! subscribers in registration order.

use crate::build::UnlockPayment;
use crate::types::BuildType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{trace, warn};

/// Snapshot of something that happened in the rules core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    HeroDied {
        hero_id: String,
        death_count: u32,
        revival_cost: u64,
        at: DateTime<Utc>,
    },
    HeroRevived {
        hero_id: String,
        death_count: u32,
        souls_spent: u64,
        next_revival_cost: u64,
        at: DateTime<Utc>,
    },
    SpellLocked {
        hero_id: String,
        build: BuildType,
        slot: usize,
        spell_id: String,
        at: DateTime<Utc>,
    },
    SpellUnlocked {
        hero_id: String,
        build: BuildType,
        slot: usize,
        spell_id: String,
        payment: UnlockPayment,
        at: DateTime<Utc>,
    },
    SoulsGained {
        amount: u64,
        balance: u64,
        source: String,
        at: DateTime<Utc>,
    },
    SoulsSpent {
        amount: u64,
        balance: u64,
        purpose: String,
        at: DateTime<Utc>,
    },
    BuildSwitched {
        hero_id: String,
        from: BuildType,
        to: BuildType,
        at: DateTime<Utc>,
    },
    BuildCopied {
        hero_id: String,
        from: BuildType,
        to: BuildType,
        at: DateTime<Utc>,
    },
    BuildCleared {
        hero_id: String,
        build: BuildType,
        slots_unlocked: usize,
        items_used: u64,
        gems_spent: u64,
        at: DateTime<Utc>,
    },
}

impl GameEvent {
    /// Name subscribers filter on
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::HeroDied { .. } => "hero_died",
            GameEvent::HeroRevived { .. } => "hero_revived",
            GameEvent::SpellLocked { .. } => "spell_locked",
            GameEvent::SpellUnlocked { .. } => "spell_unlocked",
            GameEvent::SoulsGained { .. } => "souls_gained",
            GameEvent::SoulsSpent { .. } => "souls_spent",
            GameEvent::BuildSwitched { .. } => "build_switched",
            GameEvent::BuildCopied { .. } => "build_copied",
            GameEvent::BuildCleared { .. } => "build_cleared",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            GameEvent::HeroDied { at, .. }
            | GameEvent::HeroRevived { at, .. }
            | GameEvent::SpellLocked { at, .. }
            | GameEvent::SpellUnlocked { at, .. }
            | GameEvent::SoulsGained { at, .. }
            | GameEvent::SoulsSpent { at, .. }
            | GameEvent::BuildSwitched { at, .. }
            | GameEvent::BuildCopied { at, .. }
            | GameEvent::BuildCleared { at, .. } => *at,
        }
    }
}

/// Anything that accepts published events
pub trait EventSink {
    fn publish(&mut self, event: GameEvent);
}

/// Records events in publication order
impl EventSink for Vec<GameEvent> {
    fn publish(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Error returned by a failing subscriber
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type Handler = Box<dyn FnMut(&GameEvent) -> Result<(), HandlerError>>;

/// Handle used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Subscription {
    id: SubscriptionId,
    /// `None` receives every event
    event: Option<String>,
    handler: Handler,
}

/// Delivery counts for one published event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub delivered: usize,
    pub failed: usize,
}

/// Synchronous publish/subscribe hub
///
/// Subscribers run in registration order. A subscriber returning an error is
/// logged and skipped; the remaining subscribers still run and the error
/// never reaches the publisher.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one named event
    pub fn subscribe<F>(&mut self, event: &str, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) -> Result<(), HandlerError> + 'static,
    {
        self.add(Some(event.to_string()), Box::new(handler))
    }

    /// Subscribe to every event
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) -> Result<(), HandlerError> + 'static,
    {
        self.add(None, Box::new(handler))
    }

    /// Remove a subscription; false when it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Deliver an event to every matching subscriber
    pub fn dispatch(&mut self, event: &GameEvent) -> Dispatch {
        let mut dispatch = Dispatch::default();
        let name = event.name();

        for subscription in self.subscriptions.iter_mut() {
            if subscription.event.as_deref().map_or(false, |e| e != name) {
                continue;
            }

            match (subscription.handler)(event) {
                Ok(()) => dispatch.delivered += 1,
                Err(err) => {
                    dispatch.failed += 1;
                    warn!(
                        "Event subscriber {} failed on {}: {}",
                        subscription.id, name, err
                    );
                }
            }
        }

        trace!(
            "Dispatched {} to {} subscribers ({} failed)",
            name,
            dispatch.delivered + dispatch.failed,
            dispatch.failed
        );
        dispatch
    }

    fn add(&mut self, event: Option<String>, handler: Handler) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, event, handler });
        id
    }
}

impl EventSink for EventBus {
    fn publish(&mut self, event: GameEvent) {
        self.dispatch(&event);
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
