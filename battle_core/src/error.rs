//! Error taxonomy shared by every core operation
//!
//! Expected failures (a purchase the player cannot afford, unlocking a slot
//! that is not locked) come back as a `RulesError` inside a `Result`. Panics
//! are reserved for programmer errors such as a malformed data table.

use crate::types::Currency;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse category of a `RulesError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input: unknown build type, slot index out of range, ...
    Validation,
    /// Operation illegal for the current state
    InvalidState,
    /// Currency or item shortfall
    InsufficientResource,
    /// Missing hero, slot or spell
    NotFound,
}

/// Something a player can run short of
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum Resource {
    Currency(Currency),
    Item(String),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Currency(currency) => write!(f, "{}", currency),
            Resource::Item(item) => write!(f, "{}", item),
        }
    }
}

/// Required vs available amount of one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub resource: Resource,
    pub required: u64,
    pub available: u64,
}

impl Shortfall {
    pub fn new(resource: Resource, required: u64, available: u64) -> Self {
        Shortfall {
            resource,
            required,
            available,
        }
    }

    pub fn currency(currency: Currency, required: u64, available: u64) -> Self {
        Self::new(Resource::Currency(currency), required, available)
    }

    pub fn item(item: impl Into<String>, required: u64, available: u64) -> Self {
        Self::new(Resource::Item(item.into()), required, available)
    }

    /// How much is missing
    pub fn amount(&self) -> u64 {
        self.required.saturating_sub(self.available)
    }
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "need {} {}, have {} (short {})",
            self.required,
            self.resource,
            self.available,
            self.amount()
        )
    }
}

/// Failure of a core operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RulesError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not allowed: {0}")]
    InvalidState(String),
    #[error("{reason}: {}", format_shortfalls(.shortfalls))]
    InsufficientResources {
        reason: String,
        shortfalls: Vec<Shortfall>,
    },
    #[error("not found: {0}")]
    NotFound(String),
}

fn format_shortfalls(shortfalls: &[Shortfall]) -> String {
    shortfalls
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl RulesError {
    pub fn validation(reason: impl Into<String>) -> Self {
        RulesError::Validation(reason.into())
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        RulesError::InvalidState(reason.into())
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        RulesError::NotFound(reason.into())
    }

    pub fn insufficient(reason: impl Into<String>, shortfalls: Vec<Shortfall>) -> Self {
        RulesError::InsufficientResources {
            reason: reason.into(),
            shortfalls,
        }
    }

    /// Shorthand for a single currency shortfall
    pub fn insufficient_currency(currency: Currency, required: u64, available: u64) -> Self {
        Self::insufficient(
            format!("insufficient {}", currency),
            vec![Shortfall::currency(currency, required, available)],
        )
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RulesError::Validation(_) => ErrorKind::Validation,
            RulesError::InvalidState(_) => ErrorKind::InvalidState,
            RulesError::InsufficientResources { .. } => ErrorKind::InsufficientResource,
            RulesError::NotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Shortfalls reported by an `InsufficientResources` error (empty otherwise)
    pub fn shortfalls(&self) -> &[Shortfall] {
        match self {
            RulesError::InsufficientResources { shortfalls, .. } => shortfalls,
            _ => &[],
        }
    }

    /// Shortfall for one resource, if reported
    pub fn shortfall_of(&self, resource: &Resource) -> Option<u64> {
        self.shortfalls()
            .iter()
            .find(|s| &s.resource == resource)
            .map(Shortfall::amount)
    }
}

pub type RulesResult<T> = Result<T, RulesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortfall_amount() {
        let shortfall = Shortfall::currency(Currency::Souls, 10, 5);
        assert_eq!(shortfall.amount(), 5);

        let covered = Shortfall::currency(Currency::Souls, 10, 50);
        assert_eq!(covered.amount(), 0);
    }

    #[test]
    fn test_insufficient_message_lists_every_shortfall() {
        let err = RulesError::insufficient(
            "cannot unlock slot",
            vec![
                Shortfall::item("spell_unlocker", 1, 0),
                Shortfall::currency(Currency::Gems, 100, 50),
            ],
        );

        let message = err.to_string();
        assert!(message.contains("spell_unlocker"));
        assert!(message.contains("short 50"));
        assert_eq!(err.kind(), ErrorKind::InsufficientResource);
        assert_eq!(err.shortfall_of(&Resource::Currency(Currency::Gems)), Some(50));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(RulesError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(RulesError::invalid_state("x").kind(), ErrorKind::InvalidState);
        assert_eq!(RulesError::not_found("x").kind(), ErrorKind::NotFound);
        assert!(RulesError::not_found("x").shortfalls().is_empty());
    }
}
