//! Transaction journal for auditing ledger mutations

use crate::error::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Kind of ledger mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Award,
    Spend,
    Convert,
    Purchase,
    ItemGranted,
    ItemConsumed,
}

/// One ledger mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub kind: TransactionKind,
    pub resource: Resource,
    /// Amount (positive = credit, negative = debit)
    pub amount: i64,
    /// Source of an award or purpose of a spend
    pub reason: String,
    pub balance_after: u64,
    pub timestamp: DateTime<Utc>,
}

/// Bounded log of the most recent transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    records: VecDeque<TransactionRecord>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, dropping the oldest beyond `limit`
    pub fn record(&mut self, record: TransactionRecord, limit: usize) {
        self.records.push_back(record);
        while self.records.len() > limit {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&TransactionRecord> {
        self.records.back()
    }
}
