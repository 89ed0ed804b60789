//! Player currencies, inventory and the transaction journal

mod journal;
mod ledger;

pub use journal::{Journal, TransactionKind, TransactionRecord};
pub use ledger::{Conversion, EconomyLedger, LedgerSummary, PackagePurchase, Purchase, Receipt};
