//! EconomyLedger - currency balances and inventory for one player

use super::journal::{Journal, TransactionKind, TransactionRecord};
use crate::config::{EconomyConstants, SoulPackage};
use crate::error::{Resource, RulesError, RulesResult, Shortfall};
use crate::types::Currency;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Outcome of a single-currency award or spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub currency: Currency,
    pub amount: u64,
    pub balance_before: u64,
    pub balance_after: u64,
}

/// Outcome of a gold to souls exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub gold_spent: u64,
    pub souls_gained: u64,
    /// Requested gold that was not an exact multiple of the rate and stays put
    pub remainder: u64,
}

/// Outcome of an item purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub item: String,
    pub cost: Receipt,
    pub item_count: u64,
}

/// Outcome of a soul package purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePurchase {
    pub package_id: String,
    pub gold_spent: u64,
    pub souls_gained: u64,
}

/// Snapshot of every balance and the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub balances: BTreeMap<Currency, u64>,
    pub inventory: BTreeMap<String, u64>,
    pub transactions: usize,
}

/// Currency balances and inventory counts
///
/// Every mutation is all-or-nothing and appends to the journal. Balances are
/// unsigned, so no sequence of operations can drive one negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyLedger {
    balances: BTreeMap<Currency, u64>,
    inventory: BTreeMap<String, u64>,
    #[serde(default)]
    journal: Journal,
    /// Exchange rates and prices; reattached after loading
    #[serde(skip)]
    rules: EconomyConstants,
}

impl EconomyLedger {
    /// Ledger holding the configured starting balances
    pub fn new(rules: &EconomyConstants) -> Self {
        let start = &rules.starting;
        let mut ledger = Self::empty(rules);
        ledger.balances.insert(Currency::Gold, start.gold);
        ledger.balances.insert(Currency::Souls, start.souls);
        ledger.balances.insert(Currency::Gems, start.gems);
        ledger.balances.insert(Currency::Shards, start.shards);
        ledger.balances.insert(Currency::Wildcards, start.wildcards);
        ledger
    }

    /// Ledger with every balance at zero
    pub fn empty(rules: &EconomyConstants) -> Self {
        EconomyLedger {
            balances: Currency::all().iter().map(|c| (*c, 0)).collect(),
            inventory: BTreeMap::new(),
            journal: Journal::new(),
            rules: rules.clone(),
        }
    }

    /// Replace the economy constants, e.g. after loading a save
    pub fn attach_rules(&mut self, rules: &EconomyConstants) {
        self.rules = rules.clone();
    }

    pub fn rules(&self) -> &EconomyConstants {
        &self.rules
    }

    // === Queries ===

    pub fn balance(&self, currency: Currency) -> u64 {
        self.balances.get(&currency).copied().unwrap_or(0)
    }

    pub fn can_afford(&self, currency: Currency, amount: u64) -> bool {
        self.balance(currency) >= amount
    }

    pub fn item_count(&self, item: &str) -> u64 {
        self.inventory.get(item).copied().unwrap_or(0)
    }

    /// Check a spend without performing it
    pub fn validate_transaction(&self, currency: Currency, amount: u64) -> RulesResult<()> {
        if amount == 0 {
            return Err(RulesError::validation(format!(
                "{} amount must be positive",
                currency
            )));
        }
        let available = self.balance(currency);
        if available < amount {
            return Err(RulesError::insufficient_currency(currency, amount, available));
        }
        Ok(())
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn soul_package(&self, id: &str) -> Option<&SoulPackage> {
        self.rules.soul_packages.iter().find(|p| p.id == id)
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            balances: self.balances.clone(),
            inventory: self
                .inventory
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(item, count)| (item.clone(), *count))
                .collect(),
            transactions: self.journal.len(),
        }
    }

    // === Currency ===

    /// Add currency; the amount must be positive
    pub fn award(&mut self, currency: Currency, amount: u64, source: &str) -> RulesResult<Receipt> {
        if amount == 0 {
            return Err(RulesError::validation(format!(
                "{} award must be positive",
                currency
            )));
        }

        let before = self.balance(currency);
        let after = before
            .checked_add(amount)
            .ok_or_else(|| RulesError::validation(format!("{} balance overflow", currency)))?;
        self.balances.insert(currency, after);
        self.log(TransactionKind::Award, Resource::Currency(currency), amount as i64, source, after);

        debug!(
            "Awarded {} {}: {} -> {} ({})",
            amount, currency, before, after, source
        );
        Ok(Receipt {
            currency,
            amount,
            balance_before: before,
            balance_after: after,
        })
    }

    /// Remove currency, failing without change when the balance is short
    pub fn spend(&mut self, currency: Currency, amount: u64, purpose: &str) -> RulesResult<Receipt> {
        if let Err(err) = self.validate_transaction(currency, amount) {
            debug!("Spend of {} {} rejected ({}): {}", amount, currency, purpose, err);
            return Err(err);
        }

        let before = self.balance(currency);
        let after = before - amount;
        self.balances.insert(currency, after);
        self.log(TransactionKind::Spend, Resource::Currency(currency), -(amount as i64), purpose, after);

        debug!(
            "Spent {} {}: {} -> {} ({})",
            amount, currency, before, after, purpose
        );
        Ok(Receipt {
            currency,
            amount,
            balance_before: before,
            balance_after: after,
        })
    }

    /// Exchange gold for souls at the configured rate
    ///
    /// Only the largest exact multiple of the rate is spent; the remainder
    /// stays in the gold balance. Fails when the request buys no soul or the
    /// gold balance cannot cover the requested amount.
    pub fn convert(&mut self, gold_amount: u64) -> RulesResult<Conversion> {
        let rate = self.rules.gold_per_soul.max(1);
        let souls = gold_amount / rate;
        if souls == 0 {
            return Err(RulesError::validation(format!(
                "converting {} gold yields no souls (minimum {})",
                gold_amount, rate
            )));
        }

        let available = self.balance(Currency::Gold);
        if available < gold_amount {
            return Err(RulesError::insufficient_currency(
                Currency::Gold,
                gold_amount,
                available,
            ));
        }

        let souls_after = self.checked_souls_after(souls)?;
        let gold_spent = souls * rate;
        let gold_after = available - gold_spent;
        self.balances.insert(Currency::Gold, gold_after);
        self.balances.insert(Currency::Souls, souls_after);

        self.log(
            TransactionKind::Convert,
            Resource::Currency(Currency::Gold),
            -(gold_spent as i64),
            "soul conversion",
            gold_after,
        );
        self.log(
            TransactionKind::Convert,
            Resource::Currency(Currency::Souls),
            souls as i64,
            "soul conversion",
            souls_after,
        );

        debug!("Converted {} gold into {} souls", gold_spent, souls);
        Ok(Conversion {
            gold_spent,
            souls_gained: souls,
            remainder: gold_amount - gold_spent,
        })
    }

    /// Buy a soul package for its gold price
    pub fn purchase_soul_package(&mut self, package_id: &str) -> RulesResult<PackagePurchase> {
        let package = self
            .soul_package(package_id)
            .cloned()
            .ok_or_else(|| RulesError::not_found(format!("soul package '{}'", package_id)))?;

        self.validate_transaction(Currency::Gold, package.gold)?;
        self.checked_souls_after(package.souls)?;
        let purpose = format!("soul package {}", package.id);
        self.spend(Currency::Gold, package.gold, &purpose)?;
        self.award(Currency::Souls, package.souls, &purpose)?;

        Ok(PackagePurchase {
            package_id: package.id,
            gold_spent: package.gold,
            souls_gained: package.souls,
        })
    }

    /// Gold needed to convert into `souls` souls
    pub fn gold_for_souls(&self, souls: u64) -> u64 {
        souls.saturating_mul(self.rules.gold_per_soul.max(1))
    }

    /// Souls a conversion of `gold` would yield
    pub fn souls_from_gold(&self, gold: u64) -> u64 {
        gold / self.rules.gold_per_soul.max(1)
    }

    fn checked_souls_after(&self, souls: u64) -> RulesResult<u64> {
        self.balance(Currency::Souls)
            .checked_add(souls)
            .ok_or_else(|| RulesError::validation(format!("{} balance overflow", Currency::Souls)))
    }

    // === Inventory ===

    /// Spend currency and add one item to the inventory
    pub fn purchase_item(
        &mut self,
        item: &str,
        cost_currency: Currency,
        cost_amount: u64,
    ) -> RulesResult<Purchase> {
        let purpose = format!("purchase {}", item);
        let cost = self.spend(cost_currency, cost_amount, &purpose)?;
        let count = self.add_item(item, 1, TransactionKind::Purchase, &purpose);

        Ok(Purchase {
            item: item.to_string(),
            cost,
            item_count: count,
        })
    }

    /// Buy one spell unlocker for gems
    pub fn purchase_spell_unlocker(&mut self) -> RulesResult<Purchase> {
        let item = self.rules.spell_unlocker_item.clone();
        let cost = self.rules.spell_unlocker_gem_cost;
        self.purchase_item(&item, Currency::Gems, cost)
    }

    /// Add items without payment (rewards)
    pub fn grant_item(&mut self, item: &str, quantity: u64, source: &str) -> RulesResult<u64> {
        if quantity == 0 {
            return Err(RulesError::validation(format!(
                "{} grant must be positive",
                item
            )));
        }
        Ok(self.add_item(item, quantity, TransactionKind::ItemGranted, source))
    }

    /// Remove items; returns the count left
    pub fn consume_item(&mut self, item: &str, quantity: u64) -> RulesResult<u64> {
        if quantity == 0 {
            return Err(RulesError::validation(format!(
                "{} quantity must be positive",
                item
            )));
        }

        let available = self.item_count(item);
        if available < quantity {
            return Err(RulesError::insufficient(
                format!("not enough {}", item),
                vec![Shortfall::item(item, quantity, available)],
            ));
        }

        let left = available - quantity;
        self.inventory.insert(item.to_string(), left);
        self.log(
            TransactionKind::ItemConsumed,
            Resource::Item(item.to_string()),
            -(quantity as i64),
            "consumed",
            left,
        );

        debug!("Consumed {} {}: {} -> {}", quantity, item, available, left);
        Ok(left)
    }

    fn add_item(&mut self, item: &str, quantity: u64, kind: TransactionKind, reason: &str) -> u64 {
        let count = self.item_count(item).saturating_add(quantity);
        self.inventory.insert(item.to_string(), count);
        self.log(kind, Resource::Item(item.to_string()), quantity as i64, reason, count);

        debug!("Added {} {} ({}), now {}", quantity, item, reason, count);
        count
    }

    fn log(&mut self, kind: TransactionKind, resource: Resource, amount: i64, reason: &str, balance_after: u64) {
        let record = TransactionRecord {
            kind,
            resource,
            amount,
            reason: reason.to_string(),
            balance_after,
            timestamp: Utc::now(),
        };
        self.journal.record(record, self.rules.journal_limit.max(1));
    }
}
