// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

pub type WalletId = i64;
pub type CategoryId = i64;
pub type EntryId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    Expense,
    Transfer,
    Topup,
}

impl EntryType {
    pub const ALL: [EntryType; 4] = [
        EntryType::Income,
        EntryType::Expense,
        EntryType::Transfer,
        EntryType::Topup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Income => "income",
            EntryType::Expense => "expense",
            EntryType::Transfer => "transfer",
            EntryType::Topup => "topup",
        }
    }

    /// Income and expense entries are the only ones that belong to a category.
    pub fn category_type(self) -> Option<CategoryType> {
        match self {
            EntryType::Income => Some(CategoryType::Income),
            EntryType::Expense => Some(CategoryType::Expense),
            EntryType::Transfer | EntryType::Topup => None,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(EntryType::Income),
            "expense" => Ok(EntryType::Expense),
            "transfer" => Ok(EntryType::Transfer),
            "topup" => Ok(EntryType::Topup),
            other => Err(LedgerError::InvalidEntryType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
        }
    }

    pub fn entry_type(self) -> EntryType {
        match self {
            CategoryType::Income => EntryType::Income,
            CategoryType::Expense => EntryType::Expense,
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(CategoryType::Income),
            "expense" => Ok(CategoryType::Expense),
            other => Err(LedgerError::InvalidCategoryType(other.to_string())),
        }
    }
}

/// Soft-delete state stored on every wallet, category and entry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    Active,
    Deleted,
}

impl RecordState {
    pub fn as_flag(self) -> i64 {
        match self {
            RecordState::Active => 0,
            RecordState::Deleted => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub r#type: CategoryType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub r#type: EntryType,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub wallet_id: WalletId,
    pub date: NaiveDateTime,
    pub to_wallet_id: Option<WalletId>,
    pub received_amount: Option<Decimal>,
    pub received_currency: Option<String>,
}

impl Entry {
    /// Amount credited to the destination wallet of a transfer.
    pub fn received_amount(&self) -> Decimal {
        self.received_amount.unwrap_or(self.amount)
    }

    pub fn received_currency(&self) -> &str {
        self.received_currency.as_deref().unwrap_or(&self.currency)
    }
}

/// Field values for creating or replacing an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub r#type: EntryType,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub wallet_id: WalletId,
    pub date: NaiveDateTime,
    pub to_wallet_id: Option<WalletId>,
    pub received_amount: Option<Decimal>,
    pub received_currency: Option<String>,
}

impl NewEntry {
    pub fn income(
        wallet_id: WalletId,
        category_id: CategoryId,
        amount: Decimal,
        currency: &str,
        date: NaiveDateTime,
    ) -> Self {
        Self::categorized(EntryType::Income, wallet_id, category_id, amount, currency, date)
    }

    pub fn expense(
        wallet_id: WalletId,
        category_id: CategoryId,
        amount: Decimal,
        currency: &str,
        date: NaiveDateTime,
    ) -> Self {
        Self::categorized(EntryType::Expense, wallet_id, category_id, amount, currency, date)
    }

    pub fn topup(
        wallet_id: WalletId,
        amount: Decimal,
        currency: &str,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            r#type: EntryType::Topup,
            amount,
            currency: currency.to_string(),
            description: None,
            category_id: None,
            wallet_id,
            date,
            to_wallet_id: None,
            received_amount: None,
            received_currency: None,
        }
    }

    pub fn transfer(
        from: WalletId,
        to: WalletId,
        amount: Decimal,
        currency: &str,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            r#type: EntryType::Transfer,
            amount,
            currency: currency.to_string(),
            description: None,
            category_id: None,
            wallet_id: from,
            date,
            to_wallet_id: Some(to),
            received_amount: None,
            received_currency: None,
        }
    }

    fn categorized(
        r#type: EntryType,
        wallet_id: WalletId,
        category_id: CategoryId,
        amount: Decimal,
        currency: &str,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            r#type,
            amount,
            currency: currency.to_string(),
            description: None,
            category_id: Some(category_id),
            wallet_id,
            date,
            to_wallet_id: None,
            received_amount: None,
            received_currency: None,
        }
    }

    pub fn with_received(mut self, amount: Decimal, currency: &str) -> Self {
        self.received_amount = Some(amount);
        self.received_currency = Some(currency.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

impl From<Entry> for NewEntry {
    fn from(e: Entry) -> Self {
        Self {
            r#type: e.r#type,
            amount: e.amount,
            currency: e.currency,
            description: e.description,
            category_id: e.category_id,
            wallet_id: e.wallet_id,
            date: e.date,
            to_wallet_id: e.to_wallet_id,
            received_amount: e.received_amount,
            received_currency: e.received_currency,
        }
    }
}

/// A reference from an entry to a wallet or category absent from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DanglingReference {
    Wallet { entry: EntryId, wallet: WalletId },
    DestinationWallet { entry: EntryId, wallet: WalletId },
    Category { entry: EntryId, category: CategoryId },
}

/// The active projection of the ledger read at one point in time.
///
/// Every engine function takes a snapshot by reference; none of them see
/// deleted rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub wallets: Vec<Wallet>,
    pub categories: Vec<Category>,
    pub entries: Vec<Entry>,
}

impl Snapshot {
    pub fn wallet(&self, id: WalletId) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.id == id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_name(&self, id: Option<CategoryId>) -> Option<&str> {
        id.map(|id| self.category(id).map_or("Unknown", |c| c.name.as_str()))
    }

    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut out = Vec::new();
        for e in &self.entries {
            if self.wallet(e.wallet_id).is_none() {
                out.push(DanglingReference::Wallet {
                    entry: e.id,
                    wallet: e.wallet_id,
                });
            }
            if let Some(to) = e.to_wallet_id {
                if self.wallet(to).is_none() {
                    out.push(DanglingReference::DestinationWallet {
                        entry: e.id,
                        wallet: to,
                    });
                }
            }
            if let Some(cat) = e.category_id {
                if self.category(cat).is_none() {
                    out.push(DanglingReference::Category {
                        entry: e.id,
                        category: cat,
                    });
                }
            }
        }
        out
    }
}
