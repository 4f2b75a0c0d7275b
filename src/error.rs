// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Errors raised by the reporting engine and by the ledger store.
//!
//! [`EngineError`] aborts a single computation (a balance, a series, a
//! breakdown) and never touches stored data. [`LedgerError`] is returned when a
//! write to the store would break an entity invariant.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{CategoryId, CategoryType, EntryId, EntryType, WalletId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown currency '{0}'")]
    UnknownCurrency(String),
    #[error("Invalid rate {rate} for currency '{code}', rates must be positive")]
    InvalidRate { code: String, rate: Decimal },
    #[error("Amount overflow while converting {amount} {from} -> {to}")]
    Overflow {
        amount: Decimal,
        from: String,
        to: String,
    },
    #[error("Amount overflow while totalling in {currency}")]
    TotalOverflow { currency: String },
    #[error("Category {category} ({category_type}) does not match the '{filter}' filter")]
    IncompatibleCategory {
        category: CategoryId,
        category_type: CategoryType,
        filter: String,
    },
    #[error("Invalid period '{0}', expected YYYY-MM or 'all'")]
    InvalidPeriod(String),
    #[error("Invalid time grouping '{0}', expected daily|monthly|yearly")]
    InvalidGrouping(String),
    #[error("Invalid chart metric '{0}', expected balance|income|expense")]
    InvalidMetric(String),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Wallet {0} not found")]
    WalletNotFound(WalletId),
    #[error("Category {0} not found")]
    CategoryNotFound(CategoryId),
    #[error("Entry {0} not found")]
    EntryNotFound(EntryId),
    #[error("Invalid name '{0}': must be 1-100 characters")]
    InvalidName(String),
    #[error("Invalid description: at most 1000 characters")]
    InvalidDescription,
    #[error("Invalid amount {0}: must be positive")]
    InvalidAmount(Decimal),
    #[error("Invalid currency code '{0}', expected 3-4 uppercase letters")]
    InvalidCurrency(String),
    #[error("Invalid entry type '{0}'")]
    InvalidEntryType(String),
    #[error("Invalid category type '{0}', expected income|expense")]
    InvalidCategoryType(String),
    #[error("{0} entries require a category")]
    MissingCategory(EntryType),
    #[error("{0} entries cannot carry a category")]
    UnexpectedCategory(EntryType),
    #[error("Category {category} is a {found} category, entry is {expected}")]
    CategoryTypeMismatch {
        category: CategoryId,
        expected: EntryType,
        found: CategoryType,
    },
    #[error("Transfers require a destination wallet")]
    MissingDestination,
    #[error("Transfer source and destination are both wallet {0}")]
    SameWalletTransfer(WalletId),
    #[error("{0} entries cannot carry transfer fields")]
    UnexpectedTransferFields(EntryType),
    #[error("Corrupt stored value '{value}' in {column}")]
    CorruptValue { column: &'static str, value: String },
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}
