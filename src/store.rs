// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed ledger store.
//!
//! Writes validate entity invariants before touching the database. Reads
//! return only active rows, in insertion order.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::models::{
    Category, CategoryId, CategoryType, Entry, EntryId, EntryType, NewEntry, RecordState,
    Snapshot, Wallet, WalletId,
};
use crate::utils::is_currency_code;

pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const MAX_NAME_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 1000;

const ENTRY_COLUMNS: &str = "id, type, amount, currency, description, category_id, wallet_id, \
     date, to_wallet_id, received_amount, received_currency";

type Result<T> = std::result::Result<T, LedgerError>;

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(LedgerError::InvalidName(name.to_string()));
    }
    Ok(name.to_string())
}

fn stored_decimal(column: &'static str, value: String) -> Result<Decimal> {
    value
        .parse::<Decimal>()
        .map_err(|_| LedgerError::CorruptValue { column, value })
}

// ----- wallets -----

pub fn list_wallets(conn: &Connection) -> Result<Vec<Wallet>> {
    let mut stmt = conn.prepare("SELECT id, name FROM wallets WHERE deleted=0 ORDER BY id")?;
    let rows = stmt.query_map([], |r| {
        Ok(Wallet {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_wallet(conn: &Connection, id: WalletId) -> Result<Wallet> {
    conn.query_row(
        "SELECT id, name FROM wallets WHERE id=?1 AND deleted=0",
        params![id],
        |r| {
            Ok(Wallet {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or(LedgerError::WalletNotFound(id))
}

pub fn create_wallet(conn: &Connection, name: &str) -> Result<WalletId> {
    let name = clean_name(name)?;
    conn.execute("INSERT INTO wallets(name) VALUES (?1)", params![name])?;
    let id = conn.last_insert_rowid();
    tracing::info!(wallet = id, %name, "created wallet");
    Ok(id)
}

pub fn rename_wallet(conn: &Connection, id: WalletId, name: &str) -> Result<()> {
    let name = clean_name(name)?;
    let n = conn.execute(
        "UPDATE wallets SET name=?1 WHERE id=?2 AND deleted=0",
        params![name, id],
    )?;
    if n == 0 {
        return Err(LedgerError::WalletNotFound(id));
    }
    Ok(())
}

/// Soft-deletes a wallet together with every active entry it is the source
/// of. Transfers into it from other wallets are kept. Returns the number of
/// entries removed.
pub fn soft_delete_wallet(conn: &Connection, id: WalletId) -> Result<usize> {
    get_wallet(conn, id)?;
    let deleted = RecordState::Deleted.as_flag();
    let tx = conn.unchecked_transaction()?;
    let removed = tx.execute(
        "UPDATE entries SET deleted=?1 WHERE wallet_id=?2 AND deleted=0",
        params![deleted, id],
    )?;
    tx.execute(
        "UPDATE wallets SET deleted=?1 WHERE id=?2",
        params![deleted, id],
    )?;
    tx.commit()?;
    tracing::info!(wallet = id, entries = removed, "deleted wallet");
    Ok(removed)
}

// ----- categories -----

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<(CategoryId, String, String)> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?))
}

fn into_category((id, name, t): (CategoryId, String, String)) -> Result<Category> {
    let r#type = t
        .parse::<CategoryType>()
        .map_err(|_| LedgerError::CorruptValue {
            column: "categories.type",
            value: t,
        })?;
    Ok(Category { id, name, r#type })
}

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, name, type FROM categories WHERE deleted=0 ORDER BY id")?;
    let rows = stmt.query_map([], category_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(into_category(row?)?);
    }
    Ok(out)
}

pub fn get_category(conn: &Connection, id: CategoryId) -> Result<Category> {
    let raw = conn
        .query_row(
            "SELECT id, name, type FROM categories WHERE id=?1 AND deleted=0",
            params![id],
            category_from_row,
        )
        .optional()?
        .ok_or(LedgerError::CategoryNotFound(id))?;
    into_category(raw)
}

pub fn create_category(conn: &Connection, name: &str, r#type: CategoryType) -> Result<CategoryId> {
    let name = clean_name(name)?;
    conn.execute(
        "INSERT INTO categories(name, type) VALUES (?1, ?2)",
        params![name, r#type.as_str()],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(category = id, %name, kind = %r#type, "created category");
    Ok(id)
}

/// Renames a category. Its type is fixed once created, since entries already
/// filed under it were validated against that type.
pub fn rename_category(conn: &Connection, id: CategoryId, name: &str) -> Result<()> {
    let name = clean_name(name)?;
    let n = conn.execute(
        "UPDATE categories SET name=?1 WHERE id=?2 AND deleted=0",
        params![name, id],
    )?;
    if n == 0 {
        return Err(LedgerError::CategoryNotFound(id));
    }
    Ok(())
}

/// Soft-deletes a category and detaches it from every entry that used it.
/// Returns the number of detached entries.
pub fn soft_delete_category(conn: &Connection, id: CategoryId) -> Result<usize> {
    get_category(conn, id)?;
    let tx = conn.unchecked_transaction()?;
    let detached = tx.execute(
        "UPDATE entries SET category_id=NULL WHERE category_id=?1",
        params![id],
    )?;
    tx.execute(
        "UPDATE categories SET deleted=?1 WHERE id=?2",
        params![RecordState::Deleted.as_flag(), id],
    )?;
    tx.commit()?;
    tracing::info!(category = id, detached, "deleted category");
    Ok(detached)
}

// ----- entries -----

struct StoredEntry {
    id: EntryId,
    r#type: String,
    amount: String,
    currency: String,
    description: Option<String>,
    category_id: Option<CategoryId>,
    wallet_id: WalletId,
    date: String,
    to_wallet_id: Option<WalletId>,
    received_amount: Option<String>,
    received_currency: Option<String>,
}

impl StoredEntry {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            r#type: r.get(1)?,
            amount: r.get(2)?,
            currency: r.get(3)?,
            description: r.get(4)?,
            category_id: r.get(5)?,
            wallet_id: r.get(6)?,
            date: r.get(7)?,
            to_wallet_id: r.get(8)?,
            received_amount: r.get(9)?,
            received_currency: r.get(10)?,
        })
    }

    fn into_entry(self) -> Result<Entry> {
        let r#type = self
            .r#type
            .parse::<EntryType>()
            .map_err(|_| LedgerError::CorruptValue {
                column: "entries.type",
                value: self.r#type.clone(),
            })?;
        let date = NaiveDateTime::parse_from_str(&self.date, DATETIME_FORMAT).map_err(|_| {
            LedgerError::CorruptValue {
                column: "entries.date",
                value: self.date.clone(),
            }
        })?;
        let received_amount = match self.received_amount {
            Some(s) => Some(stored_decimal("entries.received_amount", s)?),
            None => None,
        };
        Ok(Entry {
            id: self.id,
            r#type,
            amount: stored_decimal("entries.amount", self.amount)?,
            currency: self.currency,
            description: self.description,
            category_id: self.category_id,
            wallet_id: self.wallet_id,
            date,
            to_wallet_id: self.to_wallet_id,
            received_amount,
            received_currency: self.received_currency,
        })
    }
}

pub fn list_entries(conn: &Connection) -> Result<Vec<Entry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE deleted=0 ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], StoredEntry::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_entry()?);
    }
    Ok(out)
}

pub fn get_entry(conn: &Connection, id: EntryId) -> Result<Entry> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id=?1 AND deleted=0");
    conn.query_row(&sql, params![id], StoredEntry::from_row)
        .optional()?
        .ok_or(LedgerError::EntryNotFound(id))?
        .into_entry()
}

fn validate_entry(conn: &Connection, e: &NewEntry) -> Result<()> {
    if e.amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(e.amount));
    }
    if !is_currency_code(&e.currency) {
        return Err(LedgerError::InvalidCurrency(e.currency.clone()));
    }
    if e
        .description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_CHARS)
    {
        return Err(LedgerError::InvalidDescription);
    }
    get_wallet(conn, e.wallet_id)?;

    match (e.r#type.category_type(), e.category_id) {
        (Some(_), None) => return Err(LedgerError::MissingCategory(e.r#type)),
        (Some(expected), Some(id)) => {
            let category = get_category(conn, id)?;
            if category.r#type != expected {
                return Err(LedgerError::CategoryTypeMismatch {
                    category: id,
                    expected: e.r#type,
                    found: category.r#type,
                });
            }
        }
        (None, Some(_)) => return Err(LedgerError::UnexpectedCategory(e.r#type)),
        (None, None) => {}
    }

    if e.r#type == EntryType::Transfer {
        let to = e.to_wallet_id.ok_or(LedgerError::MissingDestination)?;
        if to == e.wallet_id {
            return Err(LedgerError::SameWalletTransfer(to));
        }
        get_wallet(conn, to)?;
        if let Some(received) = e.received_amount {
            if received <= Decimal::ZERO {
                return Err(LedgerError::InvalidAmount(received));
            }
        }
        if let Some(ccy) = &e.received_currency {
            if !is_currency_code(ccy) {
                return Err(LedgerError::InvalidCurrency(ccy.clone()));
            }
        }
    } else if e.to_wallet_id.is_some()
        || e.received_amount.is_some()
        || e.received_currency.is_some()
    {
        return Err(LedgerError::UnexpectedTransferFields(e.r#type));
    }
    Ok(())
}

pub fn create_entry(conn: &Connection, e: &NewEntry) -> Result<EntryId> {
    validate_entry(conn, e)?;
    conn.execute(
        "INSERT INTO entries(type, amount, currency, description, category_id, wallet_id, date,
                             to_wallet_id, received_amount, received_currency)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            e.r#type.as_str(),
            e.amount.to_string(),
            e.currency,
            e.description,
            e.category_id,
            e.wallet_id,
            e.date.format(DATETIME_FORMAT).to_string(),
            e.to_wallet_id,
            e.received_amount.map(|d| d.to_string()),
            e.received_currency,
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(
        entry = id,
        kind = %e.r#type,
        amount = %e.amount,
        currency = %e.currency,
        "recorded entry"
    );
    Ok(id)
}

/// Replaces every field of an active entry.
pub fn update_entry(conn: &Connection, id: EntryId, e: &NewEntry) -> Result<()> {
    get_entry(conn, id)?;
    validate_entry(conn, e)?;
    conn.execute(
        "UPDATE entries SET type=?1, amount=?2, currency=?3, description=?4, category_id=?5,
                wallet_id=?6, date=?7, to_wallet_id=?8, received_amount=?9, received_currency=?10
         WHERE id=?11",
        params![
            e.r#type.as_str(),
            e.amount.to_string(),
            e.currency,
            e.description,
            e.category_id,
            e.wallet_id,
            e.date.format(DATETIME_FORMAT).to_string(),
            e.to_wallet_id,
            e.received_amount.map(|d| d.to_string()),
            e.received_currency,
            id,
        ],
    )?;
    tracing::info!(entry = id, "updated entry");
    Ok(())
}

pub fn soft_delete_entry(conn: &Connection, id: EntryId) -> Result<()> {
    let n = conn.execute(
        "UPDATE entries SET deleted=?1 WHERE id=?2 AND deleted=0",
        params![RecordState::Deleted.as_flag(), id],
    )?;
    if n == 0 {
        return Err(LedgerError::EntryNotFound(id));
    }
    tracing::info!(entry = id, "deleted entry");
    Ok(())
}

/// The active wallets, categories and entries, read together.
pub fn snapshot(conn: &Connection) -> Result<Snapshot> {
    let tx = conn.unchecked_transaction()?;
    let snap = Snapshot {
        wallets: list_wallets(&tx)?,
        categories: list_categories(&tx)?,
        entries: list_entries(&tx)?,
    };
    tx.finish()?;
    let dangling = snap.dangling_references().len();
    if dangling > 0 {
        tracing::warn!(dangling, "snapshot has entries with unresolved references");
    }
    Ok(snap)
}
