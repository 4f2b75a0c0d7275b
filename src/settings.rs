// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! User preferences and the rate snapshot built from them.
//!
//! Preferences are stored as free-form key/value rows. They are normalized
//! into [`Settings`] once when loaded; nothing downstream reads the raw rows.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::fx::{RateSnapshot, RateTable, BASE_CURRENCY};
use crate::utils::is_currency_code;

pub const SELECTED_CURRENCY_KEY: &str = "selectedCurrency";
pub const ENABLED_CURRENCIES_KEY: &str = "enabledCurrencies";
pub const CUSTOM_CURRENCIES_KEY: &str = "customCurrencies";

/// A user-defined currency with a manual rate against the base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCurrency {
    pub currency_name: String,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub selected_currency: String,
    pub enabled_currencies: Vec<String>,
    pub custom_currencies: Vec<CustomCurrency>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_currency: BASE_CURRENCY.to_string(),
            enabled_currencies: vec![BASE_CURRENCY.to_string()],
            custom_currencies: Vec::new(),
        }
    }
}

/// Parses a currency list stored either as a JSON array or as a comma list.
pub fn normalize_currency_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let items: Vec<String> = if raw.starts_with('[') {
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(%err, value = raw, "unreadable currency list");
                Vec::new()
            }
        }
    } else {
        raw.split(',').map(str::to_string).collect()
    };
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let code = item.trim().to_uppercase();
        if is_currency_code(&code) && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

impl Settings {
    /// Builds settings from raw key/value rows. Unknown keys are ignored and
    /// malformed values fall back to defaults.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut s = Settings::default();
        for (key, value) in pairs {
            match key {
                SELECTED_CURRENCY_KEY => {
                    let code = value.trim().to_uppercase();
                    if is_currency_code(&code) {
                        s.selected_currency = code;
                    }
                }
                ENABLED_CURRENCIES_KEY => {
                    let list = normalize_currency_list(value);
                    if !list.is_empty() {
                        s.enabled_currencies = list;
                    }
                }
                CUSTOM_CURRENCIES_KEY => {
                    match serde_json::from_str::<Vec<CustomCurrency>>(value) {
                        Ok(list) => {
                            s.custom_currencies = list
                                .into_iter()
                                .map(|c| CustomCurrency {
                                    currency_name: c.currency_name.trim().to_uppercase(),
                                    ..c
                                })
                                .filter(|c| {
                                    is_currency_code(&c.currency_name) && c.rate > Decimal::ZERO
                                })
                                .collect();
                        }
                        Err(err) => tracing::warn!(%err, "unreadable custom currencies"),
                    }
                }
                _ => {}
            }
        }
        s
    }

    pub fn to_pairs(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            (SELECTED_CURRENCY_KEY, self.selected_currency.clone()),
            (
                ENABLED_CURRENCIES_KEY,
                serde_json::to_string(&self.enabled_currencies)?,
            ),
            (
                CUSTOM_CURRENCIES_KEY,
                serde_json::to_string(&self.custom_currencies)?,
            ),
        ])
    }

    pub fn load(conn: &Connection) -> Result<Self> {
        let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
        let rows = stmt
            .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Self::from_pairs(
            rows.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        for (key, value) in self.to_pairs()? {
            conn.execute(
                "INSERT INTO settings(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value",
                params![key, value],
            )?;
        }
        Ok(())
    }

    /// Adds or replaces a custom currency, keeping insertion order.
    pub fn upsert_custom(&mut self, code: &str, rate: Decimal) -> Result<()> {
        let code = code.trim().to_uppercase();
        if !is_currency_code(&code) {
            anyhow::bail!("Invalid currency '{}', expected 3-4 letters", code);
        }
        if rate <= Decimal::ZERO {
            anyhow::bail!("Rate for {} must be positive", code);
        }
        match self
            .custom_currencies
            .iter_mut()
            .find(|c| c.currency_name == code)
        {
            Some(c) => c.rate = rate,
            None => self.custom_currencies.push(CustomCurrency {
                currency_name: code,
                rate,
            }),
        }
        Ok(())
    }

    pub fn remove_custom(&mut self, code: &str) -> bool {
        let code = code.trim().to_uppercase();
        let before = self.custom_currencies.len();
        self.custom_currencies.retain(|c| c.currency_name != code);
        self.enabled_currencies.retain(|c| *c != code);
        if self.selected_currency == code {
            self.selected_currency = BASE_CURRENCY.to_string();
        }
        before != self.custom_currencies.len()
    }

    /// Layers custom currencies over `stored`. Custom rates win.
    pub fn rate_table(&self, stored: &RateTable) -> Result<RateTable> {
        let mut table = stored.clone();
        for c in &self.custom_currencies {
            table.insert(&c.currency_name, c.rate)?;
        }
        Ok(table)
    }
}

/// Built-in rates overlaid with the newest stored rate of each currency.
pub fn stored_rates(conn: &Connection) -> Result<(RateTable, Option<NaiveDate>)> {
    let mut table = RateTable::builtin();
    let mut as_of: Option<NaiveDate> = None;
    let mut stmt =
        conn.prepare("SELECT date, quote, rate FROM fx_rates WHERE base=?1 ORDER BY date, id")?;
    let rows = stmt.query_map(params![BASE_CURRENCY], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    for row in rows {
        let (d, quote, rate_s) = row?;
        let date = NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .with_context(|| format!("Invalid rate date '{}' for {}", d, quote))?;
        let rate = rate_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid rate '{}' for {}/{}", rate_s, BASE_CURRENCY, quote))?;
        table.insert(&quote, rate)?;
        as_of = Some(as_of.map_or(date, |a| a.max(date)));
    }
    Ok((table, as_of))
}

pub fn set_rate(conn: &Connection, date: NaiveDate, code: &str, rate: Decimal) -> Result<()> {
    if rate <= Decimal::ZERO {
        anyhow::bail!("Rate for {} must be positive", code);
    }
    conn.execute(
        "INSERT INTO fx_rates(date, base, quote, rate) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(date, base, quote) DO UPDATE SET rate=excluded.rate",
        params![date.to_string(), BASE_CURRENCY, code, rate.to_string()],
    )?;
    Ok(())
}

/// The single rate snapshot used for one report.
pub fn rate_snapshot(conn: &Connection, settings: &Settings) -> Result<RateSnapshot> {
    let (stored, as_of) = stored_rates(conn)?;
    Ok(RateSnapshot {
        rates: settings.rate_table(&stored)?,
        base_currency: BASE_CURRENCY.to_string(),
        as_of,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_list_forms() {
        assert_eq!(normalize_currency_list(r#"["usd","BDT"]"#), vec!["USD", "BDT"]);
        assert_eq!(normalize_currency_list("USD, bdt ,USD"), vec!["USD", "BDT"]);
        assert!(normalize_currency_list("[broken").is_empty());
    }
}
