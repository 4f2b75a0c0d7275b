// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EngineError;

pub const BASE_CURRENCY: &str = "USD";

/// Rates shipped with the app, relative to USD.
pub const DEFAULT_RATES: [(&str, i64); 2] = [("USD", 1), ("BDT", 110)];

/// Value of one unit of the base currency in each known currency.
///
/// All rates are strictly positive; the base currency is always present at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    rates: BTreeMap<String, Decimal>,
}

impl Default for RateTable {
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(BASE_CURRENCY.to_string(), Decimal::ONE);
        Self { rates }
    }
}

impl RateTable {
    pub fn builtin() -> Self {
        let mut t = Self::default();
        for (code, rate) in DEFAULT_RATES {
            t.rates.insert(code.to_string(), Decimal::from(rate));
        }
        t
    }

    pub fn from_rates<I, S>(rates: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        let mut t = Self::default();
        for (code, rate) in rates {
            t.insert(code.as_ref(), rate)?;
        }
        Ok(t)
    }

    /// Adds or replaces a rate. The base currency cannot be re-anchored.
    pub fn insert(&mut self, code: &str, rate: Decimal) -> Result<(), EngineError> {
        let code = code.trim().to_uppercase();
        if rate <= Decimal::ZERO {
            return Err(EngineError::InvalidRate { code, rate });
        }
        if code == BASE_CURRENCY {
            return Ok(());
        }
        self.rates.insert(code, rate);
        Ok(())
    }

    pub fn rate(&self, code: &str) -> Result<Decimal, EngineError> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| EngineError::UnknownCurrency(code.to_string()))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A rate table as handed over by the rate provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub rates: RateTable,
    pub base_currency: String,
    /// Date of the newest stored rate; `None` when only built-in rates apply.
    pub as_of: Option<NaiveDate>,
}

/// Convert `amount` between two currencies through the base unit.
///
/// Same-currency conversions return `amount` untouched, so no rounding drift is
/// introduced and the code need not be in the table. No rounding is applied.
pub fn convert(
    amount: Decimal,
    from: &str,
    to: &str,
    rates: &RateTable,
) -> Result<Decimal, EngineError> {
    if from == to {
        return Ok(amount);
    }
    let from_rate = rates.rate(from)?;
    let to_rate = rates.rate(to)?;
    amount
        .checked_div(from_rate)
        .and_then(|base| base.checked_mul(to_rate))
        .ok_or_else(|| EngineError::Overflow {
            amount,
            from: from.to_string(),
            to: to.to_string(),
        })
}

/// `a + b` in `currency`, failing instead of panicking past the decimal range.
pub(crate) fn checked_add(a: Decimal, b: Decimal, currency: &str) -> Result<Decimal, EngineError> {
    a.checked_add(b).ok_or_else(|| EngineError::TotalOverflow {
        currency: currency.to_string(),
    })
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal, currency: &str) -> Result<Decimal, EngineError> {
    a.checked_sub(b).ok_or_else(|| EngineError::TotalOverflow {
        currency: currency.to_string(),
    })
}
