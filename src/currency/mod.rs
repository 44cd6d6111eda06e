use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

/// Display scale for monetary amounts.
pub const MONEY_SCALE: u32 = 2;
/// Display scale for quantities and masses.
pub const QUANTITY_SCALE: u32 = 4;
/// Display scale for exchange rates and percentages.
pub const RATE_SCALE: u32 = 8;

/// Closed set of currencies the trading desk handles. GNF is the base:
/// every persisted amount is GNF.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Currency {
    #[default]
    GNF,
    USD,
    EUR,
    XOF,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::GNF, Currency::USD, Currency::EUR, Currency::XOF];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::GNF => "GNF",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::XOF => "XOF",
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self, Currency::GNF)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(value))
            .ok_or_else(|| CoreError::UnknownCurrency(value.to_string()))
    }
}

/// Exchange rates expressed in GNF per one unit of foreign currency.
///
/// The base currency always converts at parity; foreign rates must be present
/// and positive at the moment a conversion consults them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RateBook {
    #[serde(default)]
    rates: BTreeMap<Currency, Decimal>,
}

impl RateBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, currency: Currency, rate: Decimal) -> Self {
        self.set_rate(currency, rate);
        self
    }

    pub fn set_rate(&mut self, currency: Currency, rate: Decimal) {
        if currency.is_base() {
            return;
        }
        self.rates.insert(currency, rate);
    }

    /// Returns the stored rate, or parity for the base currency.
    pub fn rate(&self, currency: Currency) -> Option<Decimal> {
        if currency.is_base() {
            return Some(Decimal::ONE);
        }
        self.rates.get(&currency).copied()
    }

    fn checked_rate(&self, currency: Currency) -> CoreResult<Decimal> {
        let rate = self
            .rate(currency)
            .ok_or(CoreError::MissingRate(currency))?;
        if rate <= Decimal::ZERO {
            return Err(CoreError::NonPositiveRate(currency));
        }
        Ok(rate)
    }

    /// Converts `amount` of `from` into GNF.
    pub fn to_base(&self, amount: Decimal, from: Currency) -> CoreResult<Decimal> {
        if from.is_base() {
            return Ok(amount);
        }
        Ok(amount * self.checked_rate(from)?)
    }

    /// Converts a GNF amount into `to`.
    pub fn from_base(&self, amount_gnf: Decimal, to: Currency) -> CoreResult<Decimal> {
        if to.is_base() {
            return Ok(amount_gnf);
        }
        Ok(amount_gnf / self.checked_rate(to)?)
    }

    /// Converts between any two currencies via the base. Identity when
    /// `from == to`; no display rounding is applied.
    pub fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> CoreResult<Decimal> {
        if from == to {
            return Ok(amount);
        }
        let gnf = self.to_base(amount, from)?;
        self.from_base(gnf, to)
    }
}

/// Rounds a monetary amount for display. Computations never round.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a quantity or mass for display.
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a rate or percentage for display.
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Formats an amount with thousands grouping for reports, e.g. `1,234,567.89 GNF`.
pub fn format_amount(value: Decimal, currency: Currency) -> String {
    let rounded = round_money(value);
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), Some(frac_part.to_string())),
        None => (text, None),
    };

    let mut grouped = String::new();
    for (index, digit) in int_part.chars().rev().enumerate() {
        if index > 0 && index % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let grouped: String = grouped.chars().rev().collect();

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac} {currency}"),
        None => format!("{sign}{grouped} {currency}"),
    }
}
