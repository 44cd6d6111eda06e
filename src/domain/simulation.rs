use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::{Currency, RateBook};
use crate::domain::article::Article;
use crate::domain::common::{Identifiable, NamedEntity};
use crate::errors::CoreError;

/// Selects which per-line weight drives the logistics allocation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CostBasis {
    #[default]
    Value,
    Weight,
}

impl CostBasis {
    pub fn tag(&self) -> &'static str {
        match self {
            CostBasis::Value => "value",
            CostBasis::Weight => "weight",
        }
    }
}

impl fmt::Display for CostBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CostBasis {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "value" => Ok(CostBasis::Value),
            "weight" => Ok(CostBasis::Weight),
            other => Err(CoreError::InvalidBasis(other.to_string())),
        }
    }
}

/// Logistics cost schedule for one import run. Fixed charges are GNF;
/// transport_per_kg applies to the manifest's total mass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LogisticsSchedule {
    #[serde(default)]
    pub customs: Decimal,
    #[serde(default)]
    pub handling: Decimal,
    #[serde(default)]
    pub others: Decimal,
    #[serde(default)]
    pub transport_fixed: Decimal,
    #[serde(default)]
    pub transport_per_kg: Decimal,
}

impl LogisticsSchedule {
    pub fn fixed_total(&self) -> Decimal {
        self.customs + self.handling + self.others + self.transport_fixed
    }

    pub fn variable_total(&self, total_mass_kg: Decimal) -> Decimal {
        self.transport_per_kg * total_mass_kg
    }
}

/// One manifest line of a profitability simulation.
///
/// Unit price, currency, and mass are copied from the article when the line
/// is created, so later catalogue edits do not rewrite past simulations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationLine {
    pub article_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub unit_mass_kg: Decimal,
    #[serde(default)]
    pub selling_price_gnf: Decimal,
}

impl SimulationLine {
    pub fn new(article: &Article, quantity: Decimal, selling_price_gnf: Decimal) -> Self {
        Self {
            article_id: article.id,
            quantity,
            unit_price: article.purchase_price,
            currency: article.currency,
            unit_mass_kg: article.unit_mass_kg,
            selling_price_gnf,
        }
    }

    pub fn mass_kg(&self) -> Decimal {
        self.unit_mass_kg * self.quantity
    }
}

/// A landed-cost profitability simulation over one purchase manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Simulation {
    pub id: Uuid,
    pub name: String,
    pub rate_usd: Decimal,
    pub rate_eur: Decimal,
    #[serde(default)]
    pub rate_xof: Decimal,
    #[serde(default)]
    pub basis: CostBasis,
    #[serde(default)]
    pub truck_capacity_tons: Decimal,
    #[serde(default)]
    pub logistics: LogisticsSchedule,
    #[serde(default)]
    pub lines: Vec<SimulationLine>,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Simulation {
    pub fn new(name: impl Into<String>, rate_usd: Decimal, rate_eur: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rate_usd,
            rate_eur,
            rate_xof: Decimal::ZERO,
            basis: CostBasis::default(),
            truck_capacity_tons: Decimal::ZERO,
            logistics: LogisticsSchedule::default(),
            lines: Vec::new(),
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_line(&mut self, line: SimulationLine) {
        self.lines.push(line);
        self.touch();
    }

    /// Exchange rates frozen on this simulation, keyed for conversion.
    /// Legacy rows may persist a zero XOF rate; those fall back to the USD
    /// rate so stored simulations keep their historical results.
    pub fn rate_book(&self) -> RateBook {
        let xof = if self.rate_xof > Decimal::ZERO {
            self.rate_xof
        } else {
            self.rate_usd
        };
        RateBook::new()
            .with_rate(Currency::USD, self.rate_usd)
            .with_rate(Currency::EUR, self.rate_eur)
            .with_rate(Currency::XOF, xof)
    }

    pub fn complete(&mut self) {
        self.is_completed = true;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for Simulation {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Simulation {
    fn name(&self) -> &str {
        &self.name
    }
}
