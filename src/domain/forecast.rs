use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::{Currency, RateBook};
use crate::domain::common::{Identifiable, NamedEntity};
use crate::errors::{CoreError, CoreResult};
use crate::utils::percentage;

/// Lifecycle of a sales forecast. Only active forecasts receive attribution.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ForecastStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Archived,
}

/// One forecast line: expected sales of a stock item over the forecast
/// window, plus the accumulators fed by validated orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastItem {
    pub stock_item_id: Uuid,
    pub forecast_quantity: Decimal,
    pub selling_price_gnf: Decimal,
    #[serde(default)]
    pub realized_quantity: Decimal,
    #[serde(default)]
    pub realized_value_gnf: Decimal,
    #[serde(default)]
    pub realization_percentage: Decimal,
}

impl ForecastItem {
    pub fn new(stock_item_id: Uuid, forecast_quantity: Decimal, selling_price_gnf: Decimal) -> Self {
        Self {
            stock_item_id,
            forecast_quantity,
            selling_price_gnf,
            realized_quantity: Decimal::ZERO,
            realized_value_gnf: Decimal::ZERO,
            realization_percentage: Decimal::ZERO,
        }
    }

    pub fn forecast_value_gnf(&self) -> Decimal {
        self.forecast_quantity * self.selling_price_gnf
    }

    /// Adds one order line's realized quantity and value, then refreshes the
    /// derived percentage. Attribution is additive across orders.
    pub fn accumulate(&mut self, quantity: Decimal, value_gnf: Decimal) {
        self.realized_quantity += quantity;
        self.realized_value_gnf += value_gnf;
        self.refresh_percentage();
    }

    pub fn reset_realization(&mut self) {
        self.realized_quantity = Decimal::ZERO;
        self.realized_value_gnf = Decimal::ZERO;
        self.realization_percentage = Decimal::ZERO;
    }

    fn refresh_percentage(&mut self) {
        self.realization_percentage = percentage(self.realized_value_gnf, self.forecast_value_gnf());
    }
}

/// A sales forecast over a date window, with its exchange-rate snapshot
/// frozen at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: ForecastStatus,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub rates: RateBook,
    #[serde(default)]
    pub total_forecast_value: Decimal,
    #[serde(default)]
    pub total_realized_value: Decimal,
    #[serde(default)]
    pub items: Vec<ForecastItem>,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Forecast {
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        rates: RateBook,
    ) -> CoreResult<Self> {
        if start_date > end_date {
            return Err(CoreError::InvalidOperation(format!(
                "Forecast window {start_date}..{end_date} is inverted"
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date,
            end_date,
            status: ForecastStatus::Draft,
            currency: Currency::GNF,
            rates,
            total_forecast_value: Decimal::ZERO,
            total_realized_value: Decimal::ZERO,
            items: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == ForecastStatus::Active
    }

    /// True when the calendar date falls inside `[start_date, end_date]`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn add_item(&mut self, item: ForecastItem) {
        self.items.push(item);
        self.refresh_totals();
        self.touch();
    }

    /// Recomputes both stored totals from the item lines.
    pub fn refresh_totals(&mut self) {
        self.total_forecast_value = self
            .items
            .iter()
            .map(ForecastItem::forecast_value_gnf)
            .sum();
        self.total_realized_value = self.items.iter().map(|item| item.realized_value_gnf).sum();
    }

    pub fn reset_realization(&mut self) {
        for item in &mut self.items {
            item.reset_realization();
        }
        self.total_realized_value = Decimal::ZERO;
    }

    pub fn activate(&mut self) -> CoreResult<()> {
        match self.status {
            ForecastStatus::Draft => {
                self.status = ForecastStatus::Active;
                self.touch();
                Ok(())
            }
            _ => Err(CoreError::InvalidOperation(format!(
                "Forecast {} cannot be activated twice",
                self.name
            ))),
        }
    }

    pub fn complete(&mut self) -> CoreResult<()> {
        match self.status {
            ForecastStatus::Active => {
                self.status = ForecastStatus::Completed;
                self.touch();
                Ok(())
            }
            _ => Err(CoreError::InvalidOperation(format!(
                "Forecast {} is not active",
                self.name
            ))),
        }
    }

    pub fn archive(&mut self) {
        self.status = ForecastStatus::Archived;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for Forecast {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Forecast {
    fn name(&self) -> &str {
        &self.name
    }
}
