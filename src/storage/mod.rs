//! Persistence port: the narrow repository traits the core consumes, plus
//! the reference backends that implement them.
//!
//! Implementations tolerate legacy schema drift; the core only ever sees
//! fully-populated aggregates.

pub mod json_backend;
pub mod memory;

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Article, CommercialOrder, Forecast, PriceList, Simulation, StockItem};
use crate::errors::CoreResult;

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

/// Loads and stores profitability simulations.
pub trait SimulationRepo: Send + Sync {
    fn simulation(&self, id: Uuid) -> CoreResult<Simulation>;
    fn save_simulation(&self, simulation: &Simulation) -> CoreResult<()>;
}

/// Catalogue access, including the one sanctioned name lookup: stock items
/// are resolved by case-insensitive name on write paths only.
pub trait ArticleRepo: Send + Sync {
    fn article(&self, id: Uuid) -> CoreResult<Article>;
    fn list_active_articles(&self) -> CoreResult<Vec<Article>>;
    fn stock_item_by_name(&self, name: &str) -> CoreResult<Option<StockItem>>;
}

/// Loads and stores commercial orders. `save_order` enforces reference
/// uniqueness across orders.
pub trait OrderRepo: Send + Sync {
    fn order(&self, id: Uuid) -> CoreResult<CommercialOrder>;
    fn validated_in_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CoreResult<Vec<CommercialOrder>>;
    fn save_order(&self, order: &CommercialOrder) -> CoreResult<()>;
}

/// Loads forecasts and persists accumulator updates.
pub trait ForecastRepo: Send + Sync {
    fn forecast(&self, id: Uuid) -> CoreResult<Forecast>;
    fn list_active(&self) -> CoreResult<Vec<Forecast>>;
    fn active_covering(&self, date: NaiveDate) -> CoreResult<Vec<Forecast>>;
    /// Persists the batch as one unit. A stale `version` on any forecast
    /// fails the whole batch with `OptimisticConflict` and writes nothing.
    fn save_forecasts(&self, forecasts: &[Forecast]) -> CoreResult<()>;
}

/// Resolves the price list in force on a date: the latest `start_date`
/// among active lists whose `end_date` is null or on/after the date.
pub trait PriceListRepo: Send + Sync {
    fn active_price_list(&self, date: NaiveDate) -> CoreResult<Option<PriceList>>;
}

/// The whole persisted state as one serializable snapshot. Every collection
/// defaults to empty so legacy files missing a section still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataSet {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub stock_items: Vec<StockItem>,
    #[serde(default)]
    pub simulations: Vec<Simulation>,
    #[serde(default)]
    pub orders: Vec<CommercialOrder>,
    #[serde(default)]
    pub forecasts: Vec<Forecast>,
    #[serde(default)]
    pub price_lists: Vec<PriceList>,
}

/// Detects dangling references and other anomalies within a dataset
/// snapshot. Returns human-readable warnings; never fails.
pub fn dataset_warnings(dataset: &DataSet) -> Vec<String> {
    let article_ids: HashSet<_> = dataset.articles.iter().map(|article| article.id).collect();
    let stock_item_ids: HashSet<_> = dataset.stock_items.iter().map(|item| item.id).collect();
    let mut warnings = Vec::new();

    for simulation in &dataset.simulations {
        for line in &simulation.lines {
            if !article_ids.contains(&line.article_id) {
                warnings.push(format!(
                    "simulation {} references unknown article {}",
                    simulation.name, line.article_id
                ));
            }
        }
    }

    let mut references = HashSet::new();
    for order in &dataset.orders {
        if !references.insert(order.reference.as_str()) {
            warnings.push(format!("duplicate order reference {}", order.reference));
        }
        for client in &order.clients {
            for item in &client.items {
                if !stock_item_ids.contains(&item.stock_item_id) {
                    warnings.push(format!(
                        "order {} references unknown stock item {}",
                        order.reference, item.stock_item_id
                    ));
                }
            }
        }
    }

    for forecast in &dataset.forecasts {
        let mut seen = HashSet::new();
        for item in &forecast.items {
            if !stock_item_ids.contains(&item.stock_item_id) {
                warnings.push(format!(
                    "forecast {} references unknown stock item {}",
                    forecast.name, item.stock_item_id
                ));
            }
            if !seen.insert(item.stock_item_id) {
                warnings.push(format!(
                    "forecast {} carries duplicate lines for stock item {}",
                    forecast.name, item.stock_item_id
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::RateBook;
    use crate::domain::forecast::ForecastItem;
    use crate::domain::order::{OrderClient, OrderItem};
    use rust_decimal_macros::dec;

    #[test]
    fn warnings_flag_dangling_references_and_duplicates() {
        let mut dataset = DataSet::default();
        let stock_item = StockItem::new("SKU-1", "Huile 20L");
        let known = stock_item.id;
        dataset.stock_items.push(stock_item);

        let date = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let mut order = CommercialOrder::new("CMD-1", date);
        let client_id = order.add_client(OrderClient::new("Camara")).expect("client");
        order
            .add_item(client_id, OrderItem::new(Uuid::new_v4(), dec!(1), dec!(1000)))
            .expect("item");
        let mut twin = order.clone();
        twin.id = Uuid::new_v4();
        dataset.orders.push(order);
        dataset.orders.push(twin);

        let mut forecast = Forecast::new(
            "Q1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            RateBook::new(),
        )
        .expect("forecast");
        forecast.add_item(ForecastItem::new(known, dec!(10), dec!(1000)));
        forecast.add_item(ForecastItem::new(known, dec!(20), dec!(1000)));
        dataset.forecasts.push(forecast);

        let warnings = dataset_warnings(&dataset);
        assert_eq!(warnings.len(), 4);
        assert!(warnings
            .iter()
            .any(|warning| warning.contains("duplicate order reference")));
        assert!(warnings
            .iter()
            .any(|warning| warning.contains("unknown stock item")));
        assert!(warnings
            .iter()
            .any(|warning| warning.contains("duplicate lines")));
    }

    #[test]
    fn clean_dataset_produces_no_warnings() {
        assert!(dataset_warnings(&DataSet::default()).is_empty());
    }
}
