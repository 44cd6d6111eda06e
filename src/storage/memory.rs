//! In-memory reference backend. Backs the JSON store and the test suites.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Article, CommercialOrder, Forecast, PriceList, Simulation, StockItem};
use crate::errors::{CoreError, CoreResult};

use super::{ArticleRepo, DataSet, ForecastRepo, OrderRepo, PriceListRepo, SimulationRepo};

/// A `Mutex`-guarded dataset implementing every repository trait. The store
/// lock is held for the duration of each save, which gives batch saves their
/// all-or-nothing behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<DataSet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(dataset: DataSet) -> Self {
        Self {
            data: Mutex::new(dataset),
        }
    }

    /// A full copy of the current state.
    pub fn snapshot(&self) -> CoreResult<DataSet> {
        Ok(self.lock()?.clone())
    }

    /// Replaces the current state wholesale. Used by the JSON backend to
    /// roll a failed flush back.
    pub fn replace(&self, dataset: DataSet) -> CoreResult<()> {
        *self.lock()? = dataset;
        Ok(())
    }

    pub fn put_article(&self, article: Article) -> CoreResult<()> {
        let mut data = self.lock()?;
        upsert(&mut data.articles, article, |entry| entry.id);
        Ok(())
    }

    pub fn put_stock_item(&self, stock_item: StockItem) -> CoreResult<()> {
        let mut data = self.lock()?;
        upsert(&mut data.stock_items, stock_item, |entry| entry.id);
        Ok(())
    }

    pub fn put_price_list(&self, price_list: PriceList) -> CoreResult<()> {
        let mut data = self.lock()?;
        upsert(&mut data.price_lists, price_list, |entry| entry.id);
        Ok(())
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, DataSet>> {
        self.data
            .lock()
            .map_err(|_| CoreError::RepositoryUnavailable("store lock poisoned".into()))
    }
}

fn upsert<T, K: PartialEq>(entries: &mut Vec<T>, entry: T, key: impl Fn(&T) -> K) {
    let id = key(&entry);
    match entries.iter_mut().find(|existing| key(existing) == id) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

impl SimulationRepo for MemoryStore {
    fn simulation(&self, id: Uuid) -> CoreResult<Simulation> {
        self.lock()?
            .simulations
            .iter()
            .find(|simulation| simulation.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("simulation {id}")))
    }

    fn save_simulation(&self, simulation: &Simulation) -> CoreResult<()> {
        let mut data = self.lock()?;
        upsert(&mut data.simulations, simulation.clone(), |entry| entry.id);
        Ok(())
    }
}

impl ArticleRepo for MemoryStore {
    fn article(&self, id: Uuid) -> CoreResult<Article> {
        self.lock()?
            .articles
            .iter()
            .find(|article| article.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("article {id}")))
    }

    fn list_active_articles(&self) -> CoreResult<Vec<Article>> {
        Ok(self
            .lock()?
            .articles
            .iter()
            .filter(|article| article.is_active)
            .cloned()
            .collect())
    }

    fn stock_item_by_name(&self, name: &str) -> CoreResult<Option<StockItem>> {
        Ok(self
            .lock()?
            .stock_items
            .iter()
            .find(|item| item.is_active && item.name.eq_ignore_ascii_case(name))
            .cloned())
    }
}

impl OrderRepo for MemoryStore {
    fn order(&self, id: Uuid) -> CoreResult<CommercialOrder> {
        self.lock()?
            .orders
            .iter()
            .find(|order| order.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("order {id}")))
    }

    fn validated_in_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CoreResult<Vec<CommercialOrder>> {
        Ok(self
            .lock()?
            .orders
            .iter()
            .filter(|order| order.is_validated())
            .filter(|order| start.map_or(true, |from| order.order_date >= from))
            .filter(|order| end.map_or(true, |until| order.order_date <= until))
            .cloned()
            .collect())
    }

    fn save_order(&self, order: &CommercialOrder) -> CoreResult<()> {
        let mut data = self.lock()?;
        if data
            .orders
            .iter()
            .any(|existing| existing.id != order.id && existing.reference == order.reference)
        {
            return Err(CoreError::DuplicateReference(order.reference.clone()));
        }
        upsert(&mut data.orders, order.clone(), |entry| entry.id);
        Ok(())
    }
}

impl ForecastRepo for MemoryStore {
    fn forecast(&self, id: Uuid) -> CoreResult<Forecast> {
        self.lock()?
            .forecasts
            .iter()
            .find(|forecast| forecast.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("forecast {id}")))
    }

    fn list_active(&self) -> CoreResult<Vec<Forecast>> {
        Ok(self
            .lock()?
            .forecasts
            .iter()
            .filter(|forecast| forecast.is_active())
            .cloned()
            .collect())
    }

    fn active_covering(&self, date: NaiveDate) -> CoreResult<Vec<Forecast>> {
        Ok(self
            .lock()?
            .forecasts
            .iter()
            .filter(|forecast| forecast.is_active() && forecast.covers(date))
            .cloned()
            .collect())
    }

    fn save_forecasts(&self, forecasts: &[Forecast]) -> CoreResult<()> {
        let mut data = self.lock()?;
        // Validate the whole batch before touching anything.
        for forecast in forecasts {
            if let Some(stored) = data
                .forecasts
                .iter()
                .find(|existing| existing.id == forecast.id)
            {
                if stored.version != forecast.version {
                    return Err(CoreError::OptimisticConflict {
                        id: forecast.id,
                        expected: forecast.version,
                        found: stored.version,
                    });
                }
            }
        }
        for forecast in forecasts {
            let mut committed = forecast.clone();
            committed.version += 1;
            upsert(&mut data.forecasts, committed, |entry| entry.id);
        }
        Ok(())
    }
}

impl PriceListRepo for MemoryStore {
    fn active_price_list(&self, date: NaiveDate) -> CoreResult<Option<PriceList>> {
        Ok(self
            .lock()?
            .price_lists
            .iter()
            .filter(|list| list.covers(date))
            .max_by_key(|list| list.start_date)
            .cloned())
    }
}
