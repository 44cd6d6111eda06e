//! Whole-dataset JSON snapshot persistence.
//!
//! The store keeps the working copy in a [`MemoryStore`] and writes the full
//! dataset back to one JSON file after every mutation, staging through a
//! temporary file so a failed write never truncates the previous snapshot.
//! Legacy files with missing columns load through serde defaults.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Article, CommercialOrder, Forecast, PriceList, Simulation, StockItem};
use crate::errors::CoreResult;

use super::memory::MemoryStore;
use super::{ArticleRepo, DataSet, ForecastRepo, OrderRepo, PriceListRepo, SimulationRepo};

const TMP_SUFFIX: &str = "tmp";

/// A JSON-file-backed dataset store implementing every repository trait.
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Opens the store at `path`, starting from an empty dataset when the
    /// file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let dataset = if path.exists() {
            let data = fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            DataSet::default()
        };
        Ok(Self {
            path,
            inner: MemoryStore::with_dataset(dataset),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> CoreResult<DataSet> {
        self.inner.snapshot()
    }

    /// Writes the current dataset to disk.
    pub fn flush(&self) -> CoreResult<()> {
        let dataset = self.inner.snapshot()?;
        let json = serde_json::to_string_pretty(&dataset)?;
        write_atomic(&self.path, &json)
    }

    pub fn put_article(&self, article: Article) -> CoreResult<()> {
        let previous = self.inner.snapshot()?;
        self.inner.put_article(article)?;
        self.flush_or_rollback(previous)
    }

    pub fn put_stock_item(&self, stock_item: StockItem) -> CoreResult<()> {
        let previous = self.inner.snapshot()?;
        self.inner.put_stock_item(stock_item)?;
        self.flush_or_rollback(previous)
    }

    pub fn put_price_list(&self, price_list: PriceList) -> CoreResult<()> {
        let previous = self.inner.snapshot()?;
        self.inner.put_price_list(price_list)?;
        self.flush_or_rollback(previous)
    }

    /// Flushes after a successful in-memory mutation; restores the previous
    /// state when the disk write fails so memory and file stay in step.
    fn flush_or_rollback(&self, previous: DataSet) -> CoreResult<()> {
        if let Err(err) = self.flush() {
            self.inner.replace(previous)?;
            return Err(err);
        }
        Ok(())
    }
}

impl SimulationRepo for JsonStore {
    fn simulation(&self, id: Uuid) -> CoreResult<Simulation> {
        self.inner.simulation(id)
    }

    fn save_simulation(&self, simulation: &Simulation) -> CoreResult<()> {
        let previous = self.inner.snapshot()?;
        self.inner.save_simulation(simulation)?;
        self.flush_or_rollback(previous)
    }
}

impl ArticleRepo for JsonStore {
    fn article(&self, id: Uuid) -> CoreResult<Article> {
        self.inner.article(id)
    }

    fn list_active_articles(&self) -> CoreResult<Vec<Article>> {
        self.inner.list_active_articles()
    }

    fn stock_item_by_name(&self, name: &str) -> CoreResult<Option<StockItem>> {
        self.inner.stock_item_by_name(name)
    }
}

impl OrderRepo for JsonStore {
    fn order(&self, id: Uuid) -> CoreResult<CommercialOrder> {
        self.inner.order(id)
    }

    fn validated_in_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CoreResult<Vec<CommercialOrder>> {
        self.inner.validated_in_range(start, end)
    }

    fn save_order(&self, order: &CommercialOrder) -> CoreResult<()> {
        let previous = self.inner.snapshot()?;
        self.inner.save_order(order)?;
        self.flush_or_rollback(previous)
    }
}

impl ForecastRepo for JsonStore {
    fn forecast(&self, id: Uuid) -> CoreResult<Forecast> {
        self.inner.forecast(id)
    }

    fn list_active(&self) -> CoreResult<Vec<Forecast>> {
        self.inner.list_active()
    }

    fn active_covering(&self, date: NaiveDate) -> CoreResult<Vec<Forecast>> {
        self.inner.active_covering(date)
    }

    fn save_forecasts(&self, forecasts: &[Forecast]) -> CoreResult<()> {
        let previous = self.inner.snapshot()?;
        self.inner.save_forecasts(forecasts)?;
        self.flush_or_rollback(previous)
    }
}

impl PriceListRepo for JsonStore {
    fn active_price_list(&self, date: NaiveDate) -> CoreResult<Option<PriceList>> {
        self.inner.active_price_list(date)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
