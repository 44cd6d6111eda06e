use chrono::NaiveDate;
use negoce_core::core::services::ReconciliationService;
use negoce_core::currency::{Currency, RateBook};
use negoce_core::domain::{
    CommercialOrder, Forecast, ForecastItem, OrderClient, OrderItem, Simulation, StockItem,
};
use negoce_core::errors::CoreError;
use negoce_core::storage::{
    dataset_warnings, ForecastRepo, JsonStore, MemoryStore, OrderRepo, SimulationRepo,
};
use rust_decimal_macros::dec;
use tempfile::TempDir;
use uuid::Uuid;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn active_forecast(stock_item: Uuid) -> Forecast {
    let mut forecast = Forecast::new(
        "Q1 2024",
        date(2024, 1, 1),
        date(2024, 3, 31),
        RateBook::new().with_rate(Currency::USD, dec!(8500)),
    )
    .expect("forecast");
    forecast.add_item(ForecastItem::new(stock_item, dec!(100), dec!(50000)));
    forecast.activate().expect("activate");
    forecast
}

fn validated_order(reference: &str, stock_item: Uuid) -> CommercialOrder {
    let mut order = CommercialOrder::new(reference, date(2024, 2, 10));
    let client_id = order.add_client(OrderClient::new("Diallo Frères")).expect("client");
    order
        .add_item(client_id, OrderItem::new(stock_item, dec!(30), dec!(55000)))
        .expect("item");
    order.validate("admin").expect("validate");
    order
}

#[test]
fn reconciliation_survives_a_store_reopen() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("dataset.json");
    let stock_item = Uuid::new_v4();

    {
        let store = JsonStore::open(&path).expect("open");
        store.put_stock_item(StockItem::new("SKU-1", "Huile 20L")).expect("seed");
        store
            .save_forecasts(&[active_forecast(stock_item)])
            .expect("seed forecast");
        store.save_order(&validated_order("CMD-1", stock_item)).expect("seed order");

        let report =
            ReconciliationService::recalculate(&store, &store, None, None).expect("recalculate");
        assert_eq!(report.orders_processed, 1);
        assert_eq!(report.forecasts_saved, 1);
    }

    let reopened = JsonStore::open(&path).expect("reopen");
    let forecast = reopened.list_active().expect("list").remove(0);
    assert_eq!(forecast.items[0].realized_quantity, dec!(30));
    assert_eq!(forecast.items[0].realized_value_gnf, dec!(1650000));
    assert_eq!(forecast.items[0].realization_percentage, dec!(33));
    assert_eq!(forecast.total_realized_value, dec!(1650000));
    assert_eq!(
        forecast.rates.rate(Currency::USD),
        Some(dec!(8500)),
        "rate snapshot survives persistence"
    );
}

#[test]
fn duplicate_references_are_refused_by_the_json_store_too() {
    let temp = TempDir::new().expect("temp dir");
    let store = JsonStore::open(temp.path().join("dataset.json")).expect("open");
    let stock_item = Uuid::new_v4();
    store.save_order(&validated_order("CMD-1", stock_item)).expect("first");

    let err = store
        .save_order(&validated_order("CMD-1", stock_item))
        .expect_err("duplicate reference");
    assert!(matches!(err, CoreError::DuplicateReference(reference) if reference == "CMD-1"));
    // The failed save left the stored state untouched.
    assert_eq!(store.validated_in_range(None, None).expect("list").len(), 1);
}

#[test]
fn stale_forecast_handles_conflict_without_persisting() {
    let store = MemoryStore::new();
    let stock_item = Uuid::new_v4();
    store
        .save_forecasts(&[active_forecast(stock_item)])
        .expect("seed");

    let fresh = store.list_active().expect("list").remove(0);
    let mut stale = fresh.clone();
    stale.version = 0;

    store.save_forecasts(&[fresh.clone()]).expect("fresh handle saves");
    let err = store.save_forecasts(&[stale]).expect_err("stale handle conflicts");
    assert!(matches!(err, CoreError::OptimisticConflict { .. }));

    let stored = store.forecast(fresh.id).expect("load");
    assert_eq!(stored.version, 2);
}

#[test]
fn simulations_round_trip_through_disk() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("dataset.json");
    let mut simulation = Simulation::new("Conakry run", dec!(8500), dec!(9200));
    simulation.truck_capacity_tons = dec!(30);

    {
        let store = JsonStore::open(&path).expect("open");
        store.save_simulation(&simulation).expect("save");
    }
    let reopened = JsonStore::open(&path).expect("reopen");
    let loaded = reopened.simulation(simulation.id).expect("load");
    assert_eq!(loaded, simulation);
}

#[test]
fn warnings_surface_dangling_references_after_load() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("dataset.json");
    let store = JsonStore::open(&path).expect("open");
    // An order referencing a stock item nobody declared.
    store
        .save_order(&validated_order("CMD-1", Uuid::new_v4()))
        .expect("save");

    let warnings = dataset_warnings(&store.snapshot().expect("snapshot"));
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("CMD-1"));
    assert!(warnings[0].contains("unknown stock item"));
}
