pub mod costing_service;
pub mod order_service;
pub mod reconciliation_service;

pub use costing_service::{CostLineReport, CostReport, CostingService};
pub use order_service::OrderService;
pub use reconciliation_service::{
    AttributionReport, RecalculationReport, ReconciliationService,
};
