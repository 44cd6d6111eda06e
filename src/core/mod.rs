pub mod services;

pub use services::{
    AttributionReport, CostLineReport, CostReport, CostingService, OrderService,
    RecalculationReport, ReconciliationService,
};
