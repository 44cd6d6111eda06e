#![doc(test(attr(deny(warnings))))]

//! Negoce Core offers the landed-cost, order-aggregation, and forecast
//! reconciliation primitives that power an import/distribution trading desk.
//!
//! The crate is a pure computational kernel: it performs no I/O beyond the
//! repository traits in [`storage`], renders nothing, and keeps every stored
//! amount in GNF at full decimal precision.

pub mod allocation;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Negoce Core tracing initialized.");
    });
}
