use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::currency::Currency;

pub type CoreResult<T> = Result<T, CoreError>;

/// Error type that captures validation, consistency, and persistence failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Simulation has no lines")]
    EmptySimulation,
    #[error("Unknown allocation basis: {0}")]
    InvalidBasis(String),
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),
    #[error("Allocation pool must be non-negative, got {0}")]
    NegativePool(Decimal),
    #[error("Allocation weights must be non-negative, got {0}")]
    NegativeWeight(Decimal),
    #[error("Order {0} is not validated")]
    OrderNotValidated(String),
    #[error("No exchange rate for {0}")]
    MissingRate(Currency),
    #[error("Exchange rate for {0} must be positive")]
    NonPositiveRate(Currency),
    #[error("Order reference already exists: {0}")]
    DuplicateReference(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Repository unavailable: {0}")]
    RepositoryUnavailable(String),
    #[error("Forecast {id} was updated concurrently (expected version {expected}, found {found})")]
    OptimisticConflict { id: Uuid, expected: u64, found: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
