use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;
use crate::errors::{CoreError, CoreResult};

/// Lifecycle of a commercial order. Validated orders are immutable.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Draft,
    Submitted,
    Validated,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    pub fn tag(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Submitted => "submitted",
            OrderStatus::Validated => "validated",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "draft" => Ok(OrderStatus::Draft),
            "submitted" => Ok(OrderStatus::Submitted),
            "validated" => Ok(OrderStatus::Validated),
            "rejected" => Ok(OrderStatus::Rejected),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(CoreError::InvalidOperation(format!(
                "Unknown order status: {other}"
            ))),
        }
    }
}

/// Per-client validation state inside an order.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// One sold line: a stock item at a GNF unit price. A missing price counts
/// as zero in every total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub stock_item_id: Uuid,
    pub quantity: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price_gnf: Option<Decimal>,
}

impl OrderItem {
    pub fn new(stock_item_id: Uuid, quantity: Decimal, unit_price_gnf: Decimal) -> Self {
        Self {
            stock_item_id,
            quantity,
            unit_price_gnf: Some(unit_price_gnf),
        }
    }

    pub fn total_gnf(&self) -> Decimal {
        self.quantity * self.unit_price_gnf.unwrap_or_default()
    }
}

/// A client party on a multi-client order. Rejected clients keep their lines
/// for the record but are excluded from totals and from reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderClient {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl OrderClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: None,
            payment_type: None,
            status: ClientStatus::Pending,
            rejection_reason: None,
            items: Vec::new(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ClientStatus::Rejected
    }

    pub fn approve(&mut self) {
        self.status = ClientStatus::Approved;
        self.rejection_reason = None;
    }

    pub fn reject(&mut self, reason: impl Into<String>) {
        self.status = ClientStatus::Rejected;
        self.rejection_reason = Some(reason.into());
    }
}

/// A commercial order across one or more clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommercialOrder {
    pub id: Uuid,
    pub reference: String,
    pub order_date: NaiveDate,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<String>,
    #[serde(default)]
    pub clients: Vec<OrderClient>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommercialOrder {
    pub fn new(reference: impl Into<String>, order_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reference: reference.into(),
            order_date,
            status: OrderStatus::Draft,
            validated_by: None,
            clients: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_validated(&self) -> bool {
        self.status == OrderStatus::Validated
    }

    fn ensure_mutable(&self) -> CoreResult<()> {
        if self.is_validated() {
            return Err(CoreError::InvalidOperation(format!(
                "Order {} is validated and can no longer change",
                self.reference
            )));
        }
        Ok(())
    }

    pub fn add_client(&mut self, client: OrderClient) -> CoreResult<Uuid> {
        self.ensure_mutable()?;
        let id = client.id;
        self.clients.push(client);
        self.touch();
        Ok(id)
    }

    pub fn add_item(&mut self, client_id: Uuid, item: OrderItem) -> CoreResult<()> {
        self.ensure_mutable()?;
        if item.quantity <= Decimal::ZERO {
            return Err(CoreError::NonPositiveQuantity(item.quantity));
        }
        let client = self
            .clients
            .iter_mut()
            .find(|client| client.id == client_id)
            .ok_or_else(|| CoreError::NotFound(format!("order client {client_id}")))?;
        client.items.push(item);
        self.touch();
        Ok(())
    }

    pub fn submit(&mut self) -> CoreResult<()> {
        match self.status {
            OrderStatus::Draft => {
                self.status = OrderStatus::Submitted;
                self.touch();
                Ok(())
            }
            other => Err(CoreError::InvalidOperation(format!(
                "Cannot submit order {} from status {other}",
                self.reference
            ))),
        }
    }

    pub fn validate(&mut self, validator: impl Into<String>) -> CoreResult<()> {
        match self.status {
            OrderStatus::Draft | OrderStatus::Submitted => {
                self.status = OrderStatus::Validated;
                self.validated_by = Some(validator.into());
                self.touch();
                Ok(())
            }
            other => Err(CoreError::InvalidOperation(format!(
                "Cannot validate order {} from status {other}",
                self.reference
            ))),
        }
    }

    pub fn reject(&mut self) -> CoreResult<()> {
        self.ensure_mutable()?;
        self.status = OrderStatus::Rejected;
        self.touch();
        Ok(())
    }

    pub fn cancel(&mut self) -> CoreResult<()> {
        self.ensure_mutable()?;
        self.status = OrderStatus::Cancelled;
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for CommercialOrder {
    fn id(&self) -> Uuid {
        self.id
    }
}
