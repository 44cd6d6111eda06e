use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Currency;
use crate::domain::common::{default_true, Identifiable, NamedEntity};

/// A catalogue item as bought from foreign suppliers. Purchase prices are
/// kept in the supplier's currency; everything downstream converts to GNF.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub unit_mass_kg: Decimal,
    pub purchase_price: Decimal,
    pub currency: Currency,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Creates a new article priced in the given supplier currency.
    pub fn new(name: impl Into<String>, purchase_price: Decimal, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            unit_mass_kg: Decimal::ZERO,
            purchase_price,
            currency,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the unit mass used for weight-basis allocations.
    pub fn with_unit_mass(mut self, unit_mass_kg: Decimal) -> Self {
        self.unit_mass_kg = unit_mass_kg;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for Article {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Article {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A stock-keeping unit as sold to clients. Kept distinct from [`Article`]:
/// the legacy schema carries both, matched by name inside the persistence
/// layer only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockItem {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price_gnf: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sku: sku.into(),
            name: name.into(),
            is_active: true,
            purchase_price_gnf: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_purchase_price(mut self, purchase_price_gnf: Decimal) -> Self {
        self.purchase_price_gnf = Some(purchase_price_gnf);
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for StockItem {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for StockItem {
    fn name(&self) -> &str {
        &self.name
    }
}
