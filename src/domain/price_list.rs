use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{default_true, Identifiable, NamedEntity};

/// Published prices for one stock item, matched by name. Wholesale takes
/// precedence over retail when both are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceListEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wholesale_price_gnf: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retail_price_gnf: Option<Decimal>,
}

impl PriceListEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wholesale_price_gnf: None,
            retail_price_gnf: None,
        }
    }

    pub fn with_wholesale(mut self, price_gnf: Decimal) -> Self {
        self.wholesale_price_gnf = Some(price_gnf);
        self
    }

    pub fn with_retail(mut self, price_gnf: Decimal) -> Self {
        self.retail_price_gnf = Some(price_gnf);
        self
    }
}

/// A dated price list. At most one list is considered active for a given
/// date: the latest `start_date` among active lists still covering it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceList {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub entries: Vec<PriceListEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PriceList {
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date,
            end_date: None,
            is_active: true,
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.start_date <= date
            && self.end_date.map_or(true, |end| end >= date)
    }

    /// Case-insensitive lookup of the entry published for `name`.
    pub fn entry_for(&self, name: &str) -> Option<&PriceListEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for PriceList {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for PriceList {
    fn name(&self) -> &str {
        &self.name
    }
}
