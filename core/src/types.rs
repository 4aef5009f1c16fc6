//! Domain types exposed to callers of the ordering client.
//!
//! # Design
//! These are the typed, cents-denominated values callers work with. The
//! upstream's loosely-typed JSON shapes live in `wire` and never leak out of
//! the crate. `Address` is the one exception that crosses both ways: it is
//! embedded verbatim in price-order bodies, so it serializes with the
//! upstream's field names.

use serde::{Deserialize, Serialize};

/// A delivery address as the caller supplies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    /// Delivery-type tag, e.g. "House" or "Delivery".
    #[serde(rename = "Type")]
    pub kind: String,
}

impl Address {
    /// The locator's city line: `"City, Region PostalCode"`.
    pub fn city_line(&self) -> String {
        format!("{}, {} {}", self.city, self.region, self.postal_code)
    }
}

/// A delivery-capable store near an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub delivery_minutes: u32,
}

/// One purchasable variant from a store's menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub code: String,
    pub name: String,
    pub price_cents: i64,
}

/// The priced breakdown of a candidate order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPrice {
    pub id: String,
    pub delivery_cents: i64,
    pub tax_cents: i64,
    pub customer_cents: i64,
}

/// Identity attached to every priced order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}
