//! Synchronous client for a pizza chain's online ordering API.
//!
//! # Overview
//! Finds delivery-capable stores near an address, fetches a store's menu,
//! and prices a candidate order. Every operation is one independent
//! request/response round-trip; currency comes back as integer cents.
//!
//! # Design
//! - `OrderingApi` is stateless: it holds the base URL and the customer
//!   identity, builds `HttpRequest` values and parses `HttpResponse` values.
//! - `OrderingClient` pairs it with a `Transport` (by default a `ureq` agent)
//!   to run the exchange.
//! - Upstream JSON shapes live in the private `wire` module; callers only
//!   see the typed values in `types`.
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use pizza_core::{Address, ClientConfig, Customer, OrderingClient};
//!
//! # fn main() -> Result<(), pizza_core::ApiError> {
//! let client = OrderingClient::new(&ClientConfig::new(Customer::default()))?;
//! let address = Address {
//!     street: "747 W 40th St".into(),
//!     city: "Baltimore".into(),
//!     region: "MD".into(),
//!     postal_code: "21211".into(),
//!     kind: "House".into(),
//! };
//! let stores = client.get_delivery_stores(&address)?;
//! if let Some(store) = stores.first() {
//!     let products = BTreeMap::from([("P14IRECZ".to_string(), 1)]);
//!     let price = client.price_order(&store.id, &address, &products)?;
//!     println!("total: {} cents", price.customer_cents);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod money;
pub mod transport;
pub mod types;
mod wire;

pub use client::{OrderingApi, OrderingClient};
pub use config::{ClientConfig, DEFAULT_BASE_URL, REFERER};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use money::CentsError;
pub use transport::{Transport, UreqTransport};
pub use types::{Address, Customer, MenuItem, OrderPrice, Store};
