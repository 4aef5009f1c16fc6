//! Request builder, response parser, and the transport-driven ordering client.
//!
//! # Design
//! `OrderingApi` holds only the base URL and the customer identity and carries
//! no mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`, keeping the mapping layer deterministic and free of I/O.
//! `OrderingClient` pairs an `OrderingApi` with a `Transport` and performs the
//! round-trip in between.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{ClientConfig, REFERER};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Address, Customer, MenuItem, OrderPrice, Store};
use crate::wire::{MenuResponse, OrderEnvelope, PriceOrderRequest, PriceOrderResponse, StoreLocatorResponse};

/// Status the upstream answers with when it refuses to price an order.
const REJECTED_STATUS: i64 = -1;

/// Stateless request builder and response parser for the ordering API.
#[derive(Debug, Clone)]
pub struct OrderingApi {
    base_url: Url,
    customer: Customer,
}

impl OrderingApi {
    /// `base_url` should end with `/`; use `from_config` to have that
    /// enforced.
    pub fn new(base_url: Url, customer: Customer) -> Self {
        Self { base_url, customer }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(config.parsed_base_url()?, config.customer.clone()))
    }

    /// Resolve a relative path or absolute URL against the base URL.
    pub fn resolve(&self, reference: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(reference)?)
    }

    /// Assemble a request for `url`. Every request carries the upstream's
    /// required `Referer`; a body additionally gets a JSON content type.
    pub fn request(&self, method: HttpMethod, url: &Url, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("Referer".to_string(), REFERER.to_string())];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        }
    }

    pub fn build_delivery_stores(&self, address: &Address) -> Result<HttpRequest, ApiError> {
        let mut url = self.resolve("store-locator")?;
        url.query_pairs_mut()
            .append_pair("c", &address.city_line())
            .append_pair("s", &address.street)
            .append_pair("s", "Delivery");
        Ok(self.request(HttpMethod::Get, &url, None))
    }

    pub fn build_menu_items(&self, store_id: &str) -> Result<HttpRequest, ApiError> {
        let mut url = self.resolve("store/")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(store_id)
            .push("menu");
        url.query_pairs_mut()
            .append_pair("lang", "en")
            .append_pair("structured", "true");
        Ok(self.request(HttpMethod::Get, &url, None))
    }

    pub fn build_price_order(
        &self,
        store_id: &str,
        address: &Address,
        products: &BTreeMap<String, u32>,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.resolve("price-order")?;
        let payload = PriceOrderRequest {
            order: OrderEnvelope::new(store_id, address, products, &self.customer),
        };
        Ok(self.request(HttpMethod::Post, &url, Some(to_json(&payload)?)))
    }

    /// Keep only delivery-capable stores, in upstream order.
    pub fn parse_delivery_stores(&self, response: HttpResponse) -> Result<Vec<Store>, ApiError> {
        let resp: StoreLocatorResponse = decode(&response)?;
        Ok(resp
            .stores
            .into_iter()
            .filter(|s| s.is_delivery_store)
            .map(|s| Store {
                id: s.store_id,
                delivery_minutes: s.service_method_estimated_wait_minutes.delivery.min,
            })
            .collect())
    }

    /// One item per variant, ordered by variant key. A single malformed
    /// price fails the whole menu.
    pub fn parse_menu_items(&self, response: HttpResponse) -> Result<Vec<MenuItem>, ApiError> {
        let resp: MenuResponse = decode(&response)?;
        resp.variants
            .into_values()
            .map(|v| -> Result<MenuItem, ApiError> {
                Ok(MenuItem {
                    price_cents: crate::money::cents_from_str(&v.price)?,
                    code: v.code,
                    name: v.name,
                })
            })
            .collect()
    }

    pub fn parse_price_order(&self, response: HttpResponse) -> Result<OrderPrice, ApiError> {
        let resp: PriceOrderResponse = decode(&response)?;
        if resp.status == REJECTED_STATUS {
            return Err(ApiError::OrderRejected);
        }
        let breakdown = &resp.order.amounts_breakdown;
        Ok(OrderPrice {
            delivery_cents: breakdown.delivery_fee.to_cents()?,
            tax_cents: breakdown.tax.to_cents()?,
            customer_cents: breakdown.customer.to_cents()?,
            id: resp.order.order_id,
        })
    }
}

fn to_json<T: Serialize>(payload: &T) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))
}

/// Decode a JSON body regardless of status; the upstream reports failures
/// in-band, and a non-JSON error page surfaces as `DecodeError`.
fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DecodeError(format!("HTTP {}: {e}", response.status)))
}

/// Blocking client for the ordering API.
///
/// Cheap to share behind an `Arc` when the transport is: no operation writes
/// to the client.
#[derive(Debug, Clone)]
pub struct OrderingClient<T = UreqTransport> {
    api: OrderingApi,
    transport: T,
    debug: bool,
}

impl OrderingClient<UreqTransport> {
    /// Client over a default `ureq` agent with no timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> OrderingClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Result<Self, ApiError> {
        Ok(Self {
            api: OrderingApi::from_config(config)?,
            transport,
            debug: config.debug,
        })
    }

    pub fn api(&self) -> &OrderingApi {
        &self.api
    }

    /// Delivery-capable stores near `address`. Empty when none qualify.
    #[instrument(skip(self, address), fields(postal_code = %address.postal_code))]
    pub fn get_delivery_stores(&self, address: &Address) -> Result<Vec<Store>, ApiError> {
        let request = self.api.build_delivery_stores(address)?;
        let stores = self.api.parse_delivery_stores(self.round_trip(&request)?)?;
        debug!(count = stores.len(), "found delivery stores");
        Ok(stores)
    }

    #[instrument(skip(self))]
    pub fn get_menu_items(&self, store_id: &str) -> Result<Vec<MenuItem>, ApiError> {
        let request = self.api.build_menu_items(store_id)?;
        self.api.parse_menu_items(self.round_trip(&request)?)
    }

    /// Price `products` (code → quantity) for delivery to `address`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::OrderRejected` when the store declines the order.
    #[instrument(skip(self, address, products), fields(lines = products.len()))]
    pub fn price_order(
        &self,
        store_id: &str,
        address: &Address,
        products: &BTreeMap<String, u32>,
    ) -> Result<OrderPrice, ApiError> {
        let request = self.api.build_price_order(store_id, address, products)?;
        self.api.parse_price_order(self.round_trip(&request)?)
    }

    fn round_trip(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        if self.debug {
            debug!("request:\n{request}");
        }
        let response = self.transport.execute(request)?;
        if self.debug {
            debug!("response:\n{response}");
        }
        Ok(response)
    }
}
