//! Upstream JSON shapes for requests and responses.
//!
//! Response structs decode permissively: unknown fields are ignored and
//! optional nesting defaults to empty, so a sparse store record still decodes.
//! Field names follow the upstream exactly, including its inconsistencies
//! (`AmountBreakdown` on the request, `AmountsBreakdown` on the response).

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::money::Amount;
use crate::types::{Address, Customer};

// ---------------------------------------------------------------------------
// store-locator
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct StoreLocatorResponse {
    pub stores: Vec<StoreRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct StoreRecord {
    #[serde(rename = "StoreID")]
    pub store_id: String,
    pub is_delivery_store: bool,
    pub service_method_estimated_wait_minutes: ServiceMethodWait,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct ServiceMethodWait {
    pub delivery: WaitRange,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct WaitRange {
    pub min: u32,
}

// ---------------------------------------------------------------------------
// store/{id}/menu
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct MenuResponse {
    pub variants: BTreeMap<String, VariantRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct VariantRecord {
    pub code: String,
    pub price: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// price-order
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PriceOrderRequest {
    #[serde(rename = "Order")]
    pub order: OrderEnvelope,
}

/// The full order envelope the upstream expects. Most fields are fixed
/// defaults; only products, address, store and customer vary.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct OrderEnvelope {
    pub address: Address,
    pub coupons: Vec<String>,
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    pub extension: String,
    pub order_channel: String,
    #[serde(rename = "OrderID")]
    pub order_id: String,
    pub no_combine: bool,
    pub order_method: String,
    pub order_taker: Option<String>,
    pub payments: Vec<Payment>,
    pub products: Vec<ProductLine>,
    pub market: String,
    pub currency: String,
    pub service_method: String,
    pub tags: BTreeMap<String, String>,
    pub version: String,
    #[serde(rename = "SourceOrganizationURI")]
    pub source_organization_uri: String,
    pub language_code: String,
    pub partners: BTreeMap<String, String>,
    pub new_user: bool,
    #[serde(rename = "metaData")]
    pub meta_data: BTreeMap<String, String>,
    pub amounts: BTreeMap<String, String>,
    pub business_date: String,
    pub estimated_wait_minutes: String,
    pub price_order_time: String,
    pub amount_breakdown: BTreeMap<String, String>,
    #[serde(rename = "StoreID")]
    pub store_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl OrderEnvelope {
    pub fn new(
        store_id: &str,
        address: &Address,
        products: &BTreeMap<String, u32>,
        customer: &Customer,
    ) -> Self {
        Self {
            address: address.clone(),
            coupons: Vec::new(),
            customer_id: String::new(),
            extension: String::new(),
            order_channel: "OLO".to_string(),
            order_id: String::new(),
            no_combine: true,
            order_method: "Web".to_string(),
            order_taker: None,
            payments: vec![Payment {
                kind: "Cash".to_string(),
            }],
            products: products
                .iter()
                .map(|(code, &qty)| ProductLine::new(code, qty))
                .collect(),
            market: String::new(),
            currency: String::new(),
            service_method: "Delivery".to_string(),
            tags: BTreeMap::new(),
            version: "1.0".to_string(),
            source_organization_uri: "order.dominos.com".to_string(),
            language_code: "en".to_string(),
            partners: BTreeMap::new(),
            new_user: true,
            meta_data: BTreeMap::new(),
            amounts: BTreeMap::new(),
            business_date: String::new(),
            estimated_wait_minutes: String::new(),
            price_order_time: String::new(),
            amount_breakdown: BTreeMap::new(),
            store_id: store_id.to_string(),
            email: customer.email.clone(),
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            phone: customer.phone.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Payment {
    #[serde(rename = "Type")]
    pub kind: String,
}

/// One product line. Every line is tagged with line-item id 1.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ProductLine {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "isNew")]
    pub is_new: bool,
    #[serde(rename = "Qty")]
    pub qty: u32,
    #[serde(rename = "AutoRemove")]
    pub auto_remove: bool,
}

impl ProductLine {
    fn new(code: &str, qty: u32) -> Self {
        Self {
            code: code.to_string(),
            id: 1,
            is_new: true,
            qty,
            auto_remove: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PriceOrderResponse {
    #[serde(deserialize_with = "int_from_number_or_string")]
    pub status: i64,
    #[serde(default)]
    pub order: PricedOrder,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct PricedOrder {
    #[serde(rename = "OrderID")]
    pub order_id: String,
    pub amounts_breakdown: AmountsBreakdown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct AmountsBreakdown {
    pub delivery_fee: Amount,
    pub tax: Amount,
    pub customer: Amount,
}

/// Accept `1`, `-1` or `"-1"` for an integer field.
fn int_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid integer status {s:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_record_tolerates_missing_wait_block() {
        let resp: StoreLocatorResponse =
            serde_json::from_str(r#"{"Stores":[{"StoreID":"9","IsDeliveryStore":true,"Phone":"x"}]}"#)
                .unwrap();
        assert_eq!(resp.stores.len(), 1);
        assert_eq!(resp.stores[0].store_id, "9");
        assert_eq!(resp.stores[0].service_method_estimated_wait_minutes.delivery.min, 0);
    }

    #[test]
    fn missing_stores_key_is_empty() {
        let resp: StoreLocatorResponse = serde_json::from_str(r#"{"Granularity":"Exact"}"#).unwrap();
        assert!(resp.stores.is_empty());
    }

    #[test]
    fn status_accepts_number_or_string() {
        let a: PriceOrderResponse = serde_json::from_str(r#"{"Status":-1}"#).unwrap();
        let b: PriceOrderResponse = serde_json::from_str(r#"{"Status":"1"}"#).unwrap();
        assert_eq!(a.status, -1);
        assert_eq!(b.status, 1);
        assert!(serde_json::from_str::<PriceOrderResponse>(r#"{"Status":"ok"}"#).is_err());
        assert!(serde_json::from_str::<PriceOrderResponse>(r#"{}"#).is_err());
    }

    #[test]
    fn envelope_fixed_fields() {
        let address = Address {
            street: "1 Main St".to_string(),
            city: "Town".to_string(),
            region: "MD".to_string(),
            postal_code: "00001".to_string(),
            kind: "House".to_string(),
        };
        let products = BTreeMap::from([("P14IRECZ".to_string(), 2)]);
        let customer = Customer {
            email: "foo@example.com".to_string(),
            ..Customer::default()
        };
        let body = serde_json::to_value(PriceOrderRequest {
            order: OrderEnvelope::new("4626", &address, &products, &customer),
        })
        .unwrap();
        let order = &body["Order"];

        assert_eq!(order["OrderChannel"], "OLO");
        assert_eq!(order["OrderMethod"], "Web");
        assert_eq!(order["NoCombine"], true);
        assert_eq!(order["OrderTaker"], serde_json::Value::Null);
        assert_eq!(order["Payments"], serde_json::json!([{"Type": "Cash"}]));
        assert_eq!(order["Coupons"], serde_json::json!([]));
        assert_eq!(order["metaData"], serde_json::json!({}));
        assert_eq!(order["SourceOrganizationURI"], "order.dominos.com");
        assert_eq!(order["StoreID"], "4626");
        assert_eq!(order["Email"], "foo@example.com");
        assert_eq!(order["Address"]["Street"], "1 Main St");
        assert_eq!(
            order["Products"],
            serde_json::json!([
                {"Code": "P14IRECZ", "ID": 1, "isNew": true, "Qty": 2, "AutoRemove": false}
            ])
        );
    }
}
