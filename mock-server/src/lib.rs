use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, RawQuery, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, warn};
use uuid::Uuid;

/// The upstream refuses requests that do not come from its order page.
pub const REQUIRED_REFERER: &str = "https://order.dominos.com/en/pages/order/";

const DELIVERY_FEE_CENTS: i64 = 299;
const TAX_PERCENT: i64 = 6;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoreRecord {
    #[serde(rename = "StoreID")]
    pub store_id: String,
    pub is_delivery_store: bool,
    pub service_method_estimated_wait_minutes: ServiceMethodWait,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceMethodWait {
    pub delivery: WaitRange,
    pub carryout: WaitRange,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WaitRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Variant {
    pub code: String,
    pub name: String,
    pub price: String,
    pub product_code: String,
}

#[derive(Deserialize)]
pub struct PriceOrderRequest {
    #[serde(rename = "Order")]
    pub order: OrderInput,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderInput {
    #[serde(rename = "StoreID")]
    pub store_id: String,
    #[serde(default)]
    pub products: Vec<ProductInput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductInput {
    pub code: String,
    pub qty: i64,
}

/// Fixture data served by the mock: store lists keyed by lowercased street,
/// and menus keyed by store id.
pub struct Catalog {
    locator: BTreeMap<String, Vec<StoreRecord>>,
    menus: BTreeMap<String, BTreeMap<String, Variant>>,
}

pub type Db = Arc<Catalog>;

impl Catalog {
    pub fn fixtures() -> Self {
        let carryout_only = store("4630", false, 0, 0);
        let mut locator = BTreeMap::new();
        locator.insert(
            "747 w 40th st".to_string(),
            vec![
                carryout_only.clone(),
                store("4626", true, 21, 31),
                store("4631", true, 35, 45),
            ],
        );
        locator.insert("5905 bonnie view dr".to_string(), vec![carryout_only]);

        let mut menus = BTreeMap::new();
        menus.insert(
            "4626".to_string(),
            menu(&[
                ("14SCREEN", "Large (14\") Hand Tossed Pizza", "13.99", "S_PIZZA"),
                ("P14IRECZ", "Large (14\") Brooklyn ExtravaganZZa", "17.99", "S_ZZ"),
                ("W08PHOTW", "8 Piece Hot Wings", "8.99", "S_HOTWINGS"),
                ("2LCOKE", "2-Liter Coke", "3.29", "F_COKE"),
            ]),
        );
        menus.insert(
            "4630".to_string(),
            menu(&[
                ("12SCREEN", "Medium (12\") Hand Tossed Pizza", "11.99", "S_PIZZA"),
                ("14SCREEN", "Large (14\") Hand Tossed Pizza", "13.99", "S_PIZZA"),
            ]),
        );
        menus.insert(
            "4631".to_string(),
            menu(&[("14SCREEN", "Large (14\") Hand Tossed Pizza", "14.49", "S_PIZZA")]),
        );

        Self { locator, menus }
    }

    pub fn stores_near(&self, street: &str) -> Vec<StoreRecord> {
        self.locator
            .get(&street.trim().to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    pub fn menu(&self, store_id: &str) -> BTreeMap<String, Variant> {
        self.menus.get(store_id).cloned().unwrap_or_default()
    }

    /// Food subtotal in cents, or `None` when the store or any line is
    /// unknown, the order is empty, or the total overflows.
    pub fn food_cents(&self, order: &OrderInput) -> Option<i64> {
        let menu = self.menus.get(&order.store_id)?;
        if order.products.is_empty() {
            return None;
        }
        let mut total: i64 = 0;
        for line in &order.products {
            if line.qty <= 0 {
                return None;
            }
            let variant = menu.get(&line.code)?;
            let line_cents = price_cents(&variant.price)?.checked_mul(line.qty)?;
            total = line_cents.checked_add(total)?;
        }
        Some(total)
    }
}

fn store(id: &str, delivers: bool, min: u32, max: u32) -> StoreRecord {
    StoreRecord {
        store_id: id.to_string(),
        is_delivery_store: delivers,
        service_method_estimated_wait_minutes: ServiceMethodWait {
            delivery: WaitRange { min, max },
            carryout: WaitRange { min: 10, max: 15 },
        },
    }
}

fn menu(items: &[(&str, &str, &str, &str)]) -> BTreeMap<String, Variant> {
    items
        .iter()
        .map(|&(code, name, price, product)| {
            (
                code.to_string(),
                Variant {
                    code: code.to_string(),
                    name: name.to_string(),
                    price: price.to_string(),
                    product_code: product.to_string(),
                },
            )
        })
        .collect()
}

fn price_cents(price: &str) -> Option<i64> {
    price.replacen('.', "", 1).parse().ok()
}

fn dollars(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

pub fn app() -> Router {
    let db: Db = Arc::new(Catalog::fixtures());
    let power = Router::new()
        .route("/store-locator", get(store_locator))
        .route("/store/{id}/menu", get(store_menu))
        .route("/price-order", post(price_order))
        .layer(middleware::from_fn(require_referer))
        .with_state(db);
    Router::new().nest("/power", power)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_referer(request: Request, next: Next) -> Response {
    let referer = request
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok());
    if referer == Some(REQUIRED_REFERER) {
        return next.run(request).await;
    }
    warn!(uri = %request.uri(), "rejecting request without order-page referer");
    (StatusCode::FORBIDDEN, "Access Denied").into_response()
}

async fn store_locator(State(db): State<Db>, RawQuery(query): RawQuery) -> Json<serde_json::Value> {
    let query = query.unwrap_or_default();
    let mut streets = Vec::new();
    let mut city = String::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "s" => streets.push(value.into_owned()),
            "c" => city = value.into_owned(),
            _ => {}
        }
    }
    // The first `s` is the street; later ones are service-method filters.
    let stores = streets
        .first()
        .map(|street| db.stores_near(street))
        .unwrap_or_default();
    debug!(?streets, %city, found = stores.len(), "store-locator");
    Json(json!({
        "Granularity": "Exact",
        "Address": { "Street": streets.first(), "City": city },
        "Stores": stores,
    }))
}

async fn store_menu(State(db): State<Db>, Path(id): Path<String>) -> Json<serde_json::Value> {
    Json(json!({
        "Misc": { "StoreID": id, "Status": 0 },
        "Variants": db.menu(&id),
    }))
}

async fn price_order(
    State(db): State<Db>,
    Json(input): Json<PriceOrderRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let order = input.order;
    let Some(food) = db.food_cents(&order) else {
        debug!(store_id = %order.store_id, "declining order");
        return (
            StatusCode::OK,
            Json(json!({
                "Status": -1,
                "Order": { "OrderID": "", "AmountsBreakdown": {} },
                "StatusItems": [{ "Code": "Failure" }],
            })),
        );
    };
    let tax = (food * TAX_PERCENT + 50) / 100;
    let customer = food + DELIVERY_FEE_CENTS + tax;
    let order_id = Uuid::new_v4().simple().to_string();
    debug!(store_id = %order.store_id, %order_id, customer, "priced order");
    (
        StatusCode::OK,
        Json(json!({
            "Status": 1,
            "Order": {
                "OrderID": order_id,
                "StoreID": order.store_id,
                "AmountsBreakdown": {
                    "FoodAndBeverage": dollars(food),
                    "DeliveryFee": dollars(DELIVERY_FEE_CENTS),
                    "Tax": customer_number(tax),
                    "Customer": customer_number(customer),
                },
            },
            "StatusItems": [{ "Code": "PriceInformationRemoved" }],
        })),
    )
}

/// The upstream sends some totals as JSON numbers rather than strings.
fn customer_number(cents: i64) -> serde_json::Value {
    json!(cents as f64 / 100.0)
}
