//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every client
//! operation over real HTTP through the default `ureq` transport. Validates
//! that request building, transport, and response mapping agree with the
//! server's view of the upstream API.

use std::collections::BTreeMap;
use std::time::Duration;

use pizza_core::{
    Address, ApiError, ClientConfig, Customer, HttpMethod, OrderingClient, Transport,
    UreqTransport,
};

/// Start the mock server on a background runtime and return its base URL.
fn start_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/power/")
}

fn client(base_url: &str) -> OrderingClient {
    let config = ClientConfig::new(Customer {
        email: "foo@example.com".to_string(),
        first_name: "Dominos".to_string(),
        last_name: "Pizza".to_string(),
        phone: "443-554-6667".to_string(),
    })
    .with_base_url(base_url)
    .with_debug(true);
    OrderingClient::with_transport(&config, UreqTransport::with_timeout(Duration::from_secs(10)))
        .unwrap()
}

fn near_address() -> Address {
    Address {
        street: "747 W 40th St".to_string(),
        city: "Baltimore".to_string(),
        region: "MD".to_string(),
        postal_code: "21211".to_string(),
        kind: "House".to_string(),
    }
}

#[test]
fn order_flow() {
    let client = client(&start_mock_server());

    // Step 1: an address with only a carryout store nearby.
    let far = Address {
        street: "5905 Bonnie View Dr".to_string(),
        city: "Baltimore".to_string(),
        region: "MD".to_string(),
        postal_code: "21209".to_string(),
        kind: "Delivery".to_string(),
    };
    let stores = client.get_delivery_stores(&far).unwrap();
    assert!(stores.is_empty(), "expected no delivery stores");

    // Step 2: an address served by store 4626.
    let address = near_address();
    let stores = client.get_delivery_stores(&address).unwrap();
    assert_eq!(stores[0].id, "4626");
    assert_eq!(stores[0].delivery_minutes, 21);
    assert!(stores.iter().all(|s| s.id != "4630"), "carryout-only store leaked");

    // Step 3: menu.
    let items = client.get_menu_items(&stores[0].id).unwrap();
    assert!(!items.is_empty());
    assert!(items.iter().all(|item| item.price_cents >= 0));
    let pizza = items.iter().find(|item| item.code == "P14IRECZ").unwrap();
    assert_eq!(pizza.price_cents, 1799);

    // Step 4: price a single pizza.
    let products = BTreeMap::from([("P14IRECZ".to_string(), 1)]);
    let price = client.price_order("4626", &address, &products).unwrap();
    assert_eq!(price.delivery_cents, 299);
    assert_eq!(price.tax_cents, 108);
    assert_eq!(price.customer_cents, 2206);
    assert!(!price.id.is_empty());

    // Step 5: a product the store does not sell.
    let products = BTreeMap::from([("NOPE".to_string(), 1)]);
    let err = client.price_order("4626", &address, &products).unwrap_err();
    assert!(matches!(err, ApiError::OrderRejected));
}

#[test]
fn missing_referer_surfaces_as_decode_error() {
    let base = start_mock_server();
    let client = client(&base);

    // Send the client's own request minus the Referer header.
    let mut request = client.api().build_menu_items("4626").unwrap();
    request.headers.retain(|(name, _)| !name.eq_ignore_ascii_case("referer"));
    let response = UreqTransport::new().execute(&request).unwrap();
    assert_eq!(response.status, 403);

    let err = client.api().parse_menu_items(response).unwrap_err();
    assert!(matches!(err, ApiError::DecodeError(_)));
}

#[test]
fn requests_resolve_under_base_path() {
    let base = start_mock_server();
    let client = client(&base);

    let request = client.api().build_price_order("4626", &near_address(), &BTreeMap::new()).unwrap();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, format!("{base}price-order"));

    // An empty order is declined rather than priced.
    let err = client.price_order("4626", &near_address(), &BTreeMap::new()).unwrap_err();
    assert!(matches!(err, ApiError::OrderRejected));
}

#[test]
fn unreachable_server_is_transport_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = client(&format!("http://127.0.0.1:{port}/power/"));
    let err = client.get_menu_items("4626").unwrap_err();
    assert!(matches!(err, ApiError::TransportError(_)));
}
