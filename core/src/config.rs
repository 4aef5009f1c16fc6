//! Construction-time configuration for `OrderingClient`.
//!
//! The core never reads the environment or files; an embedding application
//! deserializes `ClientConfig` from wherever it keeps settings.

use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::types::Customer;

/// Production endpoint of the ordering API.
pub const DEFAULT_BASE_URL: &str = "https://order.dominos.com/power/";

/// Referer the upstream requires before it answers any request.
pub const REFERER: &str = "https://order.dominos.com/en/pages/order/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Dump raw requests and responses at DEBUG level.
    pub debug: bool,
    pub customer: Customer,
}

impl ClientConfig {
    pub fn new(customer: Customer) -> Self {
        Self {
            customer,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Parse `base_url`, forcing a trailing `/` so relative request paths
    /// append to it instead of replacing its last segment.
    pub fn parsed_base_url(&self) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            debug: false,
            customer: Customer::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_production_endpoint() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(!config.debug);
    }

    #[test]
    fn trailing_slash_is_added() {
        let config = ClientConfig::default().with_base_url("http://localhost:3000/power");
        assert_eq!(
            config.parsed_base_url().unwrap().as_str(),
            "http://localhost:3000/power/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = ClientConfig::default().with_base_url("not a url");
        assert!(matches!(config.parsed_base_url(), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn deserializes_partial_config() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"debug":true,"customer":{"email":"a@b.c","first_name":"A","last_name":"B","phone":"1"}}"#,
        )
        .unwrap();
        assert!(config.debug);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.customer.first_name, "A");
    }
}
