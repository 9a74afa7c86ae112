//! Runtime configuration for the checkout flow.
//!
//! The binary fills these structs from command-line flags and environment
//! variables; library users construct them directly.

use std::time::Duration;

/// Where the remote API lives and how requests to it are made.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    /// Base URL of the API host, e.g. `https://api.example.com`.
    pub host: String,
    /// Path prefix every API call is made under.
    pub namespace: String,
    /// Token sent as `Authorization: JWT <token>` when present.
    pub auth_token: Option<String>,
    /// Upper bound for a single request.
    pub timeout: Duration,
}

impl ApiSettings {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            namespace: "v1".to_string(),
            auth_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Joins `path` onto `{host}/{namespace}`, tolerating stray slashes on
    /// either side.
    pub fn url_for(&self, path: &str) -> String {
        let host = self.host.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let namespace = self.namespace.trim_matches('/');
        if namespace.is_empty() {
            format!("{}/{}", host, path)
        } else {
            format!("{}/{}/{}", host, namespace, path)
        }
    }

    /// Deep link to the hosted Omise checkout page for an order.
    pub fn omise_checkout_url(&self, order_identifier: &str) -> String {
        format!(
            "{}/v1/orders/{}/omise-checkout",
            self.host.trim_end_matches('/'),
            urlencoding::encode(order_identifier)
        )
    }
}

/// Public keys handed to the embedded payment widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewaySettings {
    pub stripe_publishable_key: Option<String>,
    pub omise_live_public: Option<String>,
    pub omise_test_public: Option<String>,
}

impl GatewaySettings {
    /// The live key wins; the test key is only used when no live key is set.
    pub fn omise_public_key(&self) -> Option<&str> {
        non_empty(self.omise_live_public.as_deref())
            .or_else(|| non_empty(self.omise_test_public.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// User-facing texts. Defaults are English; callers swap in translations.
#[derive(Debug, Clone, PartialEq)]
pub struct Messages {
    pub unexpected_error: String,
    pub payment_succeeded: String,
    pub payment_failed: String,
    pub card_form_description: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            unexpected_error: "An unexpected error has occurred".to_string(),
            payment_succeeded: "Payment has succeeded".to_string(),
            payment_failed: "Payment has failed".to_string(),
            card_form_description: "Please fill your card details to proceed".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutConfig {
    pub api: ApiSettings,
    pub gateways: GatewaySettings,
    pub messages: Messages,
}

impl CheckoutConfig {
    pub fn new(api: ApiSettings) -> Self {
        Self {
            api,
            gateways: GatewaySettings::default(),
            messages: Messages::default(),
        }
    }

    pub fn with_gateways(mut self, gateways: GatewaySettings) -> Self {
        self.gateways = gateways;
        self
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_handles_slashes() {
        let api = ApiSettings::new("https://api.example.com/");
        assert_eq!(
            api.url_for("/orders/abc/charge"),
            "https://api.example.com/v1/orders/abc/charge"
        );
        assert_eq!(
            api.url_for("create_source/abc"),
            "https://api.example.com/v1/create_source/abc"
        );
    }

    #[test]
    fn test_url_for_without_namespace() {
        let api = ApiSettings::new("http://localhost:5000").with_namespace("");
        assert_eq!(api.url_for("orders/x/charge"), "http://localhost:5000/orders/x/charge");
    }

    #[test]
    fn test_omise_checkout_url() {
        let api = ApiSettings::new("https://api.example.com");
        assert_eq!(
            api.omise_checkout_url("ord-1"),
            "https://api.example.com/v1/orders/ord-1/omise-checkout"
        );
        assert_eq!(
            api.omise_checkout_url("ord#1?x"),
            "https://api.example.com/v1/orders/ord%231%3Fx/omise-checkout"
        );
    }

    #[test]
    fn test_omise_key_prefers_live() {
        let mut gateways = GatewaySettings {
            omise_live_public: Some("pkey_live".into()),
            omise_test_public: Some("pkey_test".into()),
            ..Default::default()
        };
        assert_eq!(gateways.omise_public_key(), Some("pkey_live"));

        gateways.omise_live_public = Some("  ".into());
        assert_eq!(gateways.omise_public_key(), Some("pkey_test"));

        gateways.omise_test_public = None;
        assert_eq!(gateways.omise_public_key(), None);
    }
}
