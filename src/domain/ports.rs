use super::charge::{CardToken, PaypalApproval};
use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// A client-side failure reported by a payment widget, e.g. an invalid card
/// number. The message is the widget's own and is shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct WidgetFailure {
    pub message: String,
}

impl WidgetFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What the card-entry widget is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardCheckout {
    pub order_identifier: String,
    pub publishable_key: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaypalCheckout {
    pub order_identifier: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// The hosted page the browser is sent to for server-finalized payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedCheckout {
    pub checkout_url: String,
    pub public_key: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Remote API transport. One request, one response, no retries.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// POSTs `body` verbatim (no payload transformation) and returns the
    /// decoded JSON response.
    async fn post(&self, path: &str, body: Option<String>) -> Result<Value, TransportError>;
}

/// Fire-and-forget user notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn success(&self, message: &str);
    async fn error(&self, message: &str);
}

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn go_to_order_confirmation(&self, identifier: &str);
}

/// Embedded card form that issues a token.
#[async_trait]
pub trait CardTokenWidget: Send + Sync {
    /// Resolves to `Ok(None)` when the user dismisses the widget.
    async fn request_token(
        &self,
        checkout: CardCheckout,
    ) -> Result<Option<CardToken>, WidgetFailure>;
}

/// Redirect-based wallet approval.
#[async_trait]
pub trait PaypalWidget: Send + Sync {
    /// Resolves to `Ok(None)` when the user abandons the approval.
    async fn approve(
        &self,
        checkout: PaypalCheckout,
    ) -> Result<Option<PaypalApproval>, WidgetFailure>;
}

/// Opens a hosted checkout page. Once launched the page is outside our
/// control.
#[async_trait]
pub trait HostedCheckoutLauncher: Send + Sync {
    async fn launch(&self, checkout: HostedCheckout) -> Result<(), WidgetFailure>;
}

pub type ApiClientRef = Arc<dyn ApiClient>;
pub type NotifierRef = Arc<dyn Notifier>;
pub type NavigatorRef = Arc<dyn Navigator>;
pub type CardTokenWidgetRef = Arc<dyn CardTokenWidget>;
pub type PaypalWidgetRef = Arc<dyn PaypalWidget>;
pub type HostedCheckoutLauncherRef = Arc<dyn HostedCheckoutLauncher>;
