#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use ticket_checkout::application::orchestrator::{CheckoutOrchestrator, Collaborators};
use ticket_checkout::config::{ApiSettings, CheckoutConfig, GatewaySettings};
use ticket_checkout::domain::charge::CardToken;
use ticket_checkout::domain::order::{Amount, Order, PaymentMode};
use ticket_checkout::domain::ports::{
    ApiClient, ApiClientRef, CardCheckout, CardTokenWidget, CardTokenWidgetRef, HostedCheckout,
    HostedCheckoutLauncher, WidgetFailure,
};
use ticket_checkout::error::TransportError;
use ticket_checkout::infrastructure::in_memory::{InMemoryNavigator, InMemoryNotifier};
use ticket_checkout::interfaces::console::PresetWidgets;
use tokio::sync::Notify;

pub const API_HOST: &str = "https://api.example.com";

pub fn order(identifier: &str, mode: PaymentMode) -> Order {
    Order::new(identifier, Amount::new(dec!(49.99)).unwrap(), "USD", mode).unwrap()
}

pub fn config() -> CheckoutConfig {
    CheckoutConfig::new(ApiSettings::new(API_HOST)).with_gateways(GatewaySettings {
        stripe_publishable_key: Some("pk_test_123".into()),
        omise_live_public: Some("pkey_live_123".into()),
        omise_test_public: Some("pkey_test_123".into()),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub path: String,
    pub body: Option<String>,
}

/// Answers each POST with the next queued response.
#[derive(Default)]
pub struct ScriptedApi {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl ScriptedApi {
    pub fn new(responses: Vec<Result<Value, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiClient for ScriptedApi {
    async fn post(&self, path: &str, body: Option<String>) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(ApiCall {
            path: path.to_string(),
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".into())))
    }
}

/// Pauses inside the call until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

pub struct GatedCardWidget {
    pub gate: Arc<Gate>,
    pub token: Option<String>,
}

#[async_trait]
impl CardTokenWidget for GatedCardWidget {
    async fn request_token(
        &self,
        _checkout: CardCheckout,
    ) -> Result<Option<CardToken>, WidgetFailure> {
        self.gate.pass().await;
        Ok(self.token.clone().map(|id| CardToken { id }))
    }
}

pub struct GatedApi {
    pub gate: Arc<Gate>,
    pub inner: Arc<ScriptedApi>,
}

#[async_trait]
impl ApiClient for GatedApi {
    async fn post(&self, path: &str, body: Option<String>) -> Result<Value, TransportError> {
        self.gate.pass().await;
        self.inner.post(path, body).await
    }
}

/// Records every launch; fails with `failure` when it is set.
#[derive(Default)]
pub struct RecordingLauncher {
    pub launched: Mutex<Vec<HostedCheckout>>,
    pub failure: Mutex<Option<String>>,
}

#[async_trait]
impl HostedCheckoutLauncher for RecordingLauncher {
    async fn launch(&self, checkout: HostedCheckout) -> Result<(), WidgetFailure> {
        self.launched.lock().unwrap().push(checkout);
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(WidgetFailure::new(message)),
            None => Ok(()),
        }
    }
}

pub struct Harness {
    pub orchestrator: Arc<CheckoutOrchestrator>,
    pub notifier: InMemoryNotifier,
    pub navigator: InMemoryNavigator,
    pub launcher: Arc<RecordingLauncher>,
}

pub fn harness(
    config: CheckoutConfig,
    api: ApiClientRef,
    card_widget: CardTokenWidgetRef,
    widgets: PresetWidgets,
) -> Harness {
    let notifier = InMemoryNotifier::new();
    let navigator = InMemoryNavigator::new();
    let launcher = Arc::new(RecordingLauncher::default());
    let orchestrator = CheckoutOrchestrator::new(
        config,
        Collaborators {
            api,
            notifier: Arc::new(notifier.clone()),
            navigator: Arc::new(navigator.clone()),
            card_widget,
            paypal_widget: Arc::new(widgets),
            hosted_checkout: launcher.clone(),
        },
    );
    Harness {
        orchestrator: Arc::new(orchestrator),
        notifier,
        navigator,
        launcher,
    }
}

/// Harness whose widgets answer immediately from `widgets`.
pub fn preset_harness(api: ApiClientRef, widgets: PresetWidgets) -> Harness {
    harness(config(), api, Arc::new(widgets.clone()), widgets)
}
