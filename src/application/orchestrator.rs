use super::attempts::{AttemptGuard, AttemptTracker, CheckoutAttempt, CheckoutState};
use crate::config::CheckoutConfig;
use crate::domain::charge::{ChargeRequest, ChargeResult, charge_path};
use crate::domain::gateway::{ChargeStep, GatewayAdapter, GatewayContext, PaymentForm};
use crate::domain::order::Order;
use crate::domain::ports::{
    ApiClientRef, CardTokenWidgetRef, HostedCheckoutLauncherRef, NavigatorRef, NotifierRef,
    PaypalWidgetRef,
};
use crate::error::{CheckoutError, Result};
use tracing::{debug, info, instrument, warn};

/// Everything the orchestrator talks to, injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub api: ApiClientRef,
    pub notifier: NotifierRef,
    pub navigator: NavigatorRef,
    pub card_widget: CardTokenWidgetRef,
    pub paypal_widget: PaypalWidgetRef,
    pub hosted_checkout: HostedCheckoutLauncherRef,
}

/// How a checkout action ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The charge went through and the user was sent to the confirmation view.
    Succeeded(ChargeResult),
    /// The attempt failed; the user has been notified unless the error is
    /// silent.
    Failed(CheckoutError),
    /// The payment widget was dismissed. Nothing was charged or shown.
    Cancelled,
    /// The hosted checkout page took over. Its verdict is not observed here.
    Redirected { checkout_url: String },
    /// Another attempt for the same order was still running; this action was
    /// ignored.
    AlreadyInFlight,
}

impl CheckoutOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckoutOutcome::Succeeded(_))
    }
}

enum Settlement {
    Charged(ChargeResult),
    HandedOff { checkout_url: String },
}

/// Drives one order through its gateway's flow and reconciles the result.
///
/// The orchestrator never branches on provider identity beyond picking the
/// [`GatewayAdapter`]; it only cares whether authorization must be followed by
/// a charge call.
pub struct CheckoutOrchestrator {
    config: CheckoutConfig,
    context: GatewayContext,
    notifier: NotifierRef,
    navigator: NavigatorRef,
    attempts: AttemptTracker,
}

impl CheckoutOrchestrator {
    /// Creates a new `CheckoutOrchestrator` with no attempts tracked.
    ///
    /// # Arguments
    ///
    /// * `config` - API location, gateway keys and user-facing messages.
    /// * `collaborators` - The API client, notifier, navigator and payment
    ///   widgets the flow talks to.
    pub fn new(config: CheckoutConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            api,
            notifier,
            navigator,
            card_widget,
            paypal_widget,
            hosted_checkout,
        } = collaborators;
        Self {
            config,
            context: GatewayContext {
                api,
                card_widget,
                paypal_widget,
                hosted_checkout,
            },
            notifier,
            navigator,
            attempts: AttemptTracker::new(),
        }
    }

    /// True while an attempt for the order is authorizing or charging.
    pub fn is_busy(&self, order_identifier: &str) -> bool {
        self.attempts.is_busy(order_identifier)
    }

    /// Current state for the order; `Idle` when no attempt is tracked.
    pub fn state(&self, order_identifier: &str) -> CheckoutState {
        self.attempts.state(order_identifier)
    }

    /// The tracked attempt, if any. Settled attempts stay readable until
    /// [`take_attempt`](Self::take_attempt) collects them.
    pub fn attempt(&self, order_identifier: &str) -> Option<CheckoutAttempt> {
        self.attempts.get(order_identifier)
    }

    /// Collects a settled attempt, forgetting the order. Returns `None` while
    /// the attempt is still running.
    pub fn take_attempt(&self, order_identifier: &str) -> Option<CheckoutAttempt> {
        self.attempts.take(order_identifier)
    }

    /// The payment UI to show for the order's active gateway.
    pub fn payment_form(&self, order: &Order) -> Result<PaymentForm> {
        GatewayAdapter::for_order(order, &self.config.api, &self.config.gateways)?
            .describe_ui(order, &self.config.messages)
    }

    /// Runs a full checkout for `order`.
    ///
    /// A second call for the same order while the first is still authorizing
    /// or charging is ignored with [`CheckoutOutcome::AlreadyInFlight`].
    ///
    /// # Arguments
    ///
    /// * `order` - The order to pay for. Its payment mode picks the gateway.
    ///
    /// Never returns an error: every failure ends in a terminal outcome with
    /// the busy flag cleared.
    #[instrument(skip_all, fields(order = %order.identifier, mode = %order.payment_mode))]
    pub async fn checkout(&self, order: &Order) -> CheckoutOutcome {
        let guard = match self.attempts.begin(order) {
            Ok(guard) => guard,
            Err(err) => {
                info!(error = %err, "ignoring checkout action");
                return CheckoutOutcome::AlreadyInFlight;
            }
        };
        info!("checkout started");

        let result = self.authorize_and_charge(order, &guard).await;
        self.settle(order, guard, result).await
    }

    async fn authorize_and_charge(&self, order: &Order, guard: &AttemptGuard) -> Result<Settlement> {
        order.validate()?;
        let adapter = GatewayAdapter::for_order(order, &self.config.api, &self.config.gateways)?;
        let authorization = adapter
            .obtain_authorization(order, &self.config.messages, &self.context)
            .await?;

        match adapter.build_charge_request(authorization, &self.config.messages)? {
            ChargeStep::Submit(request) => {
                guard.start_charging();
                let result = self.charge(order, &request).await?;
                Ok(Settlement::Charged(result))
            }
            ChargeStep::Settled(result) => Ok(Settlement::Charged(result)),
            ChargeStep::HandedOff { checkout_url } => Ok(Settlement::HandedOff { checkout_url }),
        }
    }

    async fn charge(&self, order: &Order, request: &ChargeRequest) -> Result<ChargeResult> {
        let path = charge_path(&order.identifier);
        let body = request.to_body()?;
        debug!(%path, "submitting charge");
        let response = self.context.api.post(&path, Some(body)).await?;
        let messages = &self.config.messages;
        Ok(ChargeResult::from_charge_response(
            response,
            &messages.payment_succeeded,
            &messages.payment_failed,
        )?)
    }

    /// Moves the attempt to its terminal state, then fires the side effects.
    async fn settle(
        &self,
        order: &Order,
        guard: AttemptGuard,
        result: Result<Settlement>,
    ) -> CheckoutOutcome {
        match result {
            Ok(Settlement::Charged(charge)) if charge.succeeded => {
                guard.succeed();
                info!(message = %charge.message, "checkout succeeded");
                self.notifier.success(&charge.message).await;
                self.navigator
                    .go_to_order_confirmation(&order.identifier)
                    .await;
                CheckoutOutcome::Succeeded(charge)
            }
            Ok(Settlement::Charged(charge)) => {
                self.fail(guard, CheckoutError::GatewayRejected(charge.message))
                    .await
            }
            Ok(Settlement::HandedOff { checkout_url }) => {
                guard.reset();
                info!(%checkout_url, "handed off to hosted checkout");
                CheckoutOutcome::Redirected { checkout_url }
            }
            Err(CheckoutError::UserCancelled) => {
                guard.reset();
                info!("payment widget dismissed");
                CheckoutOutcome::Cancelled
            }
            Err(err) => self.fail(guard, err).await,
        }
    }

    async fn fail(&self, guard: AttemptGuard, err: CheckoutError) -> CheckoutOutcome {
        guard.fail(&err);
        match &err {
            CheckoutError::GatewayRejected(_) | CheckoutError::WidgetError(_) => {
                info!(error = %err, "checkout failed")
            }
            _ => warn!(error = %err, "checkout failed unexpectedly"),
        }
        if let Some(message) = err.user_message(&self.config.messages) {
            self.notifier.error(&message).await;
        }
        CheckoutOutcome::Failed(err)
    }
}
