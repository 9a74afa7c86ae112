//! Per-provider payment flows behind one interface.
//!
//! The providers fall into two protocol shapes. Stripe and PayPal authorize in
//! the browser and then need a charge call; Omise and AliPay are finalized by
//! the server, so authorizing is already the end of the client's work.

use super::charge::{
    CardToken, ChargeRequest, ChargeResult, PaypalApproval, SourceResponse, create_source_path,
};
use super::order::{Order, PaymentMode};
use super::ports::{
    ApiClientRef, CardCheckout, CardTokenWidgetRef, HostedCheckout, HostedCheckoutLauncherRef,
    PaypalCheckout, PaypalWidgetRef,
};
use crate::config::{ApiSettings, GatewaySettings, Messages};
use crate::error::{CheckoutError, Result};
use tracing::debug;

/// Collaborators the adapters may call while authorizing.
#[derive(Clone)]
pub struct GatewayContext {
    pub api: ApiClientRef,
    pub card_widget: CardTokenWidgetRef,
    pub paypal_widget: PaypalWidgetRef,
    pub hosted_checkout: HostedCheckoutLauncherRef,
}

/// The UI to render for the active gateway. Being an enum, it cannot describe
/// affordances of two gateways at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentForm {
    CardForm {
        publishable_key: Option<String>,
        amount_minor: i64,
        currency: String,
        description: String,
    },
    PaypalButton {
        amount_minor: i64,
        currency: String,
    },
    HostedCheckoutForm {
        action: String,
        public_key: String,
        amount_minor: i64,
        currency: String,
    },
    AliPayButton {
        order_identifier: String,
    },
}

impl PaymentForm {
    pub fn payment_mode(&self) -> PaymentMode {
        match self {
            PaymentForm::CardForm { .. } => PaymentMode::Stripe,
            PaymentForm::PaypalButton { .. } => PaymentMode::Paypal,
            PaymentForm::HostedCheckoutForm { .. } => PaymentMode::Omise,
            PaymentForm::AliPayButton { .. } => PaymentMode::AliPay,
        }
    }
}

/// Proof that the payer approved the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Card(CardToken),
    Paypal(PaypalApproval),
    /// The hosted page was opened; it charges the order on its own.
    HostedCheckoutLaunched { checkout_url: String },
    /// The remote side created the source and already settled the charge.
    SourceCreated(SourceResponse),
}

/// What the orchestrator does after authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeStep {
    Submit(ChargeRequest),
    Settled(ChargeResult),
    HandedOff { checkout_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayAdapter {
    Stripe { publishable_key: Option<String> },
    Paypal,
    Omise { checkout_url: String, public_key: String },
    AliPay { order_identifier: String },
}

impl GatewayAdapter {
    /// Picks the adapter for the order's payment mode.
    ///
    /// # Arguments
    ///
    /// * `order` - The order being paid; only its mode and identifier are read.
    /// * `api` - Used to build the hosted Omise checkout link.
    /// * `gateways` - Public keys handed to the provider widgets.
    ///
    /// Omise without a live or test public key is a
    /// [`CheckoutError::ConfigurationError`].
    pub fn for_order(
        order: &Order,
        api: &ApiSettings,
        gateways: &GatewaySettings,
    ) -> Result<Self> {
        let adapter = match order.payment_mode {
            PaymentMode::Stripe => GatewayAdapter::Stripe {
                publishable_key: gateways.stripe_publishable_key.clone(),
            },
            PaymentMode::Paypal => GatewayAdapter::Paypal,
            PaymentMode::Omise => {
                let public_key = gateways.omise_public_key().ok_or_else(|| {
                    CheckoutError::ConfigurationError(
                        "No Omise public key configured (live or test)".to_string(),
                    )
                })?;
                GatewayAdapter::Omise {
                    checkout_url: api.omise_checkout_url(&order.identifier),
                    public_key: public_key.to_string(),
                }
            }
            PaymentMode::AliPay => GatewayAdapter::AliPay {
                order_identifier: order.identifier.clone(),
            },
        };
        Ok(adapter)
    }

    pub fn payment_mode(&self) -> PaymentMode {
        match self {
            GatewayAdapter::Stripe { .. } => PaymentMode::Stripe,
            GatewayAdapter::Paypal => PaymentMode::Paypal,
            GatewayAdapter::Omise { .. } => PaymentMode::Omise,
            GatewayAdapter::AliPay { .. } => PaymentMode::AliPay,
        }
    }

    /// True when authorization must be followed by a charge call.
    pub fn requires_charge_call(&self) -> bool {
        matches!(self, GatewayAdapter::Stripe { .. } | GatewayAdapter::Paypal)
    }

    pub fn describe_ui(&self, order: &Order, messages: &Messages) -> Result<PaymentForm> {
        let form = match self {
            GatewayAdapter::Stripe { publishable_key } => PaymentForm::CardForm {
                publishable_key: publishable_key.clone(),
                amount_minor: order.amount_in_minor_units()?,
                currency: order.currency.clone(),
                description: messages.card_form_description.clone(),
            },
            GatewayAdapter::Paypal => PaymentForm::PaypalButton {
                amount_minor: order.amount_in_minor_units()?,
                currency: order.currency.clone(),
            },
            GatewayAdapter::Omise {
                checkout_url,
                public_key,
            } => PaymentForm::HostedCheckoutForm {
                action: checkout_url.clone(),
                public_key: public_key.clone(),
                amount_minor: order.amount_in_minor_units()?,
                currency: order.currency.clone(),
            },
            GatewayAdapter::AliPay { order_identifier } => PaymentForm::AliPayButton {
                order_identifier: order_identifier.clone(),
            },
        };
        Ok(form)
    }

    /// Runs the provider's client-side step. A dismissed widget is reported as
    /// [`CheckoutError::UserCancelled`], a widget complaint as
    /// [`CheckoutError::WidgetError`].
    pub async fn obtain_authorization(
        &self,
        order: &Order,
        messages: &Messages,
        context: &GatewayContext,
    ) -> Result<Authorization> {
        match self {
            GatewayAdapter::Stripe { publishable_key } => {
                let checkout = CardCheckout {
                    order_identifier: order.identifier.clone(),
                    publishable_key: publishable_key.clone(),
                    amount_minor: order.amount_in_minor_units()?,
                    currency: order.currency.clone(),
                    description: messages.card_form_description.clone(),
                };
                match context.card_widget.request_token(checkout).await {
                    Ok(Some(token)) => Ok(Authorization::Card(token)),
                    Ok(None) => Err(CheckoutError::UserCancelled),
                    Err(failure) => Err(CheckoutError::WidgetError(failure.message)),
                }
            }
            GatewayAdapter::Paypal => {
                let checkout = PaypalCheckout {
                    order_identifier: order.identifier.clone(),
                    amount_minor: order.amount_in_minor_units()?,
                    currency: order.currency.clone(),
                };
                match context.paypal_widget.approve(checkout).await {
                    Ok(Some(approval)) => Ok(Authorization::Paypal(approval)),
                    Ok(None) => Err(CheckoutError::UserCancelled),
                    Err(failure) => Err(CheckoutError::WidgetError(failure.message)),
                }
            }
            GatewayAdapter::Omise {
                checkout_url,
                public_key,
            } => {
                let checkout = HostedCheckout {
                    checkout_url: checkout_url.clone(),
                    public_key: public_key.clone(),
                    amount_minor: order.amount_in_minor_units()?,
                    currency: order.currency.clone(),
                };
                context
                    .hosted_checkout
                    .launch(checkout)
                    .await
                    .map_err(|failure| CheckoutError::WidgetError(failure.message))?;
                Ok(Authorization::HostedCheckoutLaunched {
                    checkout_url: checkout_url.clone(),
                })
            }
            GatewayAdapter::AliPay { order_identifier } => {
                let path = create_source_path(order_identifier);
                debug!(%path, "creating payment source");
                let body = context.api.post(&path, None).await?;
                Ok(Authorization::SourceCreated(SourceResponse::from_value(
                    body,
                )?))
            }
        }
    }

    pub fn build_charge_request(
        &self,
        authorization: Authorization,
        messages: &Messages,
    ) -> Result<ChargeStep> {
        match (self, authorization) {
            (GatewayAdapter::Stripe { .. }, Authorization::Card(token)) => {
                Ok(ChargeStep::Submit(ChargeRequest::stripe(token)))
            }
            (GatewayAdapter::Paypal, Authorization::Paypal(approval)) => {
                Ok(ChargeStep::Submit(ChargeRequest::paypal(approval)))
            }
            (
                GatewayAdapter::Omise { .. },
                Authorization::HostedCheckoutLaunched { checkout_url },
            ) => Ok(ChargeStep::HandedOff { checkout_url }),
            (GatewayAdapter::AliPay { .. }, Authorization::SourceCreated(source)) => {
                let message = if source.status {
                    &messages.payment_succeeded
                } else {
                    &messages.payment_failed
                };
                Ok(ChargeStep::Settled(ChargeResult::new(
                    source.status,
                    message.clone(),
                )))
            }
            (adapter, authorization) => Err(CheckoutError::ValidationError(format!(
                "{:?} cannot be used with the {} gateway",
                authorization,
                adapter.payment_mode()
            ))),
        }
    }
}
