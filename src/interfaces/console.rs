//! Console stand-ins for the browser collaborators.
//!
//! Notifications and navigation are printed; widget answers are fixed up
//! front from command-line flags.

use crate::domain::charge::{CardToken, PaypalApproval};
use crate::domain::ports::{
    CardCheckout, CardTokenWidget, HostedCheckout, HostedCheckoutLauncher, Navigator, Notifier,
    PaypalCheckout, PaypalWidget, WidgetFailure,
};
use async_trait::async_trait;

/// Prints `success: ...` to stdout and `error: ...` to stderr.
#[derive(Default, Clone, Copy)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn success(&self, message: &str) {
        println!("success: {}", message);
    }

    async fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}

#[derive(Default, Clone, Copy)]
pub struct ConsoleNavigator;

#[async_trait]
impl Navigator for ConsoleNavigator {
    async fn go_to_order_confirmation(&self, identifier: &str) {
        println!("navigate: orders/{}/view", identifier);
    }
}

/// Prints the hosted checkout URL for the user to open.
#[derive(Default, Clone, Copy)]
pub struct ConsoleHostedCheckout;

#[async_trait]
impl HostedCheckoutLauncher for ConsoleHostedCheckout {
    async fn launch(&self, checkout: HostedCheckout) -> Result<(), WidgetFailure> {
        println!("redirect: {}", checkout.checkout_url);
        Ok(())
    }
}

/// Widgets whose answers are decided before checkout starts.
///
/// With no token or approval configured the widget behaves as if the user
/// closed it.
#[derive(Debug, Default, Clone)]
pub struct PresetWidgets {
    pub card_token: Option<String>,
    pub paypal_approval: Option<PaypalApproval>,
    pub failure: Option<String>,
}

#[async_trait]
impl CardTokenWidget for PresetWidgets {
    async fn request_token(&self, _checkout: CardCheckout) -> Result<Option<CardToken>, WidgetFailure> {
        if let Some(message) = &self.failure {
            return Err(WidgetFailure::new(message.clone()));
        }
        Ok(self.card_token.clone().map(|id| CardToken { id }))
    }
}

#[async_trait]
impl PaypalWidget for PresetWidgets {
    async fn approve(&self, _checkout: PaypalCheckout) -> Result<Option<PaypalApproval>, WidgetFailure> {
        if let Some(message) = &self.failure {
            return Err(WidgetFailure::new(message.clone()));
        }
        Ok(self.paypal_approval.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_checkout() -> CardCheckout {
        CardCheckout {
            order_identifier: "ord-1".into(),
            publishable_key: None,
            amount_minor: 100,
            currency: "USD".into(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_preset_widget_without_token_is_dismissed() {
        let widgets = PresetWidgets::default();
        assert_eq!(widgets.request_token(card_checkout()).await, Ok(None));
    }

    #[tokio::test]
    async fn test_preset_widget_failure_wins() {
        let widgets = PresetWidgets {
            card_token: Some("tok".into()),
            failure: Some("Your card number is incorrect.".into()),
            ..Default::default()
        };
        assert_eq!(
            widgets.request_token(card_checkout()).await,
            Err(WidgetFailure::new("Your card number is incorrect."))
        );
    }
}
