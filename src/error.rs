use crate::config::Messages;
use thiserror::Error;

/// Failures raised while talking to the remote API.
///
/// The text of these errors is meant for logs only; users are shown the
/// generic message from [`Messages::unexpected_error`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed response body: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    #[error("Payment widget dismissed by the user")]
    UserCancelled,
    #[error("Payment widget error: {0}")]
    WidgetError(String),
    #[error("Payment rejected by gateway: {0}")]
    GatewayRejected(String),
    #[error("Transport fault: {0}")]
    TransportFault(#[from] TransportError),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("A checkout attempt is already in flight for order {0}")]
    AttemptInFlight(String),
}

impl CheckoutError {
    /// Text shown to the user for this failure, or `None` when the failure is
    /// silent (a dismissed widget).
    pub fn user_message(&self, messages: &Messages) -> Option<String> {
        match self {
            CheckoutError::UserCancelled | CheckoutError::AttemptInFlight(_) => None,
            CheckoutError::WidgetError(message) | CheckoutError::GatewayRejected(message) => {
                Some(message.clone())
            }
            CheckoutError::TransportFault(_)
            | CheckoutError::ValidationError(_)
            | CheckoutError::ConfigurationError(_) => Some(messages.unexpected_error.clone()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_fault_hides_raw_error() {
        let messages = Messages::default();
        let err = CheckoutError::from(TransportError::Network("connection refused".into()));
        let shown = err.user_message(&messages).unwrap();
        assert_eq!(shown, "An unexpected error has occurred");
        assert!(!shown.contains("refused"));
    }

    #[test]
    fn test_gateway_message_is_shown_verbatim() {
        let messages = Messages::default();
        let err = CheckoutError::GatewayRejected("Card declined".into());
        assert_eq!(err.user_message(&messages).as_deref(), Some("Card declined"));
    }

    #[test]
    fn test_cancellation_is_silent() {
        let messages = Messages::default();
        assert_eq!(CheckoutError::UserCancelled.user_message(&messages), None);
    }
}
