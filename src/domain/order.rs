use crate::error::CheckoutError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies whose smallest unit is the major unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "MGA", "PYG", "RWF", "UGX", "VND",
    "VUV", "XAF", "XOF", "XPF",
];

/// The price of an order.
///
/// Wraps `rust_decimal::Decimal` so that the amount can never be negative once
/// it has been constructed or deserialized.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, CheckoutError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CheckoutError::ValidationError(
                "Amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The amount expressed in the currency's smallest unit, as the card
    /// widgets expect it (cents for USD, yen for JPY).
    pub fn minor_units(&self, currency: &str) -> Result<i64, CheckoutError> {
        let exponent = if is_zero_decimal(currency) { 0 } else { 2 };
        self.0
            .checked_mul(Decimal::from(10i64.pow(exponent)))
            .map(|v| v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|v| v.to_i64())
            .ok_or_else(|| {
                CheckoutError::ValidationError(format!(
                    "Amount {} {} does not fit in minor units",
                    self.0, currency
                ))
            })
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CheckoutError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

fn is_zero_decimal(currency: &str) -> bool {
    ZERO_DECIMAL_CURRENCIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(currency))
}

/// The payment provider selected for an order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Stripe,
    Paypal,
    Omise,
    AliPay,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Stripe => "stripe",
            PaymentMode::Paypal => "paypal",
            PaymentMode::Omise => "omise",
            PaymentMode::AliPay => "alipay",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stripe" => Ok(PaymentMode::Stripe),
            "paypal" => Ok(PaymentMode::Paypal),
            "omise" => Ok(PaymentMode::Omise),
            "alipay" => Ok(PaymentMode::AliPay),
            other => Err(CheckoutError::ValidationError(format!(
                "Unknown payment mode: {}",
                other
            ))),
        }
    }
}

/// The order being paid for.
///
/// Owned by the surrounding application; checkout only ever reads it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    /// Server-assigned, stable identifier used in every API path.
    pub identifier: String,
    pub amount: Amount,
    /// ISO 4217 code, e.g. `USD`.
    pub currency: String,
    /// JSON:API documents dasherize attribute names.
    #[serde(alias = "payment-mode")]
    pub payment_mode: PaymentMode,
}

impl Order {
    pub fn new(
        identifier: impl Into<String>,
        amount: Amount,
        currency: impl Into<String>,
        payment_mode: PaymentMode,
    ) -> Result<Self, CheckoutError> {
        let order = Self {
            identifier: identifier.into(),
            amount,
            currency: currency.into(),
            payment_mode,
        };
        order.validate()?;
        Ok(order)
    }

    /// Checks the fields serde cannot: a usable identifier and a currency code.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.identifier.trim().is_empty() {
            return Err(CheckoutError::ValidationError(
                "Order identifier must not be empty".to_string(),
            ));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CheckoutError::ValidationError(format!(
                "Invalid currency code: {}",
                self.currency
            )));
        }
        Ok(())
    }

    pub fn amount_in_minor_units(&self) -> Result<i64, CheckoutError> {
        self.amount.minor_units(&self.currency)
    }
}
