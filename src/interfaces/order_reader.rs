use crate::domain::order::Order;
use crate::error::{CheckoutError, Result};
use std::io::Read;

/// Reads a pending order from a JSON document.
///
/// Accepts either a bare order object or the JSON:API shape the backend
/// returns (`{"data": {"id": ..., "attributes": {...}}}`), whose attribute
/// names may be dasherized (`payment-mode`).
pub struct OrderReader<R: Read> {
    source: R,
}

impl<R: Read> OrderReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn read(self) -> Result<Order> {
        let value: serde_json::Value = serde_json::from_reader(self.source)
            .map_err(|e| CheckoutError::ValidationError(format!("Invalid order JSON: {}", e)))?;

        let value = match value.get("data") {
            Some(data) => {
                let mut attributes = data.get("attributes").cloned().unwrap_or_default();
                if let (Some(object), Some(id)) = (attributes.as_object_mut(), data.get("id"))
                    && !object.contains_key("identifier")
                {
                    object.insert("identifier".to_string(), id.clone());
                }
                attributes
            }
            None => value,
        };

        let order: Order = serde_json::from_value(value)
            .map_err(|e| CheckoutError::ValidationError(format!("Invalid order: {}", e)))?;
        order.validate()?;
        Ok(order)
    }
}
