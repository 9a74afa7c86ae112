//! Domain layer: the order being paid for, the charge wire shapes, the
//! gateway adapters, and the ports the application talks through.

pub mod charge;
pub mod gateway;
pub mod order;
pub mod ports;
