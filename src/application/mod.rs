//! Application layer containing the checkout orchestration.
//!
//! `CheckoutOrchestrator` is the entry point: it selects the gateway adapter
//! for an order, drives authorization and charging, and turns the result into
//! a single outcome. `AttemptTracker` owns the per-order busy state.

pub mod attempts;
pub mod orchestrator;
