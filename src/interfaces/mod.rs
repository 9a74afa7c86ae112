//! Adapters between the checkout core and the outside world used by the
//! command-line front end: the order file reader and console collaborators.

pub mod console;
pub mod order_reader;
