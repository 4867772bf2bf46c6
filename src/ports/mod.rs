//! Port traits the screening core consumes.

pub mod config_port;
pub mod fundamentals_port;
pub mod price_port;
pub mod report_port;
pub mod universe_port;
