//! Port traits at the boundary of the simulation core.

pub mod config_port;
pub mod price_source_port;
pub mod progress_port;
pub mod report_port;
