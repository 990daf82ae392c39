//! Port traits for the external collaborators: price data, configuration and
//! chart rendering.

pub mod chart_port;
pub mod config_port;
pub mod price_port;
