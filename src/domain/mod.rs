//! Core domain types and logic.

pub mod table;
pub mod returns;
pub mod portfolio;
pub mod metrics;
pub mod analysis;
pub mod charts;
pub mod config_validation;
pub mod error;
