//! Core domain types and logic.

pub mod price;
pub mod pricing_strategy;
pub mod pricing_manager;
pub mod transform;
pub mod reducer;
pub mod trial;
pub mod simulation;
pub mod statistics;
pub mod config_validation;
pub mod error;
