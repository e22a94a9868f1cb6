//! Core domain types and logic.

pub mod price_bar;
pub mod price_series;
pub mod calendar;
pub mod indicator;
pub mod indicator_helpers;
pub mod forecast;
pub mod trade;
pub mod reconcile;
pub mod pipeline;
pub mod config_validation;
pub mod error;
