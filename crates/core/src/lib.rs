//! Core business logic for outliers.

pub mod services;

pub use services::*;
