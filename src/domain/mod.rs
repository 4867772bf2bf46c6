//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod strategy;
pub mod setup;
pub mod technical;
pub mod hygiene;
pub mod ranker;
pub mod regime;
pub mod universe;
pub mod screen;
pub mod config_validation;
pub mod error;
