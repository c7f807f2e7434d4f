//! RateHub Library
//!
//! Exchange-rate aggregation across unreliable external providers

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod providers;
pub mod registry;
pub mod server;
pub mod types;
