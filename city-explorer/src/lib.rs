//! Location-driven data aggregator.
//!
//! A free-text place search is geocoded once and cached; weather, events,
//! movies, businesses and trails are then resolved per location through a
//! lookaside cache backed by libsql.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
