//! Order Tracker - customers, meals and orders behind bounded entity caches
//!
//! Each entity type is served through a read-through/write-through cache with
//! memory accounting and a periodic full sweep.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod tasks;
pub mod visits;

pub use api::AppState;
pub use config::Config;
pub use service::OrderTracker;
