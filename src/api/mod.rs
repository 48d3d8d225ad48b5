//! API Module
//!
//! HTTP handlers and routing for the order tracker REST API.
//!
//! # Endpoints
//! - `/api/customers`, `/api/meals`, `/api/orders` - entity operations
//! - `/api/statistics` - visit counters
//! - `/api/cache` - cache stats and flush
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
