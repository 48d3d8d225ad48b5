//! Domain entities and request/response models for the order tracker API
//!
//! Entities are stored, cached and serialized as-is; DTOs cover request
//! validation and the non-entity responses.

pub mod entities;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use entities::{Customer, Meal, Order, OrderStatus, MAX_MEALS_PER_ORDER};
pub use requests::{
    CustomerIdQuery, CustomerRequest, FlushQuery, MealFilterQuery, MealIdQuery, MealRequest,
    NameQuery, StatusQuery, UrlQuery,
};
pub use responses::{CacheStatsResponse, FlushResponse, HealthResponse, TopVisitedResponse};
