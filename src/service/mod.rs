//! Service Module
//!
//! The cached entity facades and the order tracker built on them.

mod cached;
mod tracker;

pub use cached::CachedRepository;
pub use tracker::{
    OrderTracker, SharedStore, Stores, CUSTOMER_CACHE, MEAL_CACHE, ORDER_CACHE,
};
