//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: clears an entity cache and resets its accounting at a fixed interval

mod sweeper;

pub use sweeper::{PeriodicSweeper, Sweep, SweeperHandle};
