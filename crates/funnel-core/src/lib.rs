//! # Funnel Core
//!
//! The domain layer of the funnel rate limiter.
//! This crate contains the leaky-bucket state machine, the ports it needs from
//! a shared store, and the decision orchestration. It has zero infrastructure
//! dependencies; concrete stores and locks live in `funnel-infra`.

pub mod domain;
pub mod error;
pub mod limiter;
pub mod ports;

pub use domain::Funnel;
pub use error::LimiterError;
pub use limiter::{FunnelLimiter, LimiterConfig};
