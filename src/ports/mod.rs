//! Ports - Interfaces to collaborators outside the attribution core.
//!
//! # Ports
//!
//! - `RevenueResolver` - Monetary value of a journey, once per request scope

mod revenue_resolver;

pub use revenue_resolver::{DedupeScope, RevenueResolver};
