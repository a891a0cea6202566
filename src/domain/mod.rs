//! Domain layer containing attribution logic and domain types.
//!
//! Everything here is pure and synchronous: no I/O and no logging.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (errors, timestamps, numeric helpers)
//! - `journey` - Touchpoints, journeys, and step-key projection
//! - `attribution` - The six credit models, Markov engine, and result shape
//! - `paths` - Path analytics, next-best-action, and campaign uplift

pub mod attribution;
pub mod foundation;
pub mod journey;
pub mod paths;
