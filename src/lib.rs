//! Touchpoint Attribution - Multi-touch marketing attribution engine
//!
//! This crate splits conversion value across the marketing touchpoints that
//! preceded it. It ships rule-based models, a data-driven absorbing Markov
//! chain model with reliability diagnostics, and journey analytics
//! (common paths, next-best-action, observational campaign uplift).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
