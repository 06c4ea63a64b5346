//! Helper functions that don't belong elsewhere
//!
//! This module contains small helpers that don't belong to a specific area but are still used by multiple services.

mod backoff;

pub mod constants;

pub use backoff::RetryJitter;
