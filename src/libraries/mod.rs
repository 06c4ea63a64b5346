//! Shared modules used by every service
//!
//! This module contains commonly used methods and data structures which are being used in individual services.
//! Each sub-module focuses on a specific area like `broker` or `storage`.
//! Small functions that don't belong anywhere else can be found in the `helpers` module.

pub mod broker;
pub mod events;
pub mod helpers;
pub mod lifecycle;
pub mod storage;
