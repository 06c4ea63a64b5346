//! Building blocks for running a shearstream deployment.
//!
//! The crate is split into two layers: [`libraries`] contains the reusable
//! pieces (event envelopes, the broker connection manager, persistence and
//! lifecycle primitives) while [`services`] contains the deployable service
//! implementations built on top of them.

pub mod libraries;
pub mod services;
