//! Individual micro-services of the ingestion pipeline

#[cfg(feature = "receiver")]
pub mod receiver;

#[cfg(feature = "storage")]
pub mod storage;

mod options;
pub use options::SharedOptions;
