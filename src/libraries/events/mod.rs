//! Event envelopes and reading records carried on the broker topic

mod envelope;
mod records;

pub mod time;

pub use envelope::{Envelope, EnvelopeError, EventKind};
pub use records::{TypeBatch, TypeBatchEntry, TypeReading, VolumeBatch, VolumeBatchEntry, VolumeReading};
