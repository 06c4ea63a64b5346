//! Relational persistence for reading rows

mod database;

pub use database::{Database, StorageError, TypeRow, VolumeRow};
