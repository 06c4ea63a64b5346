use super::super::Context;
use crate::libraries::broker::MessageSource;
use crate::libraries::events::{Envelope, EventKind, TypeReading, VolumeReading};
use crate::libraries::helpers::RetryJitter;
use crate::libraries::storage::{Database, StorageError};
use anyhow::Result;
use async_trait::async_trait;
use futures::Future;
use jatsl::{Job, TaskManager};
use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Background task draining reading events from the broker into the database
///
/// Every message is processed and committed individually. The offset is only committed once the
/// reading sits in the database, so a crash between write and commit causes a redelivery rather
/// than a loss. Malformed or unknown messages are committed without a database write.
///
/// A message is fully settled before the next one is read. Offset commits are positional, so
/// reading past an unstored message would let a later commit mark it consumed; a failing insert
/// is therefore retried in place with the same jittered delays the broker connection uses.
pub struct IngestJob<S> {
    source: Mutex<S>,
}

impl<S> IngestJob<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Mutex::new(source),
        }
    }
}

#[async_trait]
impl<S: MessageSource + 'static> Job for IngestJob<S> {
    type Context = Context;

    const NAME: &'static str = module_path!();

    async fn execute(&self, manager: TaskManager<Self::Context>) -> Result<()> {
        let mut source = self.source.lock().await;
        manager.ready().await;

        loop {
            let raw = source.next_message().await;

            settle_message(|| handle_message(&manager.context.database, &raw)).await;
            source.acknowledge().await;
        }
    }
}

/// Runs one message through the handler until it is stored or skipped
///
/// Only a failed database write is retried; malformed messages settle immediately as skipped.
async fn settle_message<F, Fut>(mut attempt: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = MessageOutcome>,
{
    let mut delays = RetryJitter::default();

    loop {
        match attempt().await {
            MessageOutcome::Stored | MessageOutcome::Skipped => return,
            MessageOutcome::StorageFailed => {
                if let Some(delay) = delays.next() {
                    sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum MessageOutcome {
    Stored,
    Skipped,
    StorageFailed,
}

async fn handle_message(database: &Database, raw: &[u8]) -> MessageOutcome {
    let envelope = match Envelope::decode(raw) {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!("Discarding undecodable message: {}", error);
            return MessageOutcome::Skipped;
        }
    };

    match envelope.kind() {
        Some(EventKind::VolumeReading) => {
            let record: VolumeReading = match envelope.decode_payload() {
                Ok(record) => record,
                Err(error) => {
                    warn!("Discarding malformed volume reading: {}", error);
                    return MessageOutcome::Skipped;
                }
            };

            store(
                database.insert_volume_reading(&record).await,
                EventKind::VolumeReading,
                record.trace_id,
            )
        }
        Some(EventKind::TypeReading) => {
            let record: TypeReading = match envelope.decode_payload() {
                Ok(record) => record,
                Err(error) => {
                    warn!("Discarding malformed type reading: {}", error);
                    return MessageOutcome::Skipped;
                }
            };

            store(
                database.insert_type_reading(&record).await,
                EventKind::TypeReading,
                record.trace_id,
            )
        }
        None => {
            debug!("Ignoring message of unknown type {}", envelope.kind);
            MessageOutcome::Skipped
        }
    }
}

fn store(result: Result<(), StorageError>, kind: EventKind, trace_id: uuid::Uuid) -> MessageOutcome {
    match result {
        Ok(()) => {
            info!("Stored event {} with a trace id of {}", kind, trace_id);
            MessageOutcome::Stored
        }
        Err(StorageError::InvalidTimestamp(error)) => {
            warn!("Discarding {} with invalid timestamp (id: {}): {}", kind, trace_id, error);
            MessageOutcome::Skipped
        }
        Err(error) => {
            warn!("Unable to store {} (id: {}): {}", kind, trace_id, error);
            MessageOutcome::StorageFailed
        }
    }
}
