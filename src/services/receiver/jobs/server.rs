use super::super::Context;
use crate::libraries::broker::{BrokerConnection, BrokerTransport};
use crate::libraries::events::{Envelope, EnvelopeError, EventKind, TypeBatch, VolumeBatch};
use anyhow::Result;
use async_trait::async_trait;
use jatsl::{Job, TaskManager};
use log::{info, warn};
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{reply, Filter, Reply};

pub struct ServerJob {
    port: u16,
}

#[async_trait]
impl Job for ServerJob {
    type Context = Context;

    const NAME: &'static str = module_path!();
    const SUPPORTS_GRACEFUL_TERMINATION: bool = true;

    async fn execute(&self, manager: TaskManager<Self::Context>) -> Result<()> {
        let context = manager.context.clone();
        let with_context = warp::any().map(move || context.clone());

        let volume = warp::post()
            .and(warp::path!("readings" / "volume"))
            .and(warp::body::json())
            .and(with_context.clone())
            .and_then(submit_volume_batch);

        let hair_type = warp::post()
            .and(warp::path!("readings" / "type"))
            .and(warp::body::json())
            .and(with_context)
            .and_then(submit_type_batch);

        let health = warp::get()
            .and(warp::path!("health"))
            .map(|| reply::json(&json!({ "status": "Running" })));

        let routes = volume.or(hair_type).or(health);

        let source_addr: SocketAddr = ([0, 0, 0, 0], self.port).into();
        let (addr, server) =
            warp::serve(routes).bind_with_graceful_shutdown(source_addr, manager.termination_signal());

        info!("Listening at {}", addr);
        manager.ready().await;

        server.await;

        Ok(())
    }
}

impl ServerJob {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

async fn submit_volume_batch(batch: VolumeBatch, context: Context) -> Result<impl Reply, Infallible> {
    let records = batch.into_records();
    let mut broker = context.broker.lock().await;

    for record in &records {
        let outcome = publish_record(
            &mut broker,
            EventKind::VolumeReading,
            record,
            record.trace_id,
        )
        .await;

        if let Err(error) = outcome {
            warn!("Unable to serialize volume reading: {}", error);
            return Ok(reply::with_status(
                reply::reply(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
    }

    Ok(reply::with_status(reply::reply(), StatusCode::CREATED))
}

async fn submit_type_batch(batch: TypeBatch, context: Context) -> Result<impl Reply, Infallible> {
    let records = batch.into_records();
    let mut broker = context.broker.lock().await;

    for record in &records {
        let outcome =
            publish_record(&mut broker, EventKind::TypeReading, record, record.trace_id).await;

        if let Err(error) = outcome {
            warn!("Unable to serialize type reading: {}", error);
            return Ok(reply::with_status(
                reply::reply(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
    }

    Ok(reply::with_status(reply::reply(), StatusCode::CREATED))
}

/// Wraps one record into an envelope and hands it to the broker
///
/// Returns only once the broker has accepted the event; the connection manager absorbs any
/// broker outage in between.
async fn publish_record<T: BrokerTransport, R: Serialize>(
    connection: &mut BrokerConnection<T>,
    kind: EventKind,
    record: &R,
    trace_id: Uuid,
) -> Result<(), EnvelopeError> {
    info!("Received event {} with a trace id of {}", kind, trace_id);

    let payload = Envelope::new(kind, record)?.encode()?;
    connection.publish(payload).await;

    info!("Response for event {} (id: {}) has status 201", kind, trace_id);

    Ok(())
}
