//! Reading persistence service
//!
//! Drains reading events from the broker topic into the relational store and serves range
//! queries over the persisted rows.

use super::SharedOptions;
use crate::libraries::broker::kafka::KafkaTransport;
use crate::libraries::broker::BrokerConnection;
use crate::libraries::helpers::constants;
use crate::libraries::lifecycle::Heart;
use crate::libraries::storage::Database;
use anyhow::Result;
use jatsl::{schedule, JobScheduler, StatusServer};
use log::info;
use structopt::StructOpt;

mod context;
mod jobs;

use context::Context;
use jobs::{IngestJob, ServerJob};

#[derive(Debug, StructOpt)]
/// Reading persistence service
///
/// Consumes reading events from the broker and stores them in a relational database.
pub struct Options {
    /// Port on which the HTTP server will listen
    #[structopt(short, long, default_value = constants::PORT_STORAGE)]
    port: u16,

    /// Database connection URL
    #[structopt(long, env, default_value = "sqlite://readings.db")]
    database: String,
}

pub async fn run(shared_options: SharedOptions, options: Options) -> Result<()> {
    let (mut heart, _) = Heart::new();

    let database = Database::connect(&options.database).await?;
    let transport = KafkaTransport::new(
        shared_options.broker,
        shared_options.topic,
        shared_options.consumer_group,
    );
    let connection = BrokerConnection::new(transport);

    let scheduler = JobScheduler::default();
    let context = Context::new(database);

    let status_job = StatusServer::new(&scheduler, shared_options.status_server);
    let server_job = ServerJob::new(options.port);
    let ingest_job = IngestJob::new(connection);

    schedule!(scheduler, context, {
        status_job,
        server_job,
        ingest_job
    });

    let death_reason = heart.death().await;
    info!("Heart died: {}", death_reason);

    scheduler.terminate_jobs().await;

    Ok(())
}
