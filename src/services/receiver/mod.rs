//! Reading intake service
//!
//! Accepts batched hair readings over HTTP, fans each batch out into individual records and
//! publishes one event per record to the broker.

use super::SharedOptions;
use crate::libraries::broker::kafka::KafkaTransport;
use crate::libraries::broker::BrokerConnection;
use crate::libraries::helpers::constants;
use crate::libraries::lifecycle::Heart;
use anyhow::Result;
use jatsl::{schedule, JobScheduler, StatusServer};
use log::info;
use structopt::StructOpt;

mod context;
mod jobs;

use context::Context;
use jobs::ServerJob;

#[derive(Debug, StructOpt)]
/// Reading intake service
///
/// Accepts batched hair readings over HTTP and publishes one event per reading.
pub struct Options {
    /// Port on which the HTTP server will listen
    #[structopt(short, long, default_value = constants::PORT_RECEIVER)]
    port: u16,
}

pub async fn run(shared_options: SharedOptions, options: Options) -> Result<()> {
    let (mut heart, _) = Heart::new();

    let transport = KafkaTransport::new(
        shared_options.broker,
        shared_options.topic,
        shared_options.consumer_group,
    );
    let connection = BrokerConnection::new(transport);

    let scheduler = JobScheduler::default();
    let context = Context::new(connection);

    let status_job = StatusServer::new(&scheduler, shared_options.status_server);
    let server_job = ServerJob::new(options.port);

    schedule!(scheduler, context, {
        status_job,
        server_job
    });

    let death_reason = heart.death().await;
    info!("Heart died: {}", death_reason);

    scheduler.terminate_jobs().await;

    Ok(())
}
