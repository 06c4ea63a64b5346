use super::super::Context;
use crate::libraries::events::time;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use jatsl::{Job, TaskManager};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
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

        let volume = warp::get()
            .and(warp::path!("readings" / "volume"))
            .and(warp::query::<RangeQuery>())
            .and(with_context.clone())
            .and_then(volume_readings);

        let hair_type = warp::get()
            .and(warp::path!("readings" / "type"))
            .and(warp::query::<RangeQuery>())
            .and(with_context)
            .and_then(type_readings);

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

/// Half-open creation time window, inclusive of the start and exclusive of the end
#[derive(Debug, Deserialize)]
struct RangeQuery {
    start_timestamp: String,
    end_timestamp: String,
}

impl RangeQuery {
    fn parse(&self) -> Result<(NaiveDateTime, NaiveDateTime), chrono::ParseError> {
        let start = time::parse_wire_timestamp(&self.start_timestamp)?;
        let end = time::parse_wire_timestamp(&self.end_timestamp)?;

        Ok((start, end))
    }
}

async fn volume_readings(query: RangeQuery, context: Context) -> Result<impl Reply, Infallible> {
    let (start, end) = match query.parse() {
        Ok(window) => window,
        Err(error) => return Ok(bad_range_reply(error)),
    };

    match context.database.volume_readings_created_between(start, end).await {
        Ok(rows) => {
            debug!(
                "Found {} hair volume readings (start: {}, end: {})",
                rows.len(),
                start,
                end
            );
            Ok(reply::with_status(reply::json(&rows), StatusCode::OK))
        }
        Err(error) => {
            warn!("Volume reading query failed: {}", error);
            Ok(storage_error_reply())
        }
    }
}

async fn type_readings(query: RangeQuery, context: Context) -> Result<impl Reply, Infallible> {
    let (start, end) = match query.parse() {
        Ok(window) => window,
        Err(error) => return Ok(bad_range_reply(error)),
    };

    match context.database.type_readings_created_between(start, end).await {
        Ok(rows) => {
            debug!(
                "Found {} hair type readings (start: {}, end: {})",
                rows.len(),
                start,
                end
            );
            Ok(reply::with_status(reply::json(&rows), StatusCode::OK))
        }
        Err(error) => {
            warn!("Type reading query failed: {}", error);
            Ok(storage_error_reply())
        }
    }
}

fn bad_range_reply(error: chrono::ParseError) -> reply::WithStatus<reply::Json> {
    reply::with_status(
        reply::json(&json!({ "error": format!("invalid timestamp range: {}", error) })),
        StatusCode::BAD_REQUEST,
    )
}

fn storage_error_reply() -> reply::WithStatus<reply::Json> {
    reply::with_status(
        reply::json(&json!({ "error": "storage unavailable" })),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}
