//! Broker access and the resilient connection manager
//!
//! Services never talk to the broker client library directly. They go through a
//! [`BrokerConnection`] which owns the client, producer and consumer handles and keeps them
//! alive across broker outages. The concrete client library is hidden behind the
//! [`BrokerTransport`] seam so tests can drive the connection manager with a scripted transport.

mod connection;

pub mod kafka;

#[cfg(test)]
pub mod mock;

pub use connection::{BrokerConnection, MessageSource};

use async_trait::async_trait;
use thiserror::Error;

/// Broker access errors
///
/// Every variant is recovered locally by the connection manager; none of them ever reaches a
/// service-level caller.
#[derive(Error, Debug)]
pub enum BrokerError {
    /// The underlying Kafka client reported a failure
    #[error("broker client error")]
    Kafka(#[from] rdkafka::error::KafkaError),
    /// A blocking broker operation could not be joined
    #[error("broker task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
    /// The broker endpoint could not be reached
    #[error("broker unavailable: {0}")]
    Unavailable(String),
}

/// Factory for the three broker handles
///
/// Mirrors the construction order of the underlying client library: a client must exist before a
/// producer or consumer handle can be derived from it. The connection manager enforces that
/// order and tears all three down together on any failure.
#[async_trait]
pub trait BrokerTransport: Send + Sync {
    /// Low-level client handle proving broker reachability
    type Client: Send;
    /// Producer handle derived from the client
    type Producer: ProducerHandle;
    /// Consumer handle derived from the client
    type Consumer: ConsumerHandle;

    /// Establishes a client connection to the broker endpoint
    async fn connect(&self) -> Result<Self::Client, BrokerError>;

    /// Derives a producer handle for the configured topic
    async fn producer(&self, client: &Self::Client) -> Result<Self::Producer, BrokerError>;

    /// Derives a consumer handle bound to the configured consumer group,
    /// starting at the latest offset
    async fn consumer(&self, client: &Self::Client) -> Result<Self::Consumer, BrokerError>;
}

/// Producer side of a [`BrokerTransport`]
#[async_trait]
pub trait ProducerHandle: Send {
    /// Hands one message to the broker, returning once it has been accepted
    async fn send(&mut self, payload: &[u8]) -> Result<(), BrokerError>;
}

/// Consumer side of a [`BrokerTransport`]
#[async_trait]
pub trait ConsumerHandle: Send {
    /// Waits for the next raw message on the topic
    async fn next_message(&mut self) -> Result<Vec<u8>, BrokerError>;

    /// Marks the most recently returned message as processed
    async fn commit(&mut self) -> Result<(), BrokerError>;
}
