use super::{BrokerError, BrokerTransport, ConsumerHandle, ProducerHandle};
use crate::libraries::helpers::RetryJitter;
use async_trait::async_trait;
use futures::stream::{self, Stream};
use log::{info, warn};
use tokio::time::sleep;

/// Resilient owner of the client, producer and consumer handles for one topic
///
/// All three handles live and die together: any construction or usage failure resets the whole
/// set and the next operation re-establishes it from scratch. Connection loss is never surfaced
/// to callers; operations block until the broker becomes reachable again, with a uniformly
/// jittered delay between attempts. Process shutdown is the only way out of a retry loop.
///
/// The manager is constructed once at service startup and injected into whatever needs broker
/// access. When a single instance is shared by concurrent request handlers it must be wrapped in
/// a mutex, since a failing handler resets handles that another handler may be about to use.
pub struct BrokerConnection<T: BrokerTransport> {
    transport: T,
    client: Option<T::Client>,
    producer: Option<T::Producer>,
    consumer: Option<T::Consumer>,
}

impl<T: BrokerTransport> BrokerConnection<T> {
    /// Creates an unconnected manager; no handles are established until first use
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            client: None,
            producer: None,
            consumer: None,
        }
    }

    /// Whether all three handles are currently established
    pub fn is_ready(&self) -> bool {
        self.client.is_some() && self.producer.is_some() && self.consumer.is_some()
    }

    fn reset(&mut self) {
        self.producer = None;
        self.consumer = None;
        self.client = None;
    }

    /// Blocks until the client, producer and consumer handles are all established
    ///
    /// Retries indefinitely with a jittered delay between attempts. This is a liveness
    /// guarantee, not a bounded operation.
    pub async fn ensure_ready(&mut self) {
        if self.is_ready() {
            return;
        }

        let mut delays = RetryJitter::default();
        let mut reported = false;

        loop {
            match self.establish().await {
                Ok(()) => {
                    if reported {
                        info!("Broker connection re-established");
                    }
                    return;
                }
                Err(error) => {
                    if !reported {
                        reported = true;
                        warn!("Unable to reach broker, retrying: {}", error);
                    }

                    self.reset();

                    if let Some(delay) = delays.next() {
                        sleep(delay).await;
                    }
                }
            }
        }
    }

    async fn establish(&mut self) -> Result<(), BrokerError> {
        let client = self.transport.connect().await?;
        let consumer = self.transport.consumer(&client).await?;
        let producer = self.transport.producer(&client).await?;

        self.client = Some(client);
        self.consumer = Some(consumer);
        self.producer = Some(producer);

        Ok(())
    }

    /// Hands one message to the broker, blocking until it has been accepted
    ///
    /// A publish-time failure resets all handles, re-establishes the connection and retries the
    /// same message. The message is never dropped and the caller never sees a broker error; a
    /// permanently unreachable broker stalls the caller indefinitely by design.
    pub async fn publish(&mut self, payload: Vec<u8>) {
        loop {
            if self.producer.is_none() {
                self.ensure_ready().await;
            }

            let result = match self.producer.as_mut() {
                Some(producer) => producer.send(&payload).await,
                None => continue,
            };

            match result {
                Ok(()) => return,
                Err(error) => {
                    warn!("Publish failed, reconnecting: {}", error);
                    self.reset();
                }
            }
        }
    }

    /// Waits for the next raw message on the topic, reconnecting for as long as it takes
    pub async fn next_message(&mut self) -> Vec<u8> {
        loop {
            if self.consumer.is_none() {
                self.ensure_ready().await;
            }

            let result = match self.consumer.as_mut() {
                Some(consumer) => consumer.next_message().await,
                None => continue,
            };

            match result {
                Ok(message) => return message,
                Err(error) => {
                    warn!("Consumer failed, reconnecting: {}", error);
                    self.reset();
                }
            }
        }
    }

    /// Lazy, never-ending sequence of raw messages with internal reconnection
    ///
    /// The sequence only terminates with the process; it cannot be restarted independently of
    /// the connection manager that produced it.
    pub fn consume(&mut self) -> impl Stream<Item = Vec<u8>> + '_ {
        stream::unfold(self, |connection| async move {
            let message = connection.next_message().await;
            Some((message, connection))
        })
    }

    /// Marks the most recently consumed message as processed
    ///
    /// A commit failure is absorbed: the handles are reset so the next read reconnects, and the
    /// uncommitted message may be redelivered.
    pub async fn acknowledge(&mut self) {
        if let Some(consumer) = self.consumer.as_mut() {
            if let Err(error) = consumer.commit().await {
                warn!("Offset commit failed: {}", error);
                self.reset();
            }
        }
    }
}

/// Source of raw messages drained by a background ingestion task
///
/// Abstracting over the connection manager lets tests drive the ingestion loop with a scripted
/// message sequence instead of a live broker.
#[async_trait]
pub trait MessageSource: Send {
    /// Waits for the next raw message
    async fn next_message(&mut self) -> Vec<u8>;

    /// Marks the most recently returned message as processed
    async fn acknowledge(&mut self);
}

#[async_trait]
impl<T: BrokerTransport> MessageSource for BrokerConnection<T> {
    async fn next_message(&mut self) -> Vec<u8> {
        BrokerConnection::next_message(self).await
    }

    async fn acknowledge(&mut self) {
        BrokerConnection::acknowledge(self).await
    }
}
