//! Kafka-backed implementation of the broker transport

use super::{BrokerError, BrokerTransport, ConsumerHandle, ProducerHandle};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::topic_partition_list::{Offset, TopicPartitionList};
use std::time::Duration;
use tokio::task;

const METADATA_TIMEOUT: Duration = Duration::from_secs(5);
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters for one topic on one Kafka cluster
#[derive(Debug, Clone)]
pub struct KafkaTransport {
    endpoint: String,
    topic: String,
    consumer_group: String,
}

impl KafkaTransport {
    /// Creates a transport bound to one endpoint, topic and consumer group
    pub fn new(endpoint: String, topic: String, consumer_group: String) -> Self {
        Self {
            endpoint,
            topic,
            consumer_group,
        }
    }

    fn base_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config.set("bootstrap.servers", &self.endpoint);
        config
    }
}

/// Client handle proving the broker is reachable
///
/// Creating producers and consumers through rdkafka never touches the network, so the client
/// probes the cluster by fetching topic metadata. The probe connection is kept alive for the
/// lifetime of the handle set.
pub struct KafkaClient {
    _probe: BaseConsumer,
}

#[async_trait]
impl BrokerTransport for KafkaTransport {
    type Client = KafkaClient;
    type Producer = KafkaProducer;
    type Consumer = KafkaConsumer;

    async fn connect(&self) -> Result<KafkaClient, BrokerError> {
        let config = self.base_config();
        let topic = self.topic.clone();

        // fetch_metadata blocks the calling thread for up to METADATA_TIMEOUT
        task::spawn_blocking(move || -> Result<KafkaClient, BrokerError> {
            let probe: BaseConsumer = config.create()?;
            probe.fetch_metadata(Some(&topic), METADATA_TIMEOUT)?;

            Ok(KafkaClient { _probe: probe })
        })
        .await?
    }

    async fn producer(&self, _client: &KafkaClient) -> Result<KafkaProducer, BrokerError> {
        let mut config = self.base_config();
        config.set("message.timeout.ms", "10000");

        let producer: FutureProducer = config.create()?;

        Ok(KafkaProducer {
            producer,
            topic: self.topic.clone(),
        })
    }

    async fn consumer(&self, _client: &KafkaClient) -> Result<KafkaConsumer, BrokerError> {
        let mut config = self.base_config();
        config
            .set("group.id", &self.consumer_group)
            .set("auto.offset.reset", "latest")
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false");

        let consumer: StreamConsumer = config.create()?;
        consumer.subscribe(&[&self.topic])?;

        Ok(KafkaConsumer {
            consumer,
            topic: self.topic.clone(),
            last_delivery: None,
        })
    }
}

/// Producer handle publishing to one topic
pub struct KafkaProducer {
    producer: FutureProducer,
    topic: String,
}

#[async_trait]
impl ProducerHandle for KafkaProducer {
    async fn send(&mut self, payload: &[u8]) -> Result<(), BrokerError> {
        let record = FutureRecord::<(), _>::to(&self.topic).payload(payload);

        self.producer
            .send(record, SEND_TIMEOUT)
            .await
            .map(|_delivery| ())
            .map_err(|(error, _message)| error.into())
    }
}

/// Consumer handle bound to a consumer group
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topic: String,
    last_delivery: Option<(i32, i64)>,
}

#[async_trait]
impl ConsumerHandle for KafkaConsumer {
    async fn next_message(&mut self) -> Result<Vec<u8>, BrokerError> {
        let message = self.consumer.recv().await?;
        self.last_delivery = Some((message.partition(), message.offset()));

        Ok(message.payload().map(|raw| raw.to_vec()).unwrap_or_default())
    }

    async fn commit(&mut self) -> Result<(), BrokerError> {
        if let Some((partition, offset)) = self.last_delivery.take() {
            let mut offsets = TopicPartitionList::new();
            offsets.add_partition_offset(&self.topic, partition, Offset::Offset(offset + 1))?;

            self.consumer.commit(&offsets, CommitMode::Async)?;
        }

        Ok(())
    }
}
