use crate::libraries::broker::kafka::KafkaTransport;
use crate::libraries::broker::BrokerConnection;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct Context {
    /// Shared broker connection manager
    ///
    /// Request handlers run concurrently but a failing publish resets the handle set, so all
    /// broker access is serialized through the mutex.
    pub broker: Arc<Mutex<BrokerConnection<KafkaTransport>>>,
}

impl Context {
    pub fn new(connection: BrokerConnection<KafkaTransport>) -> Self {
        Self {
            broker: Arc::new(Mutex::new(connection)),
        }
    }
}
