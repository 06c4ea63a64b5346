//! Scripted transport for exercising broker-facing code without a live broker

use super::{BrokerError, BrokerTransport, ConsumerHandle, ProducerHandle};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

enum Delivery {
    Message(Vec<u8>),
    Failure,
}

/// Shared observable state of a [`MockTransport`]
#[derive(Default)]
pub struct MockState {
    connect_attempts: AtomicUsize,
    remaining_connect_failures: AtomicUsize,
    remaining_send_failures: AtomicUsize,
    commits: AtomicUsize,
    published: Mutex<Vec<Vec<u8>>>,
    deliveries: Mutex<VecDeque<Delivery>>,
}

impl MockState {
    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn published(&self) -> Vec<Vec<u8>> {
        self.published.lock().unwrap().clone()
    }
}

/// Transport whose failures and deliveries are scripted ahead of time
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState::default()),
        }
    }

    /// Makes the next `count` connection attempts fail
    pub fn fail_connects(self, count: usize) -> Self {
        self.state
            .remaining_connect_failures
            .store(count, Ordering::SeqCst);
        self
    }

    /// Makes the next `count` publish attempts fail
    pub fn fail_sends(self, count: usize) -> Self {
        self.state
            .remaining_send_failures
            .store(count, Ordering::SeqCst);
        self
    }

    /// Appends a message to the scripted delivery sequence
    pub fn deliver(self, payload: Vec<u8>) -> Self {
        self.state
            .deliveries
            .lock()
            .unwrap()
            .push_back(Delivery::Message(payload));
        self
    }

    /// Appends a consumer failure to the scripted delivery sequence
    pub fn fail_delivery(self) -> Self {
        self.state
            .deliveries
            .lock()
            .unwrap()
            .push_back(Delivery::Failure);
        self
    }

    /// Handle onto the observable state, kept alive independently of the transport
    pub fn state(&self) -> Arc<MockState> {
        self.state.clone()
    }
}

fn take_scripted_failure(counter: &AtomicUsize) -> bool {
    let remaining = counter.load(Ordering::SeqCst);
    if remaining > 0 {
        counter.store(remaining - 1, Ordering::SeqCst);
        true
    } else {
        false
    }
}

#[async_trait]
impl BrokerTransport for MockTransport {
    type Client = ();
    type Producer = MockProducer;
    type Consumer = MockConsumer;

    async fn connect(&self) -> Result<(), BrokerError> {
        self.state.connect_attempts.fetch_add(1, Ordering::SeqCst);

        if take_scripted_failure(&self.state.remaining_connect_failures) {
            Err(BrokerError::Unavailable("scripted connect failure".into()))
        } else {
            Ok(())
        }
    }

    async fn producer(&self, _client: &()) -> Result<MockProducer, BrokerError> {
        Ok(MockProducer {
            state: self.state.clone(),
        })
    }

    async fn consumer(&self, _client: &()) -> Result<MockConsumer, BrokerError> {
        Ok(MockConsumer {
            state: self.state.clone(),
        })
    }
}

pub struct MockProducer {
    state: Arc<MockState>,
}

#[async_trait]
impl ProducerHandle for MockProducer {
    async fn send(&mut self, payload: &[u8]) -> Result<(), BrokerError> {
        if take_scripted_failure(&self.state.remaining_send_failures) {
            return Err(BrokerError::Unavailable("scripted send failure".into()));
        }

        self.state.published.lock().unwrap().push(payload.to_vec());
        Ok(())
    }
}

pub struct MockConsumer {
    state: Arc<MockState>,
}

#[async_trait]
impl ConsumerHandle for MockConsumer {
    async fn next_message(&mut self) -> Result<Vec<u8>, BrokerError> {
        let next = self.state.deliveries.lock().unwrap().pop_front();

        match next {
            Some(Delivery::Message(payload)) => Ok(payload),
            Some(Delivery::Failure) => Err(BrokerError::Unavailable(
                "scripted consumer failure".into(),
            )),
            // An exhausted script behaves like a quiet topic
            None => futures::future::pending().await,
        }
    }

    async fn commit(&mut self) -> Result<(), BrokerError> {
        self.state.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
