//! Mock implementations for testing
//!
//! Always compiled so unit tests, integration tests, and downstream
//! harnesses share the same doubles.

use crate::directory::{DirectoryClient, DirectoryError, ServiceRegistration};
use crate::quotes::{QuoteError, QuoteSource};
use crate::transport::{InboundMessage, OutboundMessage, Transport};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Scripted quote source backed by a symbol-to-price table.
///
/// Records every lookup so tests can assert lookup order and
/// short-circuiting.
#[derive(Default)]
pub struct MockQuoteSource {
    prices: HashMap<String, f64>,
    failing: HashSet<String>,
    missing_price: HashSet<String>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockQuoteSource {
    pub fn with_prices<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            prices: prices.into_iter().map(|(s, p)| (s.into(), p)).collect(),
            ..Self::default()
        }
    }

    /// Symbols whose lookup fails as if the endpoint were unreachable
    pub fn failing_for<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Symbols whose lookup succeeds but carries no price field
    pub fn missing_price_for<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_price.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Shared handle to the ordered list of symbols looked up so far
    pub fn lookup_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.lookups)
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    async fn current_price(&self, symbol: &str) -> Result<Option<f64>, QuoteError> {
        self.lookups
            .lock()
            .expect("lookup log lock poisoned")
            .push(symbol.to_string());

        if self.failing.contains(symbol) {
            return Err(QuoteError::Status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        if self.missing_price.contains(symbol) {
            return Ok(None);
        }
        Ok(self.prices.get(symbol).copied())
    }
}

/// Mock transport errors
#[derive(Debug, Error)]
pub enum MockTransportError {
    #[error("transport closed")]
    Closed,
}

enum ScriptedRecv {
    Message(InboundMessage),
    Idle,
}

/// Scripted transport: replays queued inbound messages and records every
/// outbound message.
///
/// Once the script is exhausted, `recv` reports the channel closed so
/// worker loops driven by this mock terminate; [`MockTransport::stay_open`]
/// switches exhaustion to idle re-polls instead.
pub struct MockTransport {
    inbound: tokio::sync::Mutex<VecDeque<ScriptedRecv>>,
    outbound: tokio::sync::Mutex<Vec<OutboundMessage>>,
    close_when_exhausted: bool,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: tokio::sync::Mutex::new(VecDeque::new()),
            outbound: tokio::sync::Mutex::new(Vec::new()),
            close_when_exhausted: true,
        }
    }

    pub fn stay_open(mut self) -> Self {
        self.close_when_exhausted = false;
        self
    }

    /// Queue an inbound request message carrying `body`, tagged with the
    /// standard request metadata.
    pub async fn push_request(&self, sender: &str, body: &str) {
        self.push_message(InboundMessage {
            sender: sender.to_string(),
            performative: crate::protocol::messages::Performative::Request
                .as_str()
                .to_string(),
            ontology: crate::protocol::messages::ONTOLOGY.to_string(),
            body: body.to_string(),
        })
        .await;
    }

    pub async fn push_message(&self, message: InboundMessage) {
        self.inbound
            .lock()
            .await
            .push_back(ScriptedRecv::Message(message));
    }

    /// Queue one elapsed-wait slot (recv yields `Ok(None)`)
    pub async fn push_idle(&self) {
        self.inbound.lock().await.push_back(ScriptedRecv::Idle);
    }

    /// Snapshot of every message sent so far, in send order
    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.outbound.lock().await.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Error = MockTransportError;

    async fn recv(&self, _wait: Duration) -> Result<Option<InboundMessage>, Self::Error> {
        match self.inbound.lock().await.pop_front() {
            Some(ScriptedRecv::Message(message)) => Ok(Some(message)),
            Some(ScriptedRecv::Idle) => Ok(None),
            None if self.close_when_exhausted => Err(MockTransportError::Closed),
            None => Ok(None),
        }
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), Self::Error> {
        self.outbound.lock().await.push(message.clone());
        Ok(())
    }
}

/// Directory client that records registrations in memory
#[derive(Default)]
pub struct InMemoryDirectory {
    registrations: Mutex<Vec<ServiceRegistration>>,
    fail: bool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn registrations(&self) -> Vec<ServiceRegistration> {
        self.registrations
            .lock()
            .expect("registration lock poisoned")
            .clone()
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn register(&self, registration: &ServiceRegistration) -> Result<(), DirectoryError> {
        if self.fail {
            return Err(DirectoryError::Registration(
                "directory unavailable".to_string(),
            ));
        }
        self.registrations
            .lock()
            .expect("registration lock poisoned")
            .push(registration.clone());
        Ok(())
    }
}
