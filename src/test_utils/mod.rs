//! Test doubles for the reporter collaborators.
//!
//! Shared by the unit tests and the integration tests (through the
//! `test-utils` feature).

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::builder::{AppInfoStore, LookupError, PointBuilder, RateFetcher};
use crate::datamodel::{AppInfoMap, MetricPoint, Rate};
use crate::reporter::GraphiteClient;

pub mod fixtures;

/// Returns the same counters for every timestamp, or always fails.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    counts: HashMap<String, u64>,
    failure: Option<String>,
    requested: Mutex<Vec<i64>>,
}

impl FakeFetcher {
    pub fn new<K: Into<String>>(counts: impl IntoIterator<Item = (K, u64)>) -> Self {
        Self {
            counts: counts.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn requested(&self) -> Vec<i64> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateFetcher for FakeFetcher {
    async fn rate(&self, timestamp: i64) -> Result<Rate> {
        self.requested.lock().unwrap().push(timestamp);
        if let Some(message) = &self.failure {
            return Err(anyhow!(message.clone()));
        }
        Ok(Rate::new(timestamp, self.counts.clone()))
    }
}

/// Serves a fixed mapping, optionally wrapped in a [`LookupError`].
#[derive(Debug, Default)]
pub struct FakeStore {
    apps: AppInfoMap,
    failure: Option<String>,
    requested: Mutex<Vec<Vec<String>>>,
}

impl FakeStore {
    pub fn new(apps: AppInfoMap) -> Self {
        Self {
            apps,
            ..Default::default()
        }
    }

    /// Fails every lookup but still serves `partial`, like a stale cache.
    pub fn failing_with_partial(message: &str, partial: AppInfoMap) -> Self {
        Self {
            apps: partial,
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn requested(&self) -> Vec<Vec<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppInfoStore for FakeStore {
    async fn lookup(&self, guids: &[String]) -> Result<AppInfoMap, LookupError> {
        self.requested.lock().unwrap().push(guids.to_vec());
        match &self.failure {
            Some(message) => Err(LookupError::new(message.clone()).with_partial(self.apps.clone())),
            None => Ok(self.apps.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct SpyPointBuilderState {
    build_called: usize,
    timestamps: Vec<i64>,
}

/// Records every call and answers with fixed points, or an error.
#[derive(Debug, Clone, Default)]
pub struct SpyPointBuilder {
    points: Vec<MetricPoint>,
    failure: Option<String>,
    state: Arc<Mutex<SpyPointBuilderState>>,
}

impl SpyPointBuilder {
    pub fn new(points: Vec<MetricPoint>) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn build_called(&self) -> usize {
        self.state.lock().unwrap().build_called
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.state.lock().unwrap().timestamps.clone()
    }
}

#[async_trait]
impl PointBuilder for SpyPointBuilder {
    async fn build_points(&self, timestamp: i64) -> Result<Vec<MetricPoint>> {
        {
            let mut state = self.state.lock().unwrap();
            state.build_called += 1;
            state.timestamps.push(timestamp);
        }
        match &self.failure {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(self.points.clone()),
        }
    }
}

/// A call received by [`SpyGraphiteClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    Connect,
    SendMetrics(usize),
    Disconnect,
}

#[derive(Debug, Default)]
struct SpyGraphiteClientState {
    calls: Vec<ClientCall>,
    sent: Vec<MetricPoint>,
}

/// Records the transport calls. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct SpyGraphiteClient {
    fail_connect: bool,
    fail_send: bool,
    fail_disconnect: bool,
    state: Arc<Mutex<SpyGraphiteClientState>>,
}

impl SpyGraphiteClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn send_metrics_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ClientCall::SendMetrics(_)))
            .count()
    }

    pub fn sent(&self) -> Vec<MetricPoint> {
        self.state.lock().unwrap().sent.clone()
    }

    fn record(&self, call: ClientCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl GraphiteClient for SpyGraphiteClient {
    async fn connect(&mut self) -> Result<()> {
        self.record(ClientCall::Connect);
        if self.fail_connect {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }

    async fn send_metrics(&mut self, points: &[MetricPoint]) -> Result<()> {
        self.record(ClientCall::SendMetrics(points.len()));
        if self.fail_send {
            return Err(anyhow!("broken pipe"));
        }
        self.state.lock().unwrap().sent.extend_from_slice(points);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.record(ClientCall::Disconnect);
        if self.fail_disconnect {
            return Err(anyhow!("already closed"));
        }
        Ok(())
    }
}
