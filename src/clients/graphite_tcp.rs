use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::ClientError;
use crate::datamodel::{MetricPoint, to_plaintext};
use crate::reporter::GraphiteClient;

pub const DEFAULT_GRAPHITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends points to carbon using the plaintext protocol over TCP.
#[derive(Debug)]
pub struct TcpGraphiteClient {
    address: String,
    timeout: Duration,
    stream: Option<TcpStream>,
}

impl TcpGraphiteClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            address: format!("{}:{}", host, port),
            timeout: DEFAULT_GRAPHITE_TIMEOUT,
            stream: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

#[async_trait]
impl GraphiteClient for TcpGraphiteClient {
    async fn connect(&mut self) -> Result<()> {
        let stream = timeout(self.timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| ClientError::ConnectTimeout {
                address: self.address.clone(),
            })?
            .map_err(ClientError::from)?;
        debug!(address = %self.address, "connected to graphite");
        self.stream = Some(stream);
        Ok(())
    }

    async fn send_metrics(&mut self, points: &[MetricPoint]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;
        if points.is_empty() {
            return Ok(());
        }

        let payload = to_plaintext(points);
        stream
            .write_all(payload.as_bytes())
            .await
            .map_err(ClientError::from)?;
        stream.flush().await.map_err(ClientError::from)?;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await.map_err(ClientError::from)?;
            debug!(address = %self.address, "disconnected from graphite");
        }
        Ok(())
    }
}
