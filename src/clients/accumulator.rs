use anyhow::Result;
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::StatusCode;
use tracing::debug;

use super::{ClientError, normalize_address, unexpected_status};
use crate::builder::RateFetcher;
use crate::datamodel::Rate;

/// Fetches rates from one or more accumulators and sums their counts.
#[derive(Debug, Clone)]
pub struct AccumulatorRateFetcher {
    client: reqwest::Client,
    addresses: Vec<String>,
    token: Option<String>,
    report_limit: usize,
}

impl AccumulatorRateFetcher {
    pub fn new<S: AsRef<str>>(
        client: reqwest::Client,
        addresses: &[S],
        token: Option<String>,
    ) -> Result<Self, ClientError> {
        let addresses = addresses
            .iter()
            .map(|address| normalize_address(address.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            client,
            addresses,
            token,
            report_limit: 0,
        })
    }

    /// Keeps only the `limit` highest counters of every rate. 0 disables the limit.
    pub fn with_report_limit(mut self, limit: usize) -> Self {
        self.report_limit = limit;
        self
    }

    async fn fetch_from(&self, address: &str, timestamp: i64) -> Result<Rate, ClientError> {
        let url = format!("{}/rates/{}", address, timestamp);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            return Err(unexpected_status(&url, response).await);
        }

        let body = response.bytes().await?;
        let rate: Rate = serde_json::from_slice(&body)?;
        debug!(url = %url, counts = rate.counts.len(), "fetched accumulator rate");
        Ok(rate)
    }
}

#[async_trait]
impl RateFetcher for AccumulatorRateFetcher {
    async fn rate(&self, timestamp: i64) -> Result<Rate> {
        let rates = try_join_all(
            self.addresses
                .iter()
                .map(|address| self.fetch_from(address, timestamp)),
        )
        .await?;

        let mut total = Rate::new(timestamp, Default::default());
        for rate in rates {
            total.merge(rate);
        }
        if self.report_limit > 0 {
            total.retain_top(self.report_limit);
        }

        Ok(total)
    }
}
