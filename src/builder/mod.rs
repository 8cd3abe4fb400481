use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::datamodel::{AppInfoMap, MetricPoint, Rate};

pub mod graphite_builder;

pub use graphite_builder::GraphiteBuilder;

/// Builds the points sent to Graphite for a snapshot timestamp.
#[async_trait]
pub trait PointBuilder: Send + Sync {
    async fn build_points(&self, timestamp: i64) -> Result<Vec<MetricPoint>>;
}

/// Provides the rates gathered by the accumulators.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    /// Returns the counters for `timestamp`. The returned rate carries the
    /// requested timestamp.
    async fn rate(&self, timestamp: i64) -> Result<Rate>;
}

/// Resolves application GUIDs to organization, space and application names.
///
/// Implementations fail open: when the lookup fails they return a
/// [`LookupError`] carrying whatever metadata is still available (for example
/// a stale cache), and callers use that partial mapping as if it was the
/// answer. An empty `guids` slice must return an empty map without any remote
/// call.
#[async_trait]
pub trait AppInfoStore: Send + Sync {
    async fn lookup(&self, guids: &[String]) -> Result<AppInfoMap, LookupError>;
}

/// A failed metadata lookup, with the metadata that could still be served.
#[derive(Error, Debug)]
#[error("app info lookup failed: {source}")]
pub struct LookupError {
    pub partial: AppInfoMap,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl LookupError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self {
            partial: AppInfoMap::new(),
            source: source.into(),
        }
    }

    pub fn with_partial(mut self, partial: AppInfoMap) -> Self {
        self.partial = partial;
        self
    }

    /// The mapping callers should keep working with.
    pub fn into_partial(self) -> AppInfoMap {
        self.partial
    }
}
