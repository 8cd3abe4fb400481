use anyhow::Result;
use async_trait::async_trait;

use crate::datamodel::MetricPoint;

pub mod graphite_reporter;

pub use graphite_reporter::{CycleOutcome, GraphiteReporter, snapshot_timestamp};

/// The connection the reporter sends its points through.
///
/// The reporter calls `connect`, `send_metrics` and `disconnect` in that
/// order on every cycle that produced points. Connectionless transports may
/// treat `connect` and `disconnect` as no-ops.
#[async_trait]
pub trait GraphiteClient: Send {
    async fn connect(&mut self) -> Result<()>;
    async fn send_metrics(&mut self, points: &[MetricPoint]) -> Result<()>;
    async fn disconnect(&mut self) -> Result<()>;
}
