use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::GraphiteClient;
use crate::builder::PointBuilder;

/// Default reporting interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// What happened during one reporting cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The points could not be built, the transport was not touched.
    BuildFailed,
    /// The points were built but the transport refused them.
    SendFailed,
    /// The points were handed to the transport.
    Sent { points: usize },
}

/// Periodically builds points and sends them to Graphite.
pub struct GraphiteReporter {
    point_builder: Arc<dyn PointBuilder>,
    graphite_client: Box<dyn GraphiteClient>,
    interval: Duration,
}

impl GraphiteReporter {
    pub fn new(
        point_builder: Arc<dyn PointBuilder>,
        graphite_client: Box<dyn GraphiteClient>,
    ) -> Self {
        Self {
            point_builder,
            graphite_client,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Sets the reporting interval. A zero interval is ignored.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.interval = interval;
        }
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Reports on every interval until `ctx` is cancelled.
    ///
    /// Cancellation is only observed between cycles, a running cycle always
    /// completes. Cycles start on multiples of the interval after the start,
    /// the boundaries that pass while a cycle is running are dropped.
    pub async fn run(mut self, ctx: CancellationToken) {
        let start = Instant::now();
        let mut next_tick = start + self.interval;

        info!(interval = ?self.interval, "graphite reporter started");

        loop {
            tokio::select! {
                biased;
                _ = ctx.cancelled() => break,
                _ = tokio::time::sleep_until(next_tick) => {
                    debug!("graphite reporter ticked");
                    self.report_once().await;
                    next_tick = next_boundary(start, self.interval, Instant::now());
                }
            }
        }

        info!("graphite reporter stopped");
    }

    /// Runs a single reporting cycle.
    pub async fn report_once(&mut self) -> CycleOutcome {
        let timestamp = snapshot_timestamp(SystemTime::now(), self.interval);

        let points = match self.point_builder.build_points(timestamp).await {
            Ok(points) => points,
            Err(err) => {
                error!(timestamp, error = %err, "failed to build points");
                return CycleOutcome::BuildFailed;
            }
        };

        // The send is attempted even when connecting failed, the client
        // reports its own error in that case.
        if let Err(err) = self.graphite_client.connect().await {
            error!(error = %err, "failed connecting to graphite");
        }

        let outcome = match self.graphite_client.send_metrics(&points).await {
            Ok(()) => {
                info!(timestamp, points = points.len(), "sent points to graphite");
                CycleOutcome::Sent {
                    points: points.len(),
                }
            }
            Err(err) => {
                error!(timestamp, error = %err, "failed to post to graphite");
                CycleOutcome::SendFailed
            }
        };

        if let Err(err) = self.graphite_client.disconnect().await {
            error!(error = %err, "failed disconnecting from graphite");
        }

        outcome
    }
}

/// The first `start + k * interval` strictly after `now`.
fn next_boundary(start: Instant, interval: Duration, now: Instant) -> Instant {
    let interval_nanos = interval.as_nanos().max(1);
    let elapsed_nanos = now.saturating_duration_since(start).as_nanos();
    let ticks = elapsed_nanos / interval_nanos + 1;
    let offset = u64::try_from(ticks * interval_nanos).unwrap_or(u64::MAX);

    start + Duration::from_nanos(offset)
}

/// The bucket to report at `now`: two intervals back, truncated to an
/// interval boundary, in seconds since the Unix epoch.
///
/// The first interval of lag lets the accumulators finalize the bucket, the
/// second absorbs collection latency.
pub fn snapshot_timestamp(now: SystemTime, interval: Duration) -> i64 {
    let interval_nanos = interval.as_nanos().max(1);
    let now_nanos = match now.duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => since_epoch.as_nanos() as i128,
        Err(before_epoch) => -(before_epoch.duration().as_nanos() as i128),
    };
    let interval_nanos = interval_nanos as i128;

    let lagged = now_nanos - 2 * interval_nanos;
    let truncated = lagged.div_euclid(interval_nanos) * interval_nanos;

    truncated.div_euclid(1_000_000_000) as i64
}
