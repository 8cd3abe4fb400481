use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{AppInfoStore, PointBuilder, RateFetcher};
use crate::datamodel::{InstanceIdentity, MetricPoint};

/// Turns accumulator rates into Graphite points named after the Cloud Foundry
/// organization, space and application of every instance.
pub struct GraphiteBuilder {
    fetcher: Arc<dyn RateFetcher>,
    store: Arc<dyn AppInfoStore>,
    metrics_prefix: String,
}

impl GraphiteBuilder {
    pub fn new(
        fetcher: Arc<dyn RateFetcher>,
        store: Arc<dyn AppInfoStore>,
        metrics_prefix: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            store,
            metrics_prefix: metrics_prefix.into(),
        }
    }
}

#[async_trait]
impl PointBuilder for GraphiteBuilder {
    async fn build_points(&self, timestamp: i64) -> Result<Vec<MetricPoint>> {
        let rate = self.fetcher.rate(timestamp).await?;

        let guids: Vec<String> = rate
            .counts
            .keys()
            .map(|identity| InstanceIdentity::new(identity).guid())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let app_info = match self.store.lookup(&guids).await {
            Ok(app_info) => app_info,
            Err(err) => {
                warn!(error = %err, "failed to collect app metadata from API lookup");
                err.into_partial()
            }
        };

        let mut points = Vec::with_capacity(rate.counts.len());
        let mut unresolved = 0usize;
        for (raw_identity, value) in &rate.counts {
            let identity = InstanceIdentity::new(raw_identity);
            match app_info.get(identity.guid()) {
                Some(info) if info.is_complete() => {
                    points.push(MetricPoint::for_instance(
                        &self.metrics_prefix,
                        info,
                        identity.index(),
                        *value,
                        rate.timestamp,
                    ));
                }
                _ => {
                    unresolved += 1;
                    debug!(
                        identity = %identity,
                        value,
                        "failed to extract metric metadata from API lookup"
                    );
                }
            }
        }

        info!(
            timestamp = rate.timestamp,
            points = points.len(),
            unresolved,
            "built graphite points"
        );

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LookupError;
    use crate::datamodel::{AppInfo, AppInfoMap, Rate};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct StaticFetcher(HashMap<String, u64>);

    #[async_trait]
    impl RateFetcher for StaticFetcher {
        async fn rate(&self, timestamp: i64) -> Result<Rate> {
            Ok(Rate::new(timestamp, self.0.clone()))
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        requested: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl AppInfoStore for RecordingStore {
        async fn lookup(&self, guids: &[String]) -> Result<AppInfoMap, LookupError> {
            self.requested.lock().unwrap().push(guids.to_vec());
            Ok(guids
                .iter()
                .map(|guid| (guid.clone(), AppInfo::new("org", "space", guid.clone())))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_guids_are_deduplicated() {
        let fetcher = StaticFetcher(HashMap::from([
            ("a/0".to_string(), 1),
            ("a/1".to_string(), 2),
            ("b".to_string(), 3),
        ]));
        let store = Arc::new(RecordingStore::default());
        let builder = GraphiteBuilder::new(Arc::new(fetcher), store.clone(), "p");

        let mut names: Vec<String> = builder
            .build_points(42)
            .await
            .unwrap()
            .into_iter()
            .map(|point| point.name)
            .collect();
        names.sort();

        assert_eq!(
            names,
            vec!["p.org.space.a.0", "p.org.space.a.1", "p.org.space.b.0"]
        );
        let requested = store.requested.lock().unwrap();
        assert_eq!(requested.len(), 1);
        assert_eq!(requested[0], vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_zero_counter_is_emitted() {
        let fetcher = StaticFetcher(HashMap::from([("a/0".to_string(), 0)]));
        let store = Arc::new(RecordingStore::default());
        let builder = GraphiteBuilder::new(Arc::new(fetcher), store, "p");
        let points = builder.build_points(7).await.unwrap();
        assert_eq!(points, vec![MetricPoint::new("p.org.space.a.0", "0", 7)]);
    }
}
