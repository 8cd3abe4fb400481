use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Counters for every known instance identity, for one reporting bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,

    /// Counter per instance identity (`guid/index`).
    #[serde(default)]
    pub counts: HashMap<String, u64>,
}

impl Rate {
    pub fn new(timestamp: i64, counts: HashMap<String, u64>) -> Self {
        Self { timestamp, counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Adds the counts of `other` into this rate, summing shared identities.
    pub fn merge(&mut self, other: Rate) {
        for (identity, value) in other.counts {
            let entry = self.counts.entry(identity).or_insert(0);
            *entry = entry.saturating_add(value);
        }
    }

    /// Keeps only the `limit` highest counters.
    pub fn retain_top(&mut self, limit: usize) {
        if self.counts.len() <= limit {
            return;
        }
        let mut entries: Vec<(String, u64)> = self.counts.drain().collect();
        entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(limit);
        self.counts = entries.into_iter().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_accumulator_payload() {
        let rate: Rate =
            serde_json::from_str(r#"{"timestamp": 1520259517, "counts": {"a/0": 2, "b/1": 3}}"#)
                .unwrap();
        assert_eq!(rate.timestamp, 1520259517);
        assert_eq!(rate.counts.get("a/0"), Some(&2));
        assert_eq!(rate.counts.get("b/1"), Some(&3));

        let no_counts: Rate = serde_json::from_str(r#"{"timestamp": 10}"#).unwrap();
        assert!(no_counts.is_empty());
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut rate = Rate::new(10, HashMap::from([("a/0".to_string(), 2)]));
        rate.merge(Rate::new(
            10,
            HashMap::from([("a/0".to_string(), 5), ("b/0".to_string(), 1)]),
        ));
        assert_eq!(rate.counts.get("a/0"), Some(&7));
        assert_eq!(rate.counts.get("b/0"), Some(&1));
    }

    #[test]
    fn test_retain_top() {
        let mut rate = Rate::new(
            10,
            HashMap::from([
                ("a/0".to_string(), 1),
                ("b/0".to_string(), 30),
                ("c/0".to_string(), 20),
            ]),
        );
        rate.retain_top(2);
        assert_eq!(rate.counts.len(), 2);
        assert!(rate.counts.contains_key("b/0"));
        assert!(rate.counts.contains_key("c/0"));

        rate.retain_top(5);
        assert_eq!(rate.counts.len(), 2);
    }
}
