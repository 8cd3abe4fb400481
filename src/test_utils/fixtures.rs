use crate::datamodel::{AppInfo, AppInfoMap, MetricPoint};

/// Timestamp used across the builder tests.
pub const TIMESTAMP: i64 = 1520259517;

/// Counters for two single-instance apps.
pub fn two_app_counts() -> Vec<(&'static str, u64)> {
    vec![("a/0", 2), ("b/0", 3)]
}

/// Complete metadata for the apps of [`two_app_counts`].
pub fn happy_path_apps() -> AppInfoMap {
    AppInfoMap::from([
        ("a".to_string(), AppInfo::new("org1", "space1", "app1")),
        ("b".to_string(), AppInfo::new("org2", "space2", "app2")),
    ])
}

/// Metadata where every app is missing one field.
pub fn missing_info_apps() -> AppInfoMap {
    AppInfoMap::from([
        ("a".to_string(), AppInfo::new("org1", "space1", "")),
        ("b".to_string(), AppInfo::new("org2", "", "app2")),
    ])
}

/// Metadata for an app nobody asked for.
pub fn missing_cache_apps() -> AppInfoMap {
    AppInfoMap::from([("c".to_string(), AppInfo::new("org3", "space3", "c"))])
}

/// Two points for the reporter tests.
pub fn sample_points() -> Vec<MetricPoint> {
    vec![
        MetricPoint::new("application.ingress", "1234", 1257894000),
        MetricPoint::new("application.ingress", "1234", 1257894000),
    ]
}
