use std::fmt::Write;

use super::AppInfo;

/// A single Graphite data point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricPoint {
    pub name: String,
    pub value: String,
    pub timestamp: i64,
}

impl MetricPoint {
    pub fn new(name: impl Into<String>, value: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp,
        }
    }

    /// Builds `<prefix>.<org>.<space>.<app>.<index>`.
    ///
    /// Dots inside the metadata are not escaped, so names containing the
    /// delimiter end up in a deeper namespace.
    pub fn for_instance(
        prefix: &str,
        app_info: &AppInfo,
        index: &str,
        value: u64,
        timestamp: i64,
    ) -> Self {
        Self {
            name: format!("{}.{}.{}", prefix, app_info, index),
            value: value.to_string(),
            timestamp,
        }
    }

    /// Renders the point using the Graphite plaintext protocol.
    pub fn write_plaintext(&self, buffer: &mut String) {
        // Writing into a String cannot fail.
        let _ = writeln!(buffer, "{} {} {}", self.name, self.value, self.timestamp);
    }
}

/// Renders a batch of points into a single plaintext payload.
pub fn to_plaintext(points: &[MetricPoint]) -> String {
    let mut buffer = String::with_capacity(points.len() * 64);
    for point in points {
        point.write_plaintext(&mut buffer);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_instance_naming() {
        let app_info = AppInfo::new("org1", "space1", "app1");
        let point = MetricPoint::for_instance("test", &app_info, "0", 2, 1520259517);
        assert_eq!(point.name, "test.org1.space1.app1.0");
        assert_eq!(point.value, "2");
        assert_eq!(point.timestamp, 1520259517);
    }

    #[test]
    fn test_dots_are_not_escaped() {
        let app_info = AppInfo::new("my.org", "space", "app");
        let point = MetricPoint::for_instance("p", &app_info, "1", 0, 5);
        assert_eq!(point.name, "p.my.org.space.app.1");
        assert_eq!(point.value, "0");
    }

    #[test]
    fn test_to_plaintext() {
        let points = vec![
            MetricPoint::new("a.b", "1", 10),
            MetricPoint::new("c.d", "22", 20),
        ];
        assert_eq!(to_plaintext(&points), "a.b 1 10\nc.d 22 20\n");
        assert_eq!(to_plaintext(&[]), "");
    }
}
