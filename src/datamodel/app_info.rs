use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Application GUID to metadata, as returned by an [`AppInfoStore`](crate::builder::AppInfoStore).
pub type AppInfoMap = HashMap<String, AppInfo>;

/// The names of an application, its space, and its organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub space: String,
    pub org: String,
}

impl AppInfo {
    pub fn new(org: impl Into<String>, space: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            space: space.into(),
            org: org.into(),
        }
    }

    /// Metadata can only name a metric when org, space and name are all set.
    pub fn is_complete(&self) -> bool {
        !self.org.is_empty() && !self.space.is_empty() && !self.name.is_empty()
    }
}

impl std::fmt::Display for AppInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.org, self.space, self.name)
    }
}
