use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::{ClientError, normalize_address, unexpected_status};
use crate::builder::{AppInfoStore, LookupError};
use crate::datamodel::{AppInfo, AppInfoMap};

/// One application as listed by the light Cloud Controller API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CfLightApp {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub space: String,
    #[serde(default)]
    pub org: String,
}

/// Reads application metadata from a light Cloud Controller API.
///
/// The light API cannot filter by GUID, so every lookup lists all the apps
/// and returns them all.
#[derive(Debug, Clone)]
pub struct CfLightAppInfoStore {
    api_addr: String,
    client: reqwest::Client,
}

impl CfLightAppInfoStore {
    pub fn new(api_addr: &str, client: reqwest::Client) -> Result<Self, ClientError> {
        Ok(Self {
            api_addr: normalize_address(api_addr)?,
            client,
        })
    }

    async fn lookup_apps(&self) -> Result<Vec<CfLightApp>, ClientError> {
        let url = format!("{}/v2/apps", self.api_addr);
        let response = self.client.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(unexpected_status(&url, response).await);
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl AppInfoStore for CfLightAppInfoStore {
    async fn lookup(&self, guids: &[String]) -> Result<AppInfoMap, LookupError> {
        if guids.is_empty() {
            return Ok(AppInfoMap::new());
        }

        debug!(guids = guids.len(), "looking up apps");
        let apps = self.lookup_apps().await.map_err(LookupError::new)?;

        Ok(apps
            .into_iter()
            .filter(|app| !app.guid.is_empty())
            .map(|app| {
                (
                    app.guid,
                    AppInfo {
                        name: app.name,
                        space: app.space,
                        org: app.org,
                    },
                )
            })
            .collect())
    }
}
