use log::warn;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorLocation {
    pub ip_address: String,
    #[serde(default)]
    pub city_name: String,
    #[serde(default)]
    pub country_name: String,
}

/// Looks up the visitor's public IP and coarse location, caching the first answer.
pub struct GeoLocator {
    client: reqwest::Client,
    endpoint: String,
    cached: Mutex<Option<VisitorLocation>>,
}

impl GeoLocator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            cached: Mutex::new(None),
        }
    }

    pub async fn lookup(&self) -> Result<VisitorLocation, String> {
        if let Ok(cached) = self.cached.lock() {
            if let Some(ref location) = *cached {
                return Ok(location.clone());
            }
        }

        let response = self
            .client
            .get(&self.endpoint)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| format!("Failed to fetch visitor location: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Failed to fetch visitor location: HTTP {}",
                response.status()
            ));
        }

        let location: VisitorLocation = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse visitor location: {}", e))?;

        match self.cached.lock() {
            Ok(mut cached) => *cached = Some(location.clone()),
            Err(e) => warn!("Failed to cache visitor location: {}", e),
        }
        Ok(location)
    }
}
