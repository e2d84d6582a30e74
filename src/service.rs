//! REST client for the PaddiSense hub.
//!
//! Two endpoints matter to the panel: the read-only state map
//! (`GET /api/states`) and the service registry
//! (`POST /api/services/paddisense/{service}`). Service calls are
//! fire-and-forget on the hub side; the panel only learns whether the call
//! was accepted.

use anyhow::Result;
use serde_json::Value;
use thiserror::Error;

use crate::snapshot::EntityState;

/// Service domain the hub integration registers its actions under.
const SERVICE_DOMAIN: &str = "paddisense";

/// User agent for hub requests
const USER_AGENT: &str = concat!("PaddiSense-Panel/", env!("CARGO_PKG_VERSION"));

/// Errors from talking to the hub
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Hub rejected the call ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// HTTP client for the hub API
#[derive(Clone)]
pub struct HubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HubClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Fetch the hub's full state map.
    pub async fn fetch_states(&self) -> Result<Vec<EntityState>, ServiceError> {
        let response = self.request(reqwest::Method::GET, "/api/states").send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Invoke one of the hub's registered services.
    pub async fn call_service(&self, service: &str, payload: Value) -> Result<(), ServiceError> {
        let path = format!("/api/services/{}/{}", SERVICE_DOMAIN, service);
        tracing::debug!("Calling hub service {}", service);

        let response = self
            .request(reqwest::Method::POST, &path)
            .json(&payload)
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = HubClient::new("http://hub.local:8123/", None).unwrap();
        assert_eq!(client.base_url(), "http://hub.local:8123");
    }

    #[test]
    fn test_rejected_error_carries_hub_message() {
        let err = ServiceError::Rejected {
            status: 500,
            body: "module not found".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("module not found"));
    }
}
