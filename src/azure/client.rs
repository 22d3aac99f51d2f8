use crate::azure::types::*;
use crate::connect::ConnectionDescriptor;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// REST API version pinned on every request
pub const API_VERSION: &str = "7.0";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Setup(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Thin binding over the Azure DevOps REST API.
///
/// Every call is a single attempt: no retries, and status codes are only
/// reported, never interpreted.
#[derive(Clone)]
pub struct DevOpsClient {
    client: reqwest::Client,
    api_root: String,
    api_key: String,
}

impl DevOpsClient {
    /// `timeout: None` waits for the server indefinitely
    pub fn new(connection: &ConnectionDescriptor, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!("ado-explorer/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ApiError::Setup)?;

        Ok(Self {
            client,
            api_root: connection.api_root().to_string(),
            api_key: connection.api_key().to_string(),
        })
    }

    fn project_url(&self, project_id: &str, path: &str) -> String {
        format!(
            "{}/{}/{}?api-version={}",
            self.api_root,
            urlencoding::encode(project_id),
            path,
            API_VERSION
        )
    }

    /// Send a request with Basic auth (empty user, key as password) and
    /// unwrap the `value` array of the response
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder, url: String) -> Result<Vec<T>> {
        let response = request
            .basic_auth("", Some(&self.api_key))
            .send()
            .await
            .map_err(|source| ApiError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("{url} returned {status}");
            return Err(ApiError::Status { url, status });
        }

        let body: ListResponse<T> = response
            .json()
            .await
            .map_err(|source| ApiError::Decode { url, source })?;
        Ok(body.value)
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>> {
        log::debug!("GET {url}");
        self.send(self.client.get(&url), url).await
    }

    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        let url = format!("{}/_apis/projects?api-version={}", self.api_root, API_VERSION);
        self.get(url).await
    }

    pub async fn get_pipelines(&self, project_id: &str) -> Result<Vec<Pipeline>> {
        self.get(self.project_url(project_id, "_apis/pipelines")).await
    }

    pub async fn get_releases(&self, project_id: &str) -> Result<Vec<Release>> {
        self.get(self.project_url(project_id, "_apis/release/releases")).await
    }

    /// Server-side release query; the explorer filters locally instead
    #[allow(dead_code)]
    pub async fn query_releases<Q: Serialize + ?Sized>(&self, project_id: &str, query: &Q) -> Result<Vec<Release>> {
        let url = self.project_url(project_id, "_apis/release/releases/query");
        log::debug!("POST {url}");
        self.send(self.client.post(&url).json(query), url).await
    }
}
