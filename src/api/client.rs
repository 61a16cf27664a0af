use crate::api::logging::{debug_payload_enabled, emit_debug_payload};
use crate::config::Config;
use crate::types::{AgentRoster, ChatRequest, HealthStatus};
use crate::util::is_local_endpoint_url;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
#[cfg(test)]
use std::sync::Arc;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

const CHAT_ENDPOINT: &str = "/api/chat";
const HEALTH_ENDPOINT: &str = "/api/health";
const AGENTS_ENDPOINT: &str = "/api/agents";

#[cfg(test)]
pub trait MockStreamProducer: Send + Sync {
    fn create_mock_stream(&self, request: &ChatRequest) -> Result<ByteStream>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    #[cfg(test)]
    mock_stream_producer: Option<Arc<dyn MockStreamProducer>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            #[cfg(test)]
            mock_stream_producer: None,
        }
    }

    #[cfg(test)]
    pub fn new_mock(producer: Arc<dyn MockStreamProducer>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "http://localhost:8000".to_string(),
            mock_stream_producer: Some(producer),
        }
    }

    /// Open the streaming chat request for one turn and hand back its body
    /// for the SSE decoder.
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<ByteStream> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                return producer.create_mock_stream(request);
            }
        }

        let request_url = self.endpoint_url(CHAT_ENDPOINT);
        if debug_payload_enabled() {
            emit_debug_payload(&request_url, &serde_json::to_value(request)?);
        }

        let response = self
            .http
            .post(&request_url)
            .json(request)
            .send()
            .await
            .map_err(|error| map_api_request_error(error, &request_url))?
            .error_for_status()
            .map_err(|error| map_api_request_error(error, &request_url))?;

        let request_url_for_stream = request_url.clone();
        let stream = response.bytes_stream().map(move |item| {
            item.map_err(|error| map_api_request_error(error, &request_url_for_stream))
        });
        Ok(Box::pin(stream))
    }

    pub async fn check_health(&self) -> Result<HealthStatus> {
        let request_url = self.endpoint_url(HEALTH_ENDPOINT);
        let response = self.get_checked(&request_url).await?;
        Ok(response.json().await?)
    }

    pub async fn list_agents(&self) -> Result<AgentRoster> {
        let request_url = self.endpoint_url(AGENTS_ENDPOINT);
        let response = self.get_checked(&request_url).await?;
        Ok(response.json().await?)
    }

    async fn get_checked(&self, request_url: &str) -> Result<reqwest::Response> {
        self.http
            .get(request_url)
            .send()
            .await
            .map_err(|error| map_api_request_error(error, request_url))?
            .error_for_status()
            .map_err(|error| map_api_request_error(error, request_url))
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

fn map_api_request_error(error: reqwest::Error, request_url: &str) -> anyhow::Error {
    if error.is_connect() && is_local_endpoint_url(request_url) {
        return anyhow!(
            "cannot reach local chat backend '{}': {}. Start the backend or update SLASHCHAT_BASE_URL.",
            request_url,
            error
        );
    }
    if error.is_connect() {
        return anyhow!("cannot reach chat backend '{}': {}", request_url, error);
    }
    if error.is_timeout() {
        return anyhow!("request to '{}' timed out: {}", request_url, error);
    }
    if let Some(status) = error.status() {
        return anyhow!(
            "chat backend '{}' returned HTTP {}: {}",
            request_url,
            status,
            error
        );
    }
    anyhow!("request to '{}' failed: {}", request_url, error)
}
