//! Minimal blocking HTTP seam. Clients talk to `HttpTransport` so the
//! pipeline can run against scripted responses in tests.

use crate::error::{CollectorError, Result};
use crate::settings::HttpSettings;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

pub trait HttpTransport {
    /// Issue a GET with the given query parameters. Non-2xx statuses are
    /// returned as responses, not errors; only transport failures error.
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(CollectorError::Http)?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse> {
        // Query string is left out of logs: it carries the API key
        debug!("GET {}", url);

        let response = self.client.get(url).query(query).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}
