// Transport layer: one JSON POST per call. The API client only needs the
// status code and the raw body back, which keeps it testable against an
// in-process stub instead of a live server.

use crate::error::TransportError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;

/// Server capabilities, one path segment each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Register,
    Login,
    NewRoom,
    Subscribe,
    Publish,
    Room,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::Register,
        Endpoint::Login,
        Endpoint::NewRoom,
        Endpoint::Subscribe,
        Endpoint::Publish,
        Endpoint::Room,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Register => "register",
            Endpoint::Login => "login",
            Endpoint::NewRoom => "newroom",
            Endpoint::Subscribe => "subscribe",
            Endpoint::Publish => "publish",
            Endpoint::Room => "room",
        }
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

pub trait Transport {
    fn post_json(
        &self,
        endpoint: Endpoint,
        body: &serde_json::Value,
    ) -> Result<RawResponse, TransportError>;
}

/// Blocking reqwest transport against a fixed base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &self,
        endpoint: Endpoint,
        body: &serde_json::Value,
    ) -> Result<RawResponse, TransportError> {
        let url = self.url(endpoint);
        tracing::debug!(%url, "POST");
        let res = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| TransportError(e.to_string()))?;
        let status = res.status().as_u16();
        let body = res.text().map_err(|e| TransportError(e.to_string()))?;
        tracing::debug!(%url, status, "response received");
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths_are_unique() {
        let mut paths: Vec<_> = Endpoint::ALL.iter().map(|e| e.path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Endpoint::ALL.len());
    }

    #[test]
    fn url_joins_without_double_slash() {
        let transport = HttpTransport::new("https://chat.example.com/").unwrap();
        assert_eq!(
            transport.url(Endpoint::NewRoom),
            "https://chat.example.com/newroom"
        );

        let transport = HttpTransport::new("http://127.0.0.1:9000/api").unwrap();
        assert_eq!(transport.url(Endpoint::Login), "http://127.0.0.1:9000/api/login");
    }
}
