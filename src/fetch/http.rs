//! Blocking HTTP transport.

use std::time::Duration;

use super::{FetchRequest, HttpClient, HttpResponse, TransportError};

/// [`HttpClient`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    http: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Build a client with the given user agent and per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { http })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, request: &FetchRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.http.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(classify)?;

        log::trace!("GET {} -> {status} ({} bytes)", request.url, body.len());
        Ok(HttpResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}
