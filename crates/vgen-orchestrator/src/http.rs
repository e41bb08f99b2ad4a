//! HTTP transport for provider calls.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use vgen_providers::status::truncate_chars;
use vgen_providers::{HttpCall, HttpMethod};

use crate::error::{GenerationError, GenerationResult};

/// Maximum characters of an error body carried in [`GenerationError::HttpStatus`].
const MAX_ERROR_BODY: usize = 200;

/// Executes [`HttpCall`]s built by provider adapters.
#[derive(Debug, Clone)]
pub struct ProviderHttp {
    http: Client,
}

impl ProviderHttp {
    /// Build a client with a per-request timeout and optional proxy.
    pub fn new(timeout: Duration, proxy: Option<&str>) -> GenerationResult<Self> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(url) = proxy {
            let proxy = reqwest::Proxy::all(url)
                .map_err(|e| GenerationError::invalid_request(format!("invalid proxy url: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| GenerationError::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }

    /// Send `call` and decode the JSON response body.
    ///
    /// Non-2xx statuses become [`GenerationError::HttpStatus`]; an empty body
    /// decodes as an empty object.
    pub async fn execute(&self, call: &HttpCall) -> GenerationResult<Value> {
        let mut request = match call.method {
            HttpMethod::Get => self.http.get(&call.url),
            HttpMethod::Post => self.http.post(&call.url),
        };
        for (name, value) in &call.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &call.body {
            request = request.body(body.to_string());
        }

        debug!(method = call.method.as_str(), url = %call.url, "Provider request");

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(GenerationError::HttpStatus {
                status: status.as_u16(),
                body: truncate_chars(&text, MAX_ERROR_BODY),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        serde_json::from_str(&text).map_err(|e| {
            GenerationError::malformed(format!("invalid JSON: {}", truncate_chars(&e.to_string(), 100)))
        })
    }
}

fn transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::network("request timed out")
    } else {
        GenerationError::network(truncate_chars(&err.to_string(), 100))
    }
}
