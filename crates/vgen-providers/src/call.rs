//! Provider-agnostic description of one HTTP call.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Method, URL, headers and optional JSON body of a provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpCall {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpCall {
    /// Authorized JSON POST.
    pub fn post_json(url: impl Into<String>, token: &str, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![authorization(token), content_type_json()],
            body: Some(body),
        }
    }

    /// Authorized GET without a body.
    pub fn get(url: impl Into<String>, token: &str) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: vec![authorization(token)],
            body: None,
        }
    }

    /// Add the JSON content type header, if absent.
    pub fn with_json_content_type(mut self) -> Self {
        if self.header("Content-Type").is_none() {
            self.headers.push(content_type_json());
        }
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn authorization(token: &str) -> (String, String) {
    ("Authorization".to_string(), format!("Bearer {}", token))
}

fn content_type_json() -> (String, String) {
    ("Content-Type".to_string(), "application/json".to_string())
}
