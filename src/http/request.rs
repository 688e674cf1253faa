//! Proxy-integration request event.
//!
//! # Responsibilities
//! - Model the API Gateway proxy event fields the gateway cares about
//! - Build an event from a raw HTTP request (local server)
//! - Assign a request ID when the caller did not send one
//!
//! # Design Decisions
//! - `null` and missing maps both deserialize to empty maps
//! - UTF-8 bodies are kept verbatim, anything else is base64-encoded
//! - Header names are stored lowercase; lookups are case-insensitive

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::routing::RouteRequest;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// An API Gateway style proxy request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyRequest {
    pub path: String,

    pub http_method: String,

    #[serde(deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,

    #[serde(deserialize_with = "null_as_default")]
    pub query_string_parameters: HashMap<String, String>,

    pub body: Option<String>,

    pub is_base64_encoded: bool,

    #[serde(deserialize_with = "null_as_default")]
    pub request_context: RequestContext,
}

/// Per-request metadata added by the front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    pub request_id: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProxyRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.is_base64_encoded = false;
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Build an event from HTTP request parts and a fully read body.
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in &parts.headers {
            let Ok(value) = value.to_str() else {
                tracing::debug!(header = %name, "Skipping non-ASCII header value");
                continue;
            };
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let query_string_parameters = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        let (body, is_base64_encoded) = if body.is_empty() {
            (None, false)
        } else {
            match std::str::from_utf8(body) {
                Ok(text) => (Some(text.to_string()), false),
                Err(_) => (Some(STANDARD.encode(body)), true),
            }
        };

        let request_id = headers
            .get(X_REQUEST_ID)
            .cloned()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            path: parts.uri.path().to_string(),
            http_method: parts.method.as_str().to_string(),
            headers,
            query_string_parameters,
            body,
            is_base64_encoded,
            request_context: RequestContext { request_id },
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_context.request_id
    }
}

impl RouteRequest for ProxyRequest {
    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> &str {
        &self.http_method
    }
}
