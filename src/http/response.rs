//! Proxy-integration response envelope.
//!
//! # Responsibilities
//! - Model the response a handler hands back to the front-end
//! - Map dispatch outcomes onto the envelope (404 on a routing miss)
//! - Turn the envelope into a real HTTP response for the local server
//!
//! # Design Decisions
//! - A malformed envelope (bad status, bad header, bad base64) becomes 502,
//!   the same answer API Gateway gives for a broken integration response
//! - Handler errors are logged here and never leak into the response body

use std::collections::BTreeMap;
use std::fmt;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// An API Gateway style proxy response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyResponse {
    pub status_code: u16,

    pub headers: BTreeMap<String, String>,

    pub body: String,

    pub is_base64_encoded: bool,
}

impl ProxyResponse {
    /// Plain response with a text body and no headers.
    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
            ..Self::default()
        }
    }

    /// JSON response with `content-type` set.
    pub fn json<T: Serialize>(status_code: u16, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::text(status_code, serde_json::to_string(value)?)
            .with_header("content-type", "application/json"))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    fn message(status_code: u16, message: &str) -> Self {
        Self::text(status_code, serde_json::json!({ "message": message }).to_string())
            .with_header("content-type", "application/json")
    }

    /// The envelope sent when no route matched.
    pub fn not_found() -> Self {
        Self::message(404, "Not Found")
    }

    /// The envelope sent when a handler failed.
    pub fn internal_error() -> Self {
        Self::message(502, "Internal server error")
    }
}

/// Map a dispatch result onto the envelope the front-end expects.
pub fn into_proxy_response<E: fmt::Display>(
    result: Result<ProxyResponse, DispatchError<E>>,
) -> ProxyResponse {
    match result {
        Ok(response) => response,
        Err(DispatchError::NotFound) => ProxyResponse::not_found(),
        Err(DispatchError::Handler(e)) => {
            tracing::error!(error = %e, "Handler failed");
            ProxyResponse::internal_error()
        }
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let Ok(status) = StatusCode::from_u16(self.status_code) else {
            tracing::error!(status_code = self.status_code, "Handler returned an invalid status code");
            return ProxyResponse::internal_error().into_response();
        };

        let body = if self.is_base64_encoded {
            match STANDARD.decode(self.body.as_bytes()) {
                Ok(bytes) => Body::from(bytes),
                Err(e) => {
                    tracing::error!(error = %e, "Handler returned an invalid base64 body");
                    return ProxyResponse::internal_error().into_response();
                }
            }
        } else {
            Body::from(self.body)
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => {
                    tracing::warn!(header = %name, "Dropping invalid response header");
                }
            }
        }
        if !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        }

        response
    }
}
