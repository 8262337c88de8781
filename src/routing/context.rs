//! Request and response surfaces seen by business handlers.
//!
//! # Responsibilities
//! - Carry path parameters, body bytes and request metadata to handlers
//! - Provide the uniform success / error JSON envelopes
//! - Define the boxed handler capability installed by the builder
//!
//! # Design Decisions
//! - Handlers see a plain owned context, never the underlying hyper types
//! - Responses are status + pre-encoded JSON body (no streaming needed)
//! - Metadata is a free-form string map so middleware can attach context
//!   (request ids, auth results) without new types

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;

/// Everything a business handler may inspect about an inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Path parameters captured by the router (e.g. `userid`).
    pub params: HashMap<String, String>,
    /// HTTP method, uppercase.
    pub method: String,
    /// Full request path as received.
    pub path: String,
    /// Request headers, names lowercased. Multi-valued headers keep the
    /// first value only.
    pub headers: HashMap<String, String>,
    /// Raw body bytes.
    pub body: Bytes,
    /// Free-form metadata attached by middleware.
    pub metadata: HashMap<String, String>,
}

impl RequestContext {
    /// Look up a path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Look up a path parameter, erroring if the route did not capture it.
    pub fn require_param(&self, name: &'static str) -> Result<String, ApiError> {
        self.param(name)
            .map(str::to_owned)
            .ok_or(ApiError::MissingParam(name))
    }

    /// Look up a header by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Decode the body as JSON, all-or-nothing. An empty body decodes as
    /// the empty object so that defaulted schemas accept bodiless calls.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let raw: &[u8] = if self.body.is_empty() {
            b"{}"
        } else {
            &self.body
        };
        serde_json::from_slice(raw).map_err(ApiError::Decode)
    }
}

/// Response produced by a handler: a status and a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Uniform success envelope: `{"success": true}`.
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope {
    pub success: bool,
}

/// Uniform error envelope: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl Response {
    /// Encode `value` as the response body.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Response {
        match serde_json::to_vec(value) {
            Ok(body) => Response {
                status,
                body: Bytes::from(body),
            },
            Err(err) => {
                tracing::error!(error = %err, "response encoding failed");
                Response::error(StatusCode::INTERNAL_SERVER_ERROR, "encoding failure")
            }
        }
    }

    /// The `{"success": true}` envelope with status 200.
    pub fn success() -> Response {
        Response::json(StatusCode::OK, &SuccessEnvelope { success: true })
    }

    /// The `{"error": …}` envelope with the given status.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
        Response::json(
            status,
            &ErrorEnvelope {
                error: message.into(),
            },
        )
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

/// The handler capability: `RequestContext → Response`, boxed so filters
/// and middleware can be composed around it uniformly.
pub type BoxHandler =
    std::sync::Arc<dyn Fn(RequestContext) -> BoxFuture<'static, Response> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_empty_body_as_empty_object() {
        #[derive(serde::Deserialize, Default, PartialEq, Debug)]
        #[serde(default)]
        struct Probe {
            name: String,
        }

        let ctx = RequestContext::default();
        let probe: Probe = ctx.decode().unwrap();
        assert_eq!(probe, Probe::default());
    }

    #[test]
    fn decode_rejects_malformed_body() {
        let ctx = RequestContext {
            body: Bytes::from_static(b"{not json"),
            ..RequestContext::default()
        };
        let result: Result<serde_json::Value, _> = ctx.decode();
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn envelopes_have_uniform_shape() {
        let ok = Response::success();
        assert_eq!(ok.status, StatusCode::OK);
        assert_eq!(&ok.body[..], br#"{"success":true}"#);

        let err = Response::error(StatusCode::FORBIDDEN, "forbidden");
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(&err.body[..], br#"{"error":"forbidden"}"#);
    }
}
