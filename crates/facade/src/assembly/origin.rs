//! Return URLs derived from the inbound request's own origin.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

/// Path the gateway posts payment results to.
pub const CALLBACK_PATH: &str = "/api/callback";
/// Path the buyer lands on after a successful payment.
pub const SUCCESS_PATH: &str = "/payment/success";
/// Path the buyer lands on after a failed payment.
pub const FAILURE_PATH: &str = "/payment/failure";

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// `scheme://host[:port]` of the request being served.
///
/// Proxy headers (`X-Forwarded-Proto`, `X-Forwarded-Host`) take precedence
/// over the `Host` header; the scheme defaults to `http`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(origin: RequestOrigin) -> String {
///     origin.return_urls().success_url
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(String);

impl RequestOrigin {
    /// Wrap an already-known origin such as `https://shop.example.com`.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        let origin: String = origin.into();
        Self(origin.trim_end_matches('/').to_string())
    }

    /// Derive the origin from request headers, falling back to the URI.
    #[must_use]
    pub fn from_parts(headers: &HeaderMap, uri: &axum::http::Uri) -> Self {
        let first_value = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let scheme = first_value(FORWARDED_PROTO)
            .or_else(|| uri.scheme_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string());
        let host = first_value(FORWARDED_HOST)
            .or_else(|| first_value(header::HOST.as_str()))
            .or_else(|| uri.authority().map(ToString::to_string))
            .unwrap_or_else(|| "localhost".to_string());

        Self(format!("{scheme}://{host}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The three URLs handed to the gateway for this request.
    #[must_use]
    pub fn return_urls(&self) -> ReturnUrls {
        ReturnUrls {
            callback_url: format!("{}{CALLBACK_PATH}", self.0),
            success_url: format!("{}{SUCCESS_PATH}", self.0),
            failure_url: format!("{}{FAILURE_PATH}", self.0),
        }
    }
}

impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(&parts.headers, &parts.uri))
    }
}

/// Callback and redirect URLs for one checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnUrls {
    pub callback_url: String,
    pub success_url: String,
    pub failure_url: String,
}
