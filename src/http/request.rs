//! Outgoing request description: verbs, per-call options and the descriptor
//! that interceptors transform before dispatch.

use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Whether ambient credentials (cookies) travel with a request.
///
/// Every URL is built from the configured base URL, so every request is
/// same-origin: only [`Credentials::Omit`] changes what is sent. Headers set
/// explicitly, including the configured bearer token, are never affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    /// Strip `Cookie` before dispatch.
    Omit,
    #[default]
    SameOrigin,
    Include,
}

/// Per-call options. Only `headers` and `credentials` are recognised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallConfig {
    /// Merged over the default headers; these win on conflict.
    pub headers: BTreeMap<String, String>,
    pub credentials: Option<Credentials>,
}

impl CallConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Converts the header mapping, failing on names or values the wire cannot carry.
    pub(crate) fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name '{}'", name))?;
            let header_value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header '{}'", name))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }
}

/// Everything needed to dispatch one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    pub credentials: Credentials,
}

impl RequestDescriptor {
    /// Headers as they go on the wire once the credentials policy is applied.
    pub fn dispatch_headers(&self) -> HeaderMap {
        strip_credentials(self.headers.clone(), self.credentials)
    }
}

pub(crate) fn strip_credentials(mut headers: HeaderMap, credentials: Credentials) -> HeaderMap {
    if credentials == Credentials::Omit {
        headers.remove(COOKIE);
    }
    headers
}

/// `Authorization: Bearer <token>`, marked sensitive so it is redacted in debug output.
pub(crate) fn bearer(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .context("Auth token is not a valid header value")?;
    value.set_sensitive(true);
    Ok(value)
}

/// Default headers for JSON requests: content type, then caller headers, then auth.
pub(crate) fn json_headers(call: &CallConfig, auth_token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.extend(call.header_map()?);
    if let Some(token) = auth_token {
        headers.insert(AUTHORIZATION, bearer(token)?);
    }
    Ok(headers)
}

/// Headers for upload and download: caller headers and auth only.
pub(crate) fn plain_headers(call: &CallConfig, auth_token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = call.header_map()?;
    if let Some(token) = auth_token {
        headers.insert(AUTHORIZATION, bearer(token)?);
    }
    Ok(headers)
}
