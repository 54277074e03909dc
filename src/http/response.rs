use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use super::error::HttpStatusError;

/// A fully received response before classification and decoding.
///
/// Response interceptors take and return this value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Drains a transport response into memory.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let url = response.url().to_string();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?
            .to_vec();

        Ok(Self {
            url,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fails with [`HttpStatusError`] when the status is outside 200-299.
    pub fn error_for_status(self) -> Result<Self, HttpStatusError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpStatusError {
                status: self.status,
                status_text: self.status_text,
                url: self.url,
            })
        }
    }

    /// Decodes the body as JSON, regardless of the declared content type.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Response<T>> {
        let data = serde_json::from_slice(&self.body)
            .with_context(|| format!("Failed to parse JSON response from {}", self.url))?;
        Ok(Response {
            data,
            status: self.status,
            headers: self.headers,
        })
    }
}

/// A decoded successful response.
#[derive(Debug, Clone)]
pub struct Response<T> {
    data: T,
    status: u16,
    headers: HeaderMap,
}

impl<T> Response<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn into_data(self) -> T {
        self.data
    }
}
