//! Errors raised by the executor itself.
//!
//! Transport failures are not wrapped: they surface as the `reqwest::Error`
//! the transport produced and can be recovered with `downcast_ref`.

use std::time::Duration;

/// A request that completed with a status outside 200-299.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatusError {
    pub status: u16,
    pub status_text: String,
    pub url: String,
}

impl std::fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.status_text.is_empty() {
            write!(f, "HTTP {} for {}", self.status, self.url)
        } else {
            write!(f, "HTTP {} {} for {}", self.status, self.status_text, self.url)
        }
    }
}

impl std::error::Error for HttpStatusError {}

/// The per-attempt timeout fired before the attempt completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptTimeout {
    pub url: String,
    pub timeout: Duration,
}

impl std::fmt::Display for AttemptTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Request to {} aborted after {}ms",
            self.url,
            self.timeout.as_millis()
        )
    }
}

impl std::error::Error for AttemptTimeout {}
