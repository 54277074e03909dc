use std::time::Duration;

/// Per-attempt timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Number of attempts made by the retrying request path when none is configured.
pub const DEFAULT_RETRIES: u32 = 3;

/// Settings shared by every request issued through a [`crate::http::RequestExecutor`].
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for every endpoint. Endpoints are appended verbatim.
    pub base_url: String,
    /// Budget for a single attempt, not for the whole call.
    pub timeout: Duration,
    /// Total number of attempts on the retrying path.
    pub retries: u32,
    pub auth_token: Option<String>,
    /// Kept for callers that sign requests themselves; never sent.
    pub service_secret: Option<String>,
    pub log_requests: bool,
    pub log_responses: bool,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retries: DEFAULT_RETRIES,
            auth_token: None,
            service_secret: None,
            log_requests: false,
            log_responses: false,
        }
    }
}

// Secrets are masked so a config can be logged safely.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("auth_token", &self.auth_token.as_deref().map(mask))
            .field("service_secret", &self.service_secret.as_deref().map(mask))
            .field("log_requests", &self.log_requests)
            .field("log_responses", &self.log_responses)
            .finish()
    }
}

/// Shows at most the first and last four characters of a secret.
pub(crate) fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
