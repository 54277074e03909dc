//! Request dispatch with retry, per-attempt timeout, auth injection and
//! interceptor chains.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use super::interceptor::{
    Chain, RequestChain, RequestInterceptor, ResponseChain, ResponseInterceptor,
};
use super::logger::{LogFacade, Logger};
use super::request::{
    CallConfig, Method, RequestDescriptor, json_headers, plain_headers, strip_credentials,
};
use super::response::{RawResponse, Response};
use super::retry::{once, with_retry, with_timeout};
use super::upload::UploadFile;
use crate::config::ClientConfig;

/// Turns logical requests into completed responses or a final error.
///
/// Configuration and interceptor chains are fixed at build time; clones share
/// them and may be used concurrently.
#[derive(Clone)]
pub struct RequestExecutor {
    client: Client,
    config: Arc<ClientConfig>,
    request_chain: RequestChain,
    response_chain: ResponseChain,
    logger: Arc<dyn Logger>,
}

impl RequestExecutor {
    /// Executor with default timeout and retry count.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// Executor using every setting in `config`.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        ExecutorBuilder::from_config(config).build()
    }

    /// Starts a builder with default settings for `base_url`.
    pub fn builder(base_url: impl Into<String>) -> ExecutorBuilder {
        ExecutorBuilder::from_config(ClientConfig::new(base_url))
    }

    /// Settings this executor was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Stored for callers that need it; no request path reads it.
    pub fn service_secret(&self) -> Option<&str> {
        self.config.service_secret.as_deref()
    }

    /// Sends a request, retrying every failure until the attempt budget is spent.
    ///
    /// The body is sent as JSON and a successful body is decoded as JSON into
    /// `T`. After the last attempt the error is returned as raised: a
    /// `reqwest::Error`, an [`AttemptTimeout`](super::AttemptTimeout), an
    /// [`HttpStatusError`](super::HttpStatusError) or a `serde_json::Error`,
    /// all reachable with `downcast_ref`.
    #[tracing::instrument(skip(self, body, call))]
    pub async fn execute<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        call: Option<&CallConfig>,
    ) -> Result<Response<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let descriptor = self.descriptor(method, endpoint, body, call)?;
        let descriptor = self.request_chain.apply(descriptor);

        if self.config.log_requests {
            self.logger.log(&format!(
                "Request: {} {} {:?}",
                descriptor.method, descriptor.url, descriptor
            ));
        }

        let operation_name = format!("{} {}", descriptor.method, descriptor.url);
        let descriptor = &descriptor;

        let logger = self.logger.as_ref();

        with_retry(&operation_name, self.config.retries, logger, |attempt| async move {
            debug!("{} {}: attempt {}", descriptor.method, descriptor.url, attempt + 1);

            let response = with_timeout(
                &descriptor.url,
                self.config.timeout,
                self.dispatch(descriptor),
            )
            .await?;
            let raw = RawResponse::read(response).await?;
            self.log_response(&raw);
            let raw = self.response_chain.apply(raw);

            raw.error_for_status()?.decode()
        })
        .await
    }

    /// GET `endpoint` with retries and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        call: Option<&CallConfig>,
    ) -> Result<Response<T>> {
        self.execute::<(), T>(Method::Get, endpoint, None, call).await
    }

    /// POST `body` as JSON with retries and decode the JSON response.
    pub async fn post<B, T>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        call: Option<&CallConfig>,
    ) -> Result<Response<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::Post, endpoint, body, call).await
    }

    /// PUT `body` as JSON with retries and decode the JSON response.
    pub async fn put<B, T>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        call: Option<&CallConfig>,
    ) -> Result<Response<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::Put, endpoint, body, call).await
    }

    /// DELETE `endpoint` with retries and decode the JSON response.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        call: Option<&CallConfig>,
    ) -> Result<Response<T>> {
        self.execute::<(), T>(Method::Delete, endpoint, None, call).await
    }

    /// Posts `file` as a multipart form in a single attempt.
    ///
    /// Only call-config headers and the auth token are sent; the transport
    /// supplies the multipart content type.
    #[tracing::instrument(skip(self, file, call))]
    pub async fn upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        file: UploadFile,
        call: Option<&CallConfig>,
    ) -> Result<Response<T>> {
        let url = self.url(endpoint);
        let operation_name = format!("POST {} (upload)", url);

        once(&operation_name, self.logger.as_ref(), async {
            let headers = self.plain_headers(call)?;
            if self.config.log_requests {
                self.logger.log(&format!(
                    "Request: POST {} upload of '{}' ({} bytes) {:?}",
                    url,
                    file.file_name,
                    file.bytes.len(),
                    headers
                ));
            }
            let form = file.into_form()?;

            let request = self.client.post(&url).headers(headers).multipart(form);
            let response = with_timeout(&url, self.config.timeout, async {
                request.send().await.context("Failed to send upload request")
            })
            .await?;
            let raw = RawResponse::read(response).await?;
            self.log_response(&raw);
            raw.error_for_status()?.decode()
        })
        .await
    }

    /// Fetches `endpoint` in a single attempt and returns the body bytes unparsed.
    #[tracing::instrument(skip(self, call))]
    pub async fn download(&self, endpoint: &str, call: Option<&CallConfig>) -> Result<Vec<u8>> {
        let url = self.url(endpoint);
        let operation_name = format!("GET {} (download)", url);

        once(&operation_name, self.logger.as_ref(), async {
            let headers = self.plain_headers(call)?;
            if self.config.log_requests {
                self.logger
                    .log(&format!("Request: GET {} download {:?}", url, headers));
            }

            let request = self.client.get(&url).headers(headers);
            let response = with_timeout(&url, self.config.timeout, async {
                request.send().await.context("Failed to start download request")
            })
            .await?;
            let raw = RawResponse::read(response).await?;
            self.log_response(&raw);
            Ok(raw.error_for_status()?.body)
        })
        .await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    fn descriptor<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        call: Option<&CallConfig>,
    ) -> Result<RequestDescriptor> {
        let call = call.cloned().unwrap_or_default();
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .context("Failed to serialize request body")?;

        Ok(RequestDescriptor {
            method,
            url: self.url(endpoint),
            headers: json_headers(&call, self.config.auth_token.as_deref())?,
            body,
            credentials: call.credentials.unwrap_or_default(),
        })
    }

    fn plain_headers(&self, call: Option<&CallConfig>) -> Result<reqwest::header::HeaderMap> {
        let call = call.cloned().unwrap_or_default();
        let headers = plain_headers(&call, self.config.auth_token.as_deref())?;
        Ok(strip_credentials(headers, call.credentials.unwrap_or_default()))
    }

    /// Sends the request and resolves once the response head has arrived.
    async fn dispatch(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Response> {
        let mut request = self
            .client
            .request(descriptor.method.into(), &descriptor.url)
            .headers(descriptor.dispatch_headers());
        if let Some(body) = &descriptor.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        request.send().await.context("Failed to send request")
    }

    fn log_response(&self, raw: &RawResponse) {
        if self.config.log_responses {
            self.logger.log(&format!(
                "Response: {} {} {:?} ({} bytes)",
                raw.status,
                raw.url,
                raw.headers,
                raw.body.len()
            ));
        }
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .field("request_chain", &self.request_chain)
            .field("response_chain", &self.response_chain)
            .finish()
    }
}

/// Collects configuration and interceptors for a [`RequestExecutor`].
pub struct ExecutorBuilder {
    config: ClientConfig,
    client: Option<Client>,
    request_interceptors: Vec<RequestInterceptor>,
    response_interceptors: Vec<ResponseInterceptor>,
    logger: Arc<dyn Logger>,
}

impl ExecutorBuilder {
    /// Builder seeded with `config`; no interceptors, logs through [`LogFacade`].
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            client: None,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            logger: Arc::new(LogFacade),
        }
    }

    /// Budget for each attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    /// Total attempts on the retrying path.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Sent as `Authorization: Bearer <token>` on every request.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = Some(token.into());
        self
    }

    pub fn service_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.service_secret = Some(secret.into());
        self
    }

    /// Log each request descriptor before dispatch.
    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.config.log_requests = enabled;
        self
    }

    /// Log each response before interceptors run.
    pub fn log_responses(mut self, enabled: bool) -> Self {
        self.config.log_responses = enabled;
        self
    }

    /// Appends to the request chain. Interceptors run in the order added.
    pub fn request_interceptor<F>(mut self, interceptor: F) -> Self
    where
        F: Fn(RequestDescriptor) -> RequestDescriptor + Send + Sync + 'static,
    {
        self.request_interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends to the response chain. Interceptors run in the order added.
    pub fn response_interceptor<F>(mut self, interceptor: F) -> Self
    where
        F: Fn(RawResponse) -> RawResponse + Send + Sync + 'static,
    {
        self.response_interceptors.push(Arc::new(interceptor));
        self
    }

    /// Where diagnostics go.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Uses `client` as the transport instead of building one.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<RequestExecutor> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(concat!("fetchwrap/", env!("FETCHWRAP_VERSION")))
                .build()
                .context("Failed to build HTTP client")?,
        };

        debug!("Building executor with {:?}", self.config);

        Ok(RequestExecutor {
            client,
            config: Arc::new(self.config),
            request_chain: Chain::new(self.request_interceptors),
            response_chain: Chain::new(self.response_interceptors),
            logger: self.logger,
        })
    }
}
