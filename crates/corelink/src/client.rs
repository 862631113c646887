//! Client session for Core
//!
//! A [`Client`] owns exactly one transport behind a
//! [`ConnectionGuard`](corelink_transport::ConnectionGuard). Every call takes
//! the guard's lock for its whole retry sequence, so requests from concurrent
//! callers never interleave, not even between the attempts of one call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use corelink_core::retry::{RetryEvent, RetryHook, RetryPolicy};
use corelink_protocol::headers::REQUEST_ID;
use corelink_transport::{ConnectionGuard, HttpRequest, HttpResponse, HttpTransport, Transport};
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::{
    config::{ClientConfig, RetrySettings},
    debug::DebugStream,
    decode,
    error::{Error, Result},
    observability::{self, RequestMetadata, RequestTimer, ResponseMetadata},
    request::EndpointRequest,
    resources::{Chaos, Cluster, Drivers, Modules, Nodes, segment},
};

/// Client session for Core.
///
/// Cloning is cheap; clones share the same session, lock and transport.
///
/// # Example
///
/// ```rust,no_run
/// use corelink::{Client, ClientConfig};
///
/// # async fn example() -> corelink::Result<()> {
/// let client = Client::new(ClientConfig::new("core.internal", 8080))?;
///
/// for driver in client.drivers().list().await? {
///     println!("{} on {:?}", driver.name, driver.branch);
/// }
///
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    base_url: Url,
    guard: ConnectionGuard<dyn Transport>,
    retry: RetryPolicy,
}

impl Client {
    /// Create a client over HTTP from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid, or a
    /// transport error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a new client builder for advanced configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client over a caller-supplied transport.
    ///
    /// Useful for tests and for transports other than plain HTTP.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::builder().config(config).transport(transport).build()
    }

    /// Run `body` against a fresh session, closing it afterwards even when
    /// `body` fails.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use corelink::{Client, ClientConfig};
    ///
    /// # async fn example() -> corelink::Result<()> {
    /// let health = Client::scoped(ClientConfig::default(), |client| async move {
    ///     client.cluster().health().await
    /// })
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scoped<F, Fut, T>(config: ClientConfig, body: F) -> Result<T>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let client = Client::new(config)?;
        let result = body(client.clone()).await;
        let closed = client.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }

    /// The configuration this session was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Retry policy applied to every request.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry
    }

    /// Driver endpoints.
    pub fn drivers(&self) -> Drivers<'_> {
        Drivers::new(self)
    }

    /// Module endpoints.
    pub fn modules(&self) -> Modules<'_> {
        Modules::new(self)
    }

    /// Per-node endpoints.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes::new(self)
    }

    /// Cluster-wide aggregates.
    pub fn cluster(&self) -> Cluster<'_> {
        Cluster::new(self)
    }

    /// Chaos experiments.
    pub fn chaos(&self) -> Chaos<'_> {
        Chaos::new(self)
    }

    /// Send `request` through the guarded retry loop.
    ///
    /// The returned response has already passed the request's status check:
    /// it is 2xx, an allowed status, or anything at all when `raises` is off.
    ///
    /// # Errors
    ///
    /// The last attempt's error once attempts are exhausted, or the first
    /// terminal error.
    pub async fn request(&self, request: EndpointRequest) -> Result<HttpResponse> {
        let request_id = self
            .inner
            .config
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let transport_request = self.build_http_request(&request, &request_id)?;

        let metadata = RequestMetadata::new(request.method.as_str(), &request.path, &request_id)
            .with_body_size(request.body_len());
        let timer = RequestTimer::start();

        let retry = &self.inner.retry;
        let request = &request;
        let metadata_ref = &metadata;
        let transport_request = &transport_request;

        let (result, stats) = self
            .inner
            .guard
            .with_connection(|transport| async move {
                let driven = retry
                    .execute_with_stats(|attempt| {
                        let transport = Arc::clone(&transport);
                        async move {
                            metadata_ref.log_attempt(attempt);
                            let response = transport.send(transport_request).await?;
                            decode::check(
                                response,
                                &request.path,
                                request.raises,
                                &request.allowed_statuses,
                            )
                        }
                    })
                    .await;
                Ok::<_, Error>(driven)
            })
            .await?;

        match &result {
            Ok(response) => ResponseMetadata::new(Some(response.status), timer.elapsed())
                .with_retries(stats.retries())
                .log_success(&metadata),
            Err(err) => ResponseMetadata::new(err.status_code(), timer.elapsed())
                .with_retries(stats.retries())
                .log_error(&metadata, &err.to_string()),
        }

        result
    }

    /// Send `request` and decode the body into `T`.
    pub async fn request_json<T: DeserializeOwned>(&self, request: EndpointRequest) -> Result<T> {
        let path = request.path.clone();
        let raises = request.raises;
        let response = self.request(request).await?;
        decode::decode(&response, &path, raises)
    }

    /// Send `request`, mapping a 404 answer to `None`.
    ///
    /// The 404 is returned un-raised by the pipeline and never retried.
    pub async fn request_optional<T: DeserializeOwned>(
        &self,
        request: EndpointRequest,
    ) -> Result<Option<T>> {
        let path = request.path.clone();
        let response = self.request(request.allow_status(404)).await?;
        if response.status == 404 {
            return Ok(None);
        }
        decode::decode(&response, &path, true).map(Some)
    }

    /// Open the debug stream of `module_id`.
    ///
    /// The stream runs on its own connection: it is not serialized against
    /// this session's lock and is never retried.
    pub async fn debug_stream(&self, module_id: &str) -> Result<DebugStream> {
        let mut url = self.inner.config.stream_base_url()?;
        let path = format!(
            "{}/modules/{}/debug",
            url.path().trim_end_matches('/'),
            segment(module_id)
        );
        url.set_path(&path);

        let mut headers = HeaderMap::new();
        if let Some(request_id) = &self.inner.config.request_id {
            headers.insert(REQUEST_ID, header_value(request_id)?);
        }
        if let Some(token) = &self.inner.config.api_token {
            headers.insert(AUTHORIZATION, bearer(token)?);
        }

        DebugStream::connect(url.as_str(), &headers, module_id).await
    }

    /// Close the session.
    ///
    /// Waits for the in-flight request, if any. Idempotent; every request made
    /// afterwards fails with [`TransportError::Closed`](corelink_transport::TransportError::Closed).
    pub async fn close(&self) -> Result<()> {
        self.inner.guard.close().await?;
        Ok(())
    }

    /// Whether [`close`](Self::close) has completed.
    pub async fn is_closed(&self) -> bool {
        self.inner.guard.is_closed().await
    }

    fn build_http_request(
        &self,
        request: &EndpointRequest,
        request_id: &str,
    ) -> Result<HttpRequest> {
        let mut url = self.inner.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        url.set_path(&path);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        let mut http_request = HttpRequest::new(request.method.clone(), url.as_str());
        http_request.headers = self.inner.config.default_headers.clone();
        for (name, value) in &request.headers {
            http_request.headers.insert(name.clone(), value.clone());
        }
        http_request
            .headers
            .insert(REQUEST_ID, header_value(request_id)?);
        if let Some(token) = &self.inner.config.api_token {
            http_request.headers.insert(AUTHORIZATION, bearer(token)?);
        }
        http_request.body = request.body.clone();

        Ok(http_request)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("max_attempts", &self.inner.retry.max_attempts())
            .finish_non_exhaustive()
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidRequest(format!("Invalid header value '{}': {}", value, e)))
}

fn bearer(token: &SecretString) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        .map_err(|_| Error::Config("api token is not a valid header value".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Builder for creating a configured Client.
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    on_retry: Option<RetryHook>,
}

impl ClientBuilder {
    /// Start from an existing configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the Core host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the Core port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set a full `http(s)://host:port` URI, overriding host and port.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.config.uri = Some(uri.into());
        self
    }

    /// Set the service segment of the base path.
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.config.service = service.into();
        self
    }

    /// Set the API version segment of the base path.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config.api_version = api_version.into();
        self
    }

    /// Send a fixed correlation id instead of a fresh one per request.
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.config.request_id = Some(request_id.into());
        self
    }

    /// Set the bearer token.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.config.api_token = Some(SecretString::new(token.into().into_boxed_str()));
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Set the write timeout.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn default_header(mut self, key: &str, value: &str) -> Result<Self> {
        let name: http::HeaderName = key
            .parse()
            .map_err(|_| Error::InvalidRequest(format!("Invalid header name: {}", key)))?;
        self.config.default_headers.insert(name, header_value(value)?);
        Ok(self)
    }

    /// Replace the retry settings.
    pub fn retry(mut self, retry: RetrySettings) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the total number of attempts per request.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.retry.max_attempts = max_attempts;
        self
    }

    /// Set the cap on any single backoff delay.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.config.retry.max_delay = max_delay;
        self
    }

    /// Call `hook` before every re-attempt, after the built-in log line.
    pub fn on_retry<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RetryEvent<'_>) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    /// Use a custom transport instead of the HTTP one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid, or a
    /// transport error if the HTTP client cannot be built.
    pub fn build(self) -> Result<Client> {
        self.config.validate()?;
        let base_url = self.config.base_url()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::with_config(self.config.transport_config())?),
        };

        let logger = observability::retry_logger();
        let retry = match self.on_retry {
            Some(user) => self.config.retry.policy().with_hook(move |event| {
                logger(event);
                user(event);
            }),
            None => self.config.retry.policy().with_shared_hook(logger),
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                config: self.config,
                base_url,
                guard: ConnectionGuard::new(transport),
                retry,
            }),
        })
    }
}
