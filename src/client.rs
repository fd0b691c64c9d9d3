use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use bytes::Bytes;
use rand::{rngs::StdRng, SeedableRng};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    backoff::jittered_delay,
    body::ReplayError,
    error::is_network_error,
    knowledge::Knowledge,
    request::{join_url, PreparedRequest},
    Body, ClientOptions, LangdockError, Result,
};

/// Address used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.langdock.com";

/// Opt-in observer for delivered responses: status and raw body bytes.
pub type ResponseHook = Arc<dyn Fn(StatusCode, &[u8]) + Send + Sync>;

/// HTTP client for the Langdock API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct LangdockClient {
    http: reqwest::Client,
    base_url: String,
    authorization: String,
    options: ClientOptions,
    response_hook: Option<ResponseHook>,
    calls: Arc<AtomicU64>,
}

/// Decoded response body together with the status that carried it.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded<T> {
    pub status: StatusCode,
    /// `None` when the response body was empty.
    pub value: Option<T>,
}

impl fmt::Debug for LangdockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LangdockClient")
            .field("base_url", &self.base_url)
            .field("authorization", &"<redacted>")
            .field("options", &self.options)
            .field("response_hook", &self.response_hook.is_some())
            .finish()
    }
}

/// Result of a single delivery attempt.
enum Attempt {
    Delivered(Delivered),
    Transient(LangdockError),
    Fatal(LangdockError),
}

struct Delivered {
    status: StatusCode,
    body: Bytes,
}

impl LangdockClient {
    /// Creates a client for the public Langdock API.
    ///
    /// If the key is missing the `Bearer ` prefix, it is added automatically.
    pub fn new(api_key: impl AsRef<str>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Creates a client against a custom base address, e.g. a regional
    /// deployment or a local mock.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl AsRef<str>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            authorization: normalize_bearer_authorization(api_key.as_ref()),
            options: ClientOptions::default(),
            response_hook: None,
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `LANGDOCK_API_KEY` — API key (Bearer prefix optional)
    /// - `LANGDOCK_BASE_URL` — optional, defaults to [`DEFAULT_BASE_URL`]
    ///
    /// Returns an error if the key is missing or empty.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use langdock_http::LangdockClient;
    ///
    /// let client = LangdockClient::from_env().expect("missing LANGDOCK_API_KEY");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        let api_key = std::env::var("LANGDOCK_API_KEY")
            .map_err(|_| "missing LANGDOCK_API_KEY environment variable".to_owned())?;
        if api_key.trim().is_empty() {
            return Err("LANGDOCK_API_KEY is set but empty".to_owned());
        }
        let base_url = std::env::var("LANGDOCK_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Ok(Self::with_base_url(base_url, api_key))
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Replaces the underlying transport.
    ///
    /// The per-request timeout from [`ClientOptions::timeout_ms`] still applies.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Installs a hook that sees the status and raw body of every delivered
    /// response, before decoding.
    pub fn with_response_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(StatusCode, &[u8]) + Send + Sync + 'static,
    {
        self.response_hook = Some(Arc::new(hook));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Knowledge folder operations.
    pub fn knowledge(&self) -> Knowledge<'_> {
        Knowledge::new(self)
    }

    /// Builds a request against `path`, relative to the base address.
    ///
    /// Attaches `Accept: application/json` and the bearer credential. The
    /// body is passed through untouched.
    pub fn build(
        &self,
        method: Method,
        path: &str,
        body: impl Into<Body>,
    ) -> Result<PreparedRequest> {
        let url = join_url(&self.base_url, path)?;

        let mut authorization = HeaderValue::from_str(&self.authorization).map_err(|_| {
            LangdockError::Construction("API key is not a valid header value".to_owned())
        })?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::AUTHORIZATION, authorization);

        Ok(PreparedRequest::new(method, url, headers, body.into()))
    }

    /// Delivers `request` with retries and decodes the JSON response into `T`.
    ///
    /// Returns `Ok(None)` when the response body is empty. Statuses other
    /// than 429 and 5xx are not retried; their body is decoded as-is.
    pub async fn execute<T: DeserializeOwned>(&self, request: PreparedRequest) -> Result<Option<T>> {
        self.execute_decoded(request).await.map(|decoded| decoded.value)
    }

    /// Same as [`execute`](Self::execute), but keeps the response status so
    /// callers can tell a 4xx apart from a success.
    pub async fn execute_decoded<T: DeserializeOwned>(
        &self,
        request: PreparedRequest,
    ) -> Result<Decoded<T>> {
        let delivered = self.send_with_retry(request).await?;
        let status = delivered.status;
        let value = decode_body(delivered)?;
        Ok(Decoded { status, value })
    }

    /// Same as [`execute`](Self::execute), but a 4xx response fails with
    /// [`LangdockError::Rejected`] instead of being decoded.
    pub async fn execute_checked<T: DeserializeOwned>(
        &self,
        request: PreparedRequest,
    ) -> Result<Option<T>> {
        decode_body(self.send_checked(request).await?)
    }

    /// Delivers `request` with retries, ignores the body and returns the
    /// final status.
    pub async fn execute_discard(&self, request: PreparedRequest) -> Result<StatusCode> {
        self.send_with_retry(request)
            .await
            .map(|delivered| delivered.status)
    }

    /// Delivers `request` with retries and ignores the body; a 4xx response
    /// fails with [`LangdockError::Rejected`].
    pub(crate) async fn execute_checked_discard(&self, request: PreparedRequest) -> Result<()> {
        self.send_checked(request).await.map(|_| ())
    }

    async fn send_checked(&self, request: PreparedRequest) -> Result<Delivered> {
        let delivered = self.send_with_retry(request).await?;
        if delivered.status.is_client_error() {
            return Err(LangdockError::Rejected {
                status: delivered.status.as_u16(),
                body: String::from_utf8_lossy(&delivered.body).into_owned(),
            });
        }
        Ok(delivered)
    }

    /// Jitter source for one call.
    ///
    /// With a configured seed, every call mixes its sequence number into the
    /// seed so concurrent calls do not back off in lockstep.
    fn call_rng(&self) -> StdRng {
        match self.options.jitter_seed {
            Some(seed) => {
                let call = self.calls.fetch_add(1, Ordering::Relaxed);
                StdRng::seed_from_u64(seed ^ call.wrapping_mul(0x9E37_79B9_7F4A_7C15))
            }
            None => StdRng::from_entropy(),
        }
    }

    async fn send_with_retry(&self, mut request: PreparedRequest) -> Result<Delivered> {
        let max_attempts = request
            .max_attempts
            .unwrap_or(self.options.max_attempts)
            .max(1);
        let mut rng = self.call_rng();
        let base = Duration::from_millis(self.options.retry_backoff_ms);
        let cap = Duration::from_millis(self.options.max_backoff_ms);

        let mut attempt = 0usize;
        let mut last: Option<LangdockError> = None;
        loop {
            let body = match request.body.next_attempt() {
                Ok(body) => body,
                Err(ReplayError::Regenerate(err)) => return Err(LangdockError::Body(err)),
                Err(ReplayError::NotReplayable) => {
                    return Err(match last {
                        Some(last) => LangdockError::BodyNotReplayable {
                            last: Box::new(last),
                        },
                        None => LangdockError::Construction(
                            "request body was already consumed".to_owned(),
                        ),
                    });
                }
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                max_attempts,
                "sending request"
            );

            let outcome = tokio::select! {
                biased;
                _ = request.cancel.cancelled() => return Err(LangdockError::Cancelled),
                outcome = self.attempt(&request, body) => outcome,
            };

            let cause = match outcome {
                Attempt::Delivered(delivered) => return Ok(delivered),
                Attempt::Fatal(err) => return Err(err),
                Attempt::Transient(err) => err,
            };

            attempt += 1;
            if attempt >= max_attempts {
                #[cfg(feature = "tracing")]
                tracing::warn!(attempts = attempt, error = %cause, "retry budget exhausted");
                return Err(cause);
            }

            let exp = u32::try_from(attempt).unwrap_or(u32::MAX);
            let delay = jittered_delay(exp, base, cap, &mut rng);

            #[cfg(feature = "tracing")]
            tracing::debug!(
                delay_ms = delay.as_millis() as u64,
                error = %cause,
                "retrying request"
            );

            tokio::select! {
                biased;
                _ = request.cancel.cancelled() => return Err(LangdockError::Cancelled),
                _ = sleep(delay) => {}
            }
            last = Some(cause);
        }
    }

    async fn attempt(&self, request: &PreparedRequest, body: Option<reqwest::Body>) -> Attempt {
        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .timeout(Duration::from_millis(self.options.timeout_ms));
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return classify_transport(err),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Attempt::Transient(LangdockError::RateLimited);
        }
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Attempt::Transient(LangdockError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => return classify_transport(err),
        };

        #[cfg(feature = "tracing")]
        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), "request rejected by upstream");
        }

        if let Some(hook) = &self.response_hook {
            hook(status, &body);
        }

        Attempt::Delivered(Delivered { status, body })
    }
}

fn classify_transport(err: reqwest::Error) -> Attempt {
    if is_network_error(&err) {
        Attempt::Transient(LangdockError::Transport(err))
    } else {
        Attempt::Fatal(LangdockError::Transport(err))
    }
}

fn decode_body<T: DeserializeOwned>(delivered: Delivered) -> Result<Option<T>> {
    if delivered.body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(&delivered.body)
        .map(Some)
        .map_err(|source| LangdockError::Decode {
            status: delivered.status.as_u16(),
            source,
        })
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
