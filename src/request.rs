use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method, Url,
};
use tokio_util::sync::CancellationToken;

use crate::{Body, LangdockError, Result};

/// A fully resolved request, ready for [`LangdockClient::execute`].
///
/// Built by [`LangdockClient::build`]; owned by exactly one call.
///
/// [`LangdockClient::execute`]: crate::LangdockClient::execute
/// [`LangdockClient::build`]: crate::LangdockClient::build
#[derive(Debug)]
pub struct PreparedRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Body,
    pub(crate) max_attempts: Option<usize>,
    pub(crate) cancel: CancellationToken,
}

impl PreparedRequest {
    pub(crate) fn new(method: Method, url: Url, headers: HeaderMap, body: Body) -> Self {
        Self {
            method,
            url,
            headers,
            body,
            max_attempts: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Sets or replaces a header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| LangdockError::Construction(format!("invalid header name: {err}")))?;
        let value = HeaderValue::from_str(value).map_err(|err| {
            LangdockError::Construction(format!("invalid value for header {name}: {err}"))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Overrides the client's attempt budget for this call.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Aborts network and backoff waits once `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}

/// Joins `path` onto `base_url` and parses the result.
pub(crate) fn join_url(base_url: &str, path: &str) -> Result<Url> {
    let joined = format!("{}{}", base_url.trim_end_matches('/'), path);
    Url::parse(&joined)
        .map_err(|err| LangdockError::Construction(format!("invalid request URL '{joined}': {err}")))
}
