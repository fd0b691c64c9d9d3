/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum LangdockError {
    /// The request could not be built (bad address, bad header).
    #[error("invalid request: {0}")]
    Construction(String),
    /// The body regenerator failed to produce a fresh copy.
    #[error("request body error: {0}")]
    Body(#[source] std::io::Error),
    /// A retry was required but the request body was already consumed.
    #[error("request body is not replayable; last failure: {last}")]
    BodyNotReplayable {
        /// Transient failure that triggered the retry.
        last: Box<LangdockError>,
    },
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// Upstream answered `429 Too Many Requests`.
    #[error("rate limit exceeded")]
    RateLimited,
    /// Upstream answered with a 5xx status.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },
    /// Upstream answered with a 4xx other than 429.
    #[error("request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    /// Response body did not match the expected shape.
    #[error("decode error (status {status}): {source}")]
    Decode {
        /// Status of the response that carried the body.
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    /// A response body was required but the upstream sent none.
    #[error("empty response body for {0}")]
    EmptyResponse(String),
    /// The caller's cancellation token fired.
    #[error("request cancelled")]
    Cancelled,
}

impl LangdockError {
    /// Returns `true` when the failure is eligible for another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited | Self::Server { .. } => true,
            Self::Transport(err) => is_network_error(err),
            _ => false,
        }
    }
}

pub(crate) fn is_network_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}
