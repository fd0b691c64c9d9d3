use std::{fmt, io, sync::Arc};

use bytes::Bytes;
use serde::Serialize;

use crate::LangdockError;

/// Produces a fresh copy of a request payload for every attempt.
pub type Regenerator = Arc<dyn Fn() -> io::Result<Bytes> + Send + Sync>;

/// Request payload that knows whether it can be sent more than once.
///
/// Buffered and regenerator-backed bodies are replayed byte-for-byte on
/// every retry. A one-shot body is replayed only when reqwest already holds
/// it in memory; otherwise a retry fails with
/// [`LangdockError::BodyNotReplayable`].
pub struct Body {
    inner: Inner,
}

enum Inner {
    Empty,
    Buffered(Bytes),
    Regenerated(Regenerator),
    OneShot(Option<reqwest::Body>),
}

pub(crate) enum ReplayError {
    Regenerate(io::Error),
    NotReplayable,
}

impl Body {
    /// No payload.
    pub fn empty() -> Self {
        Self {
            inner: Inner::Empty,
        }
    }

    /// In-memory payload, shared across attempts without copying.
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            inner: Inner::Buffered(bytes.into()),
        }
    }

    /// Serializes `value` as JSON into a buffered payload.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, LangdockError> {
        let encoded = serde_json::to_vec(value).map_err(|err| {
            LangdockError::Construction(format!("request body is not valid JSON: {err}"))
        })?;
        Ok(Self::bytes(encoded))
    }

    /// Payload produced by `regenerate`, called once per attempt.
    pub fn regenerate<F>(regenerate: F) -> Self
    where
        F: Fn() -> io::Result<Bytes> + Send + Sync + 'static,
    {
        Self {
            inner: Inner::Regenerated(Arc::new(regenerate)),
        }
    }

    /// Payload that may only be readable once, such as a stream.
    pub fn once(body: impl Into<reqwest::Body>) -> Self {
        Self {
            inner: Inner::OneShot(Some(body.into())),
        }
    }

    /// Returns `true` if the body can be sent again after being consumed.
    pub fn is_replayable(&self) -> bool {
        match &self.inner {
            Inner::Empty | Inner::Buffered(_) | Inner::Regenerated(_) => true,
            Inner::OneShot(Some(body)) => body.as_bytes().is_some(),
            Inner::OneShot(None) => false,
        }
    }

    /// Hands out the payload for the next attempt.
    pub(crate) fn next_attempt(&mut self) -> Result<Option<reqwest::Body>, ReplayError> {
        match &mut self.inner {
            Inner::Empty => Ok(None),
            Inner::Buffered(bytes) => Ok(Some(bytes.clone().into())),
            Inner::Regenerated(regenerate) => regenerate()
                .map(|bytes| Some(bytes.into()))
                .map_err(ReplayError::Regenerate),
            Inner::OneShot(slot) => {
                let body = slot.take().ok_or(ReplayError::NotReplayable)?;
                if let Some(buffered) = body.as_bytes() {
                    let bytes = Bytes::copy_from_slice(buffered);
                    self.inner = Inner::Buffered(bytes.clone());
                    return Ok(Some(bytes.into()));
                }
                Ok(Some(body))
            }
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::bytes(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::bytes(text)
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::bytes(text)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Empty => f.write_str("Body::Empty"),
            Inner::Buffered(bytes) => write!(f, "Body::Buffered({} bytes)", bytes.len()),
            Inner::Regenerated(_) => f.write_str("Body::Regenerated"),
            Inner::OneShot(Some(_)) => f.write_str("Body::OneShot"),
            Inner::OneShot(None) => f.write_str("Body::OneShot(consumed)"),
        }
    }
}
