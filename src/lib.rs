//! `langdock-http` is an async HTTP client for the Langdock API.
//!
//! Every call goes through one resilient executor:
//! - [`LangdockClient::build`] resolves the path and attaches credentials
//! - [`LangdockClient::execute`] delivers the request, retrying 429, 5xx and
//!   network failures with jittered exponential backoff, then decodes JSON
//!
//! Request bodies are [`Body`] values that can be replayed on retry, and a
//! [`CancellationToken`] attached with [`PreparedRequest::cancel_on`] aborts
//! both in-flight sends and backoff waits.
//!
//! Knowledge folder endpoints are available via [`LangdockClient::knowledge`].

pub mod backoff;
mod body;
mod client;
mod error;
mod knowledge;
mod multipart;
mod options;
mod request;
mod types;

pub use body::{Body, Regenerator};
pub use client::{Decoded, LangdockClient, ResponseHook, DEFAULT_BASE_URL};
pub use error::LangdockError;
pub use knowledge::Knowledge;
pub use options::ClientOptions;
pub use request::PreparedRequest;
pub use reqwest::{Method, StatusCode};
pub use tokio_util::sync::CancellationToken;
pub use types::{ApiResponse, KnowledgeFile, SearchResult};

pub type Result<T> = std::result::Result<T, LangdockError>;
