use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard `{ "status": ..., "result": ... }` envelope used by the API.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub result: T,
}

/// File stored in a knowledge folder.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeFile {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub created_at: String,
    pub updated_at: String,
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub sync_status: Option<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Chunk matched by a knowledge search.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub similarity: f64,
    pub subsource: String,
    pub subname: String,
    pub id: Uuid,
    pub url: String,
    pub index: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub query: &'a str,
}
