//! Knowledge folder operations.
//!
//! Each operation maps its arguments onto a path and body, then hands the
//! request to [`LangdockClient::execute_checked`], which owns retries and
//! decoding. A 4xx answer fails with [`LangdockError::Rejected`].

use reqwest::{header, Method};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    multipart::Form,
    types::{ApiResponse, KnowledgeFile, SearchRequest, SearchResult},
    Body, LangdockClient, LangdockError, PreparedRequest, Result,
};

/// Handle returned by [`LangdockClient::knowledge`].
#[derive(Clone, Debug)]
pub struct Knowledge<'a> {
    client: &'a LangdockClient,
    cancel: Option<CancellationToken>,
}

impl<'a> Knowledge<'a> {
    pub(crate) fn new(client: &'a LangdockClient) -> Self {
        Self {
            client,
            cancel: None,
        }
    }

    /// Aborts subsequent operations once `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Lists the files in a knowledge folder.
    pub async fn list_files(&self, folder_id: Uuid) -> Result<ApiResponse<Vec<KnowledgeFile>>> {
        let request = self.request(
            Method::GET,
            &format!("/knowledge/{folder_id}/list"),
            Body::empty(),
        )?;
        self.expect_body(request).await
    }

    /// Uploads a new file into a knowledge folder.
    pub async fn upload_file(
        &self,
        folder_id: Uuid,
        file_name: &str,
        content: impl AsRef<[u8]>,
    ) -> Result<ApiResponse<KnowledgeFile>> {
        let form = Form::new().file("file", file_name, content.as_ref());
        let request = self.multipart(Method::POST, &format!("/knowledge/{folder_id}"), form)?;
        self.expect_body(request).await
    }

    /// Replaces the content of an existing attachment.
    pub async fn update_file(
        &self,
        folder_id: Uuid,
        attachment_id: Uuid,
        file_name: &str,
        content: impl AsRef<[u8]>,
    ) -> Result<ApiResponse<KnowledgeFile>> {
        let form = Form::new()
            .file("file", file_name, content.as_ref())
            .text("attachmentId", &attachment_id.to_string());
        let request = self.multipart(Method::PATCH, &format!("/knowledge/{folder_id}"), form)?;
        self.expect_body(request).await
    }

    /// Removes an attachment from a knowledge folder.
    pub async fn delete_file(&self, folder_id: Uuid, attachment_id: Uuid) -> Result<()> {
        let request = self.request(
            Method::DELETE,
            &format!("/knowledge/{folder_id}/{attachment_id}"),
            Body::empty(),
        )?;
        self.client.execute_checked_discard(request).await
    }

    /// Runs a semantic search across knowledge folders.
    pub async fn search(&self, query: &str) -> Result<ApiResponse<Vec<SearchResult>>> {
        let body = Body::json(&SearchRequest { query })?;
        let request = self
            .request(Method::POST, "/knowledge/search", body)?
            .header(header::CONTENT_TYPE.as_str(), "application/json")?;
        self.expect_body(request).await
    }

    fn request(&self, method: Method, path: &str, body: Body) -> Result<PreparedRequest> {
        let request = self.client.build(method, path, body)?;
        Ok(match &self.cancel {
            Some(token) => request.cancel_on(token.clone()),
            None => request,
        })
    }

    fn multipart(&self, method: Method, path: &str, form: Form) -> Result<PreparedRequest> {
        let content_type = form.content_type();
        self.request(method, path, Body::bytes(form.finish()))?
            .header(header::CONTENT_TYPE.as_str(), &content_type)
    }

    async fn expect_body<T: serde::de::DeserializeOwned>(
        &self,
        request: PreparedRequest,
    ) -> Result<T> {
        let method = request.method().clone();
        let path = request.url().path().to_owned();
        self.client
            .execute_checked(request)
            .await?
            .ok_or_else(|| LangdockError::EmptyResponse(format!("{method} {path}")))
    }
}
