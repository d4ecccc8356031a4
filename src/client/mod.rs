//! Thin `reqwest` wrapper around the backend REST API.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::pagination::{PageEnvelope, PageRequest, Paginated};

pub mod error;

pub use error::{ClientError, ClientResult};

/// Query parameter carrying the 0-based page index.
pub const PAGE_INDEX_PARAM: &str = "PageIndex";
pub const PAGE_SIZE_PARAM: &str = "PageSize";

/// Multipart part name expected by `POST /uploads`.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|token| !token.trim().is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// Sends `request` and maps non-success statuses to [`ClientError`].
    async fn execute(&self, request: RequestBuilder) -> ClientResult<Vec<u8>> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        if status.is_success() {
            return Ok(body);
        }

        let text = String::from_utf8_lossy(&body).into_owned();
        log::debug!("Backend responded {status}: {text}");
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(text)
            }
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => ClientError::Unavailable {
                status: status.as_u16(),
                message: text,
            },
            _ => ClientError::Backend {
                status: status.as_u16(),
                message: text,
            },
        })
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute_json(self.client.get(self.url(path))).await
    }

    /// Fetches one page of `path`. Filters are sent verbatim next to the
    /// paging parameters.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        page: PageRequest,
        filters: &BTreeMap<String, String>,
    ) -> ClientResult<Paginated<T>> {
        let mut query: Vec<(&str, String)> = vec![
            (PAGE_INDEX_PARAM, page.index().to_string()),
            (PAGE_SIZE_PARAM, page.size().to_string()),
        ];
        query.extend(
            filters
                .iter()
                .map(|(key, value)| (key.as_str(), value.clone())),
        );

        let envelope: PageEnvelope<T> = self
            .execute_json(self.client.get(self.url(path)).query(&query))
            .await?;
        Ok(Paginated::from_envelope(envelope)?)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_json(self.client.post(self.url(path)).json(body))
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_json(self.client.put(self.url(path)).json(body))
            .await
    }

    /// PATCH with a JSON body; the response body is ignored.
    pub async fn patch<B>(&self, path: &str, body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.execute(self.client.patch(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    /// PATCH without a body; the response body is ignored.
    pub async fn patch_empty(&self, path: &str) -> ClientResult<()> {
        self.execute(self.client.patch(self.url(path))).await?;
        Ok(())
    }

    /// DELETE; the response body is ignored.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.execute(self.client.delete(self.url(path))).await?;
        Ok(())
    }

    /// Uploads one file as the `file` part of a multipart body.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<T> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part(UPLOAD_FIELD, part);
        self.execute_json(self.client.post(self.url(path)).multipart(form))
            .await
    }
}
