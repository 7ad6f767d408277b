//! Remote service clients — the single point of entry for all HTTP calls
//! in the editor. No other module may touch the network directly.
//!
//! Both the CV and AI clients share the same plumbing: JSON bodies, the
//! `session_token` cookie, and central status mapping (404 → `NotFound`,
//! other non-2xx → `Api`).

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

pub mod ai;

use crate::autosave::SaveTarget;
use crate::errors::EditorError;
use crate::models::cv::{CvCreate, CvDocument, CvUpdate, ShareLink};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SESSION_COOKIE: &str = "session_token";

/// Shared transport for the CV and AI service clients.
#[derive(Clone)]
pub(crate) struct Http {
    client: Client,
    base_url: String,
    session_token: String,
}

impl Http {
    pub(crate) fn new(base_url: &str, session_token: &str) -> Self {
        Http {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token: session_token.to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header(
                header::COOKIE,
                format!("{SESSION_COOKIE}={}", self.session_token),
            )
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, EditorError> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let message = response.text().await.unwrap_or_default();
            return Err(EditorError::NotFound(message));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EditorError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, EditorError> {
        debug!("GET {path}");
        Ok(self.send(self.request(Method::GET, path)).await?.json().await?)
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, EditorError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {path}");
        Ok(self
            .send(self.request(Method::POST, path).json(body))
            .await?
            .json()
            .await?)
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, EditorError> {
        debug!("POST {path}");
        Ok(self.send(self.request(Method::POST, path)).await?.json().await?)
    }

    pub(crate) async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, EditorError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("PUT {path}");
        Ok(self
            .send(self.request(Method::PUT, path).json(body))
            .await?
            .json()
            .await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), EditorError> {
        debug!("DELETE {path}");
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    pub(crate) async fn post_bytes(&self, path: &str) -> Result<Bytes, EditorError> {
        debug!("POST {path} (binary)");
        Ok(self
            .send(self.request(Method::POST, path))
            .await?
            .bytes()
            .await?)
    }
}

/// Client for the Remote CV Service (`/cvs/*`, `/generate-pdf/*`).
/// Documents are stored whole; `replace` is full-document replacement of
/// the three user-editable fields, last write wins.
#[derive(Clone)]
pub struct CvServiceClient {
    http: Http,
}

impl CvServiceClient {
    pub fn new(base_url: &str, session_token: &str) -> Self {
        CvServiceClient {
            http: Http::new(base_url, session_token),
        }
    }

    /// All CVs belonging to the session's account.
    pub async fn list(&self) -> Result<Vec<CvDocument>, EditorError> {
        self.http.get_json("/cvs").await
    }

    pub async fn create(&self, title: &str) -> Result<CvDocument, EditorError> {
        let body = CvCreate {
            title: title.to_string(),
        };
        self.http.post_json("/cvs", &body).await
    }

    pub async fn fetch(&self, cv_id: &str) -> Result<CvDocument, EditorError> {
        self.http.get_json(&format!("/cvs/{cv_id}")).await
    }

    pub async fn replace(&self, cv_id: &str, update: &CvUpdate) -> Result<CvDocument, EditorError> {
        self.http.put_json(&format!("/cvs/{cv_id}"), update).await
    }

    pub async fn delete(&self, cv_id: &str) -> Result<(), EditorError> {
        self.http.delete(&format!("/cvs/{cv_id}")).await
    }

    /// Renders the CV server-side and returns the PDF payload.
    pub async fn export_pdf(&self, cv_id: &str) -> Result<Bytes, EditorError> {
        self.http.post_bytes(&format!("/generate-pdf/{cv_id}")).await
    }

    pub async fn create_share_link(&self, cv_id: &str) -> Result<ShareLink, EditorError> {
        self.http.post_empty(&format!("/cvs/{cv_id}/share")).await
    }

    pub async fn get_share_link(&self, cv_id: &str) -> Result<ShareLink, EditorError> {
        self.http.get_json(&format!("/cvs/{cv_id}/share")).await
    }

    pub async fn revoke_share_link(&self, cv_id: &str) -> Result<(), EditorError> {
        self.http.delete(&format!("/cvs/{cv_id}/share")).await
    }
}

#[async_trait]
impl SaveTarget for CvServiceClient {
    async fn save(&self, cv_id: &str, update: &CvUpdate) -> Result<CvDocument, EditorError> {
        self.replace(cv_id, update).await
    }
}
