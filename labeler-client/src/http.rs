//! reqwest implementation of [`LabelApi`]

use std::time::Duration;

use async_trait::async_trait;
use labeler_common::paths::encode_path_segments;
use labeler_common::{
    DeleteResponse, ImageDescriptor, LabelRecord, LabelUpsert, PairwiseComparisonRecord,
    PairwiseCreate,
};
use serde_json::Value;
use tracing::debug;

use crate::api::LabelApi;
use crate::error::{ClientError, Result};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for a running labeler-server
pub struct HttpApi {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:5001`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self.http_client.get(&url).send().await?;
        check_status(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        debug!(url = %url, "DELETE");
        let response = self.http_client.delete(&url).send().await?;
        let response = check_status(response).await?;

        let body: DeleteResponse = response.json().await?;
        if body.success {
            Ok(())
        } else {
            Err(ClientError::Server {
                status: 200,
                message: body.message.unwrap_or_else(|| "Delete failed".to_string()),
            })
        }
    }
}

/// Pass 2xx responses through; turn anything else into `ClientError::Server`
/// carrying the body's `error` (or `message`) field
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| {
            body.get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                text
            }
        });

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl LabelApi for HttpApi {
    async fn list_images(&self) -> Result<Vec<ImageDescriptor>> {
        Ok(self.get("/api/images").await?.json().await?)
    }

    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .get(&format!("/api/images/{}", encode_path_segments(path)))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn list_labels(&self) -> Result<Vec<LabelRecord>> {
        Ok(self.get("/api/labels").await?.json().await?)
    }

    async fn get_label(&self, path: &str) -> Result<Option<LabelRecord>> {
        let body: Value = self
            .get(&format!("/api/labels/{}", encode_path_segments(path)))
            .await?
            .json()
            .await?;

        // An unlabeled image comes back as an object of nulls
        if body.get("file_path").map_or(true, Value::is_null) {
            return Ok(None);
        }
        serde_json::from_value(body)
            .map(Some)
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn save_label(&self, upsert: &LabelUpsert) -> Result<()> {
        let url = self.url("/api/labels");
        debug!(url = %url, file_path = %upsert.file_path, "POST");
        let response = self.http_client.post(&url).json(upsert).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn delete_label(&self, path: &str) -> Result<()> {
        self.delete(&format!("/api/labels/{}", encode_path_segments(path)))
            .await
    }

    async fn export_labels(&self) -> Result<String> {
        Ok(self.get("/api/labels/export").await?.text().await?)
    }

    async fn list_comparisons(&self) -> Result<Vec<PairwiseComparisonRecord>> {
        Ok(self.get("/api/pairwise").await?.json().await?)
    }

    async fn create_comparison(
        &self,
        create: &PairwiseCreate,
    ) -> Result<PairwiseComparisonRecord> {
        let url = self.url("/api/pairwise");
        debug!(
            url = %url,
            reconstruction_type = %create.reconstruction_type,
            "POST"
        );
        let response = self.http_client.post(&url).json(create).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn delete_comparison(&self, id: i64) -> Result<()> {
        self.delete(&format!("/api/pairwise/{}", id)).await
    }

    async fn export_comparisons(&self) -> Result<String> {
        Ok(self.get("/api/pairwise/export").await?.text().await?)
    }
}
