//! REST client for the caption service HTTP endpoints.
//!
//! Wraps job submission, status polling, model service control, the
//! model/prompt catalogues and single-image captioning using
//! [`reqwest`].

use std::future::Future;

use indexmap::IndexMap;
use vlmcap_core::error::ErrorBody;
use vlmcap_core::types::{
    AvailableModels, AvailablePrompts, CaptionFileRequest, CaptionFileResponse, JobRequest,
    LoadModelRequest, ServiceMessage, StatusReport, SubmitResponse,
};

/// Errors from the caption service REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Caption service error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Decoded failure body.
        body: ErrorBody,
    },

    /// A 2xx response whose body is not the expected JSON.
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The two endpoints the job poll controller needs.
///
/// Implemented by [`CaptionServiceApi`]; tests substitute an in-memory
/// fake.
pub trait JobApi: Send + Sync + 'static {
    /// `POST /caption_directory`.
    fn submit_job(
        &self,
        request: &JobRequest,
    ) -> impl Future<Output = Result<SubmitResponse, ApiError>> + Send;

    /// `GET /caption_directory_status`.
    fn job_status(&self) -> impl Future<Output = Result<StatusReport, ApiError>> + Send;
}

/// HTTP client for a single caption service.
#[derive(Debug, Clone)]
pub struct CaptionServiceApi {
    client: reqwest::Client,
    api_url: String,
}

impl CaptionServiceApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://127.0.0.1:8000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Load a model into the service.
    ///
    /// Sends `POST /load_model_service`. The success body is ignored.
    pub async fn load_model(&self, service_model: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("load_model_service"))
            .json(&LoadModelRequest { service_model })
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Unload the current model. Also drops any running job server-side.
    pub async fn stop_model(&self) -> Result<ServiceMessage, ApiError> {
        let response = self
            .client
            .post(self.url("stop_model_service"))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Forget the current directory job without unloading the model.
    pub async fn stop_job(&self) -> Result<ServiceMessage, ApiError> {
        let response = self.client.post(self.url("stop_job")).send().await?;

        Self::parse_response(response).await
    }

    /// Model names mapped to their descriptions, in service order.
    pub async fn available_models(&self) -> Result<IndexMap<String, String>, ApiError> {
        let response = self
            .client
            .get(self.url("available_models"))
            .send()
            .await?;

        let models: AvailableModels = Self::parse_response(response).await?;
        Ok(models.available_models)
    }

    /// Prompt names mapped to their prompt text, in service order.
    pub async fn available_prompts(&self) -> Result<IndexMap<String, String>, ApiError> {
        let response = self
            .client
            .get(self.url("available_prompts"))
            .send()
            .await?;

        let prompts: AvailablePrompts = Self::parse_response(response).await?;
        Ok(prompts.available_prompts)
    }

    /// Caption a single image with the loaded model.
    pub async fn caption_file(&self, request: &CaptionFileRequest) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("caption"))
            .json(request)
            .send()
            .await?;

        let body: CaptionFileResponse = Self::parse_response(response).await?;
        Ok(body.caption)
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`] with the
    /// decoded body on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: ErrorBody::decode(content_type.as_deref(), &text),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

impl JobApi for CaptionServiceApi {
    async fn submit_job(&self, request: &JobRequest) -> Result<SubmitResponse, ApiError> {
        let response = self
            .client
            .post(self.url("caption_directory"))
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn job_status(&self) -> Result<StatusReport, ApiError> {
        let response = self
            .client
            .get(self.url("caption_directory_status"))
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
