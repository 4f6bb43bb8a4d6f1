//! Model service control: load and unload the captioning model.
//!
//! This flow is independent of the job poll controller. Loading requires
//! a model selection; failure bodies come in several shapes and are
//! classified by [`ErrorBody`].

use vlmcap_core::error::ErrorBody;

use crate::api::{ApiError, CaptionServiceApi};

#[derive(Debug, thiserror::Error)]
pub enum ModelServiceError {
    /// No model was chosen; nothing was sent.
    #[error("Please select a model to load")]
    NoModelSelected,

    /// The service refused the request.
    #[error("Error: {0}")]
    Rejected(ErrorBody),

    /// The request did not complete or the reply was unreadable.
    #[error("Error: {0}")]
    Api(#[source] ApiError),
}

impl From<ApiError> for ModelServiceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { body, .. } => Self::Rejected(body),
            other => Self::Api(other),
        }
    }
}

/// Load the selected model. Blank selections count as no selection.
pub async fn load_model(
    api: &CaptionServiceApi,
    selection: Option<&str>,
) -> Result<(), ModelServiceError> {
    let model = selection
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(ModelServiceError::NoModelSelected)?;

    tracing::info!(model, "Loading model service");
    match api.load_model(model).await {
        Ok(()) => {
            tracing::info!(model, "Model service loaded");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(model, error = %e, "Model service failed to load");
            Err(e.into())
        }
    }
}

/// Unload the model and return the service's message.
pub async fn stop_model(api: &CaptionServiceApi) -> Result<String, ModelServiceError> {
    let reply = api.stop_model().await?;
    tracing::info!(message = %reply.message, "Model service stopped");
    Ok(reply.message)
}

/// Drop the current directory job on the service and return its message.
pub async fn stop_job(api: &CaptionServiceApi) -> Result<String, ModelServiceError> {
    let reply = api.stop_job().await?;
    tracing::info!(message = %reply.message, "Caption job stopped");
    Ok(reply.message)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn missing_selection_sends_nothing() {
        // Port 9 (discard) is never contacted: the selection check comes first.
        let api = CaptionServiceApi::new("http://127.0.0.1:9");
        let err = load_model(&api, None).await.unwrap_err();
        assert_matches!(err, ModelServiceError::NoModelSelected);
        assert_eq!(err.to_string(), "Please select a model to load");
    }

    #[tokio::test]
    async fn blank_selection_counts_as_missing() {
        let api = CaptionServiceApi::new("http://127.0.0.1:9");
        let err = load_model(&api, Some("  ")).await.unwrap_err();
        assert_matches!(err, ModelServiceError::NoModelSelected);
    }

    #[test]
    fn rejected_displays_body_text() {
        let err = ModelServiceError::from(ApiError::Status {
            status: 400,
            body: ErrorBody::Detail("Service model 'x' not found.".into()),
        });
        assert_eq!(err.to_string(), "Error: Service model 'x' not found.");
    }
}
