use analysis::{AnalysisError, AnalysisService, ImageSubmission, OrchestratorConfig};
use async_trait::async_trait;
use gloo_file::Blob;
use gloo_net::http::{Request, Response};
use shared::{
    AdvisoryRequest, AdvisoryResponse, AdvisoryResult, ClassificationResult, ContractError,
    PredictResponse,
};
use web_sys::FormData;

/// Talks to the classification and advisory endpoints with `fetch`.
pub struct GlooAnalysisService {
    config: OrchestratorConfig,
}

impl GlooAnalysisService {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }
}

async fn read_body(response: Response) -> Result<(u16, bool, String), String> {
    let status = response.status();
    let ok = response.ok();
    let body = response
        .text()
        .await
        .map_err(|e| format!("Failed to read response: {}", e))?;
    Ok((status, ok, body))
}

/// The body is parsed whatever the status; only an unreadable body on an
/// error status is reported as a server error.
fn contract_failure(status: u16, ok: bool, body: &str, err: ContractError) -> AnalysisError {
    match err {
        ContractError::Malformed(_) if !ok => {
            AnalysisError::Transport(format!("Server error: {} - {}", status, body))
        }
        other => other.into(),
    }
}

#[async_trait(?Send)]
impl AnalysisService for GlooAnalysisService {
    async fn classify(
        &self,
        submission: &ImageSubmission,
    ) -> Result<ClassificationResult, AnalysisError> {
        let blob = Blob::new_with_options(submission.bytes(), Some(submission.upload_media_type()));
        let form_data = FormData::new()
            .map_err(|e| AnalysisError::Transport(format!("Failed to build form: {:?}", e)))?;
        form_data
            .append_with_blob_and_filename("file", blob.as_ref(), submission.file_name())
            .map_err(|e| AnalysisError::Transport(format!("Failed to attach file: {:?}", e)))?;

        let request = Request::post(&self.config.predict_url())
            .body(form_data)
            .map_err(|e| AnalysisError::Transport(format!("Failed to build request: {}", e)))?;
        let response = request
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(format!("Network error: {}", e)))?;

        let (status, ok, body) = read_body(response).await.map_err(AnalysisError::Transport)?;
        log::debug!("predict responded {} ({} bytes)", status, body.len());
        PredictResponse::parse(&body).map_err(|err| contract_failure(status, ok, &body, err))
    }

    async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryResult, AnalysisError> {
        let response = Request::post(&self.config.recommend_url())
            .json(request)
            .map_err(|e| {
                AnalysisError::AdvisoryFailure(format!("Failed to encode request: {}", e))
            })?
            .send()
            .await
            .map_err(|e| AnalysisError::AdvisoryFailure(format!("Network error: {}", e)))?;

        let (status, ok, body) = read_body(response)
            .await
            .map_err(AnalysisError::AdvisoryFailure)?;
        log::debug!("recommend responded {}", status);
        AdvisoryResponse::parse(&body)
            .map_err(|err| contract_failure(status, ok, &body, err).into_advisory())
    }
}
