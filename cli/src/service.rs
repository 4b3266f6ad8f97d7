use analysis::{AnalysisError, AnalysisService, ImageSubmission, OrchestratorConfig};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::multipart::{Form, Part};
use shared::{
    AdvisoryRequest, AdvisoryResponse, AdvisoryResult, ClassificationResult, ContractError,
    PredictResponse,
};

/// HTTP client for the classification service.
pub struct ReqwestAnalysisService {
    client: HttpClient,
    config: OrchestratorConfig,
}

impl ReqwestAnalysisService {
    pub fn new(config: OrchestratorConfig) -> Result<Self, reqwest::Error> {
        let client = HttpClient::builder()
            .user_agent(concat!("kneegrade/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// `GET /healthz`; returns the body of a 2xx response.
    pub async fn health(&self) -> Result<String, AnalysisError> {
        let response = self
            .client
            .get(self.config.health_url())
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(format!("Network error: {}", e)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Transport(format!("Failed to read response: {}", e)))?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(AnalysisError::Transport(format!("Server error: {} - {}", status, body)))
        }
    }

    async fn post(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), String> {
        let response = request
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;
        Ok((status, body))
    }
}

/// Envelopes are honoured on any status; an unparseable body on an error
/// status becomes a server error.
fn contract_failure(status: u16, body: &str, err: ContractError) -> AnalysisError {
    match err {
        ContractError::Malformed(_) if !(200..300).contains(&status) => {
            AnalysisError::Transport(format!("Server error: {} - {}", status, body.trim()))
        }
        other => other.into(),
    }
}

#[async_trait(?Send)]
impl AnalysisService for ReqwestAnalysisService {
    async fn classify(
        &self,
        submission: &ImageSubmission,
    ) -> Result<ClassificationResult, AnalysisError> {
        let part = Part::bytes(submission.bytes().to_vec())
            .file_name(submission.file_name().to_string())
            .mime_str(submission.upload_media_type())
            .map_err(|e| AnalysisError::Transport(format!("Invalid content type: {}", e)))?;
        let form = Form::new().part("file", part);

        let url = self.config.predict_url();
        log::debug!("POST {} ({} bytes)", url, submission.len());
        let (status, body) = self
            .post(self.client.post(&url).multipart(form))
            .await
            .map_err(AnalysisError::Transport)?;
        log::debug!("predict responded {} ({} bytes)", status, body.len());

        PredictResponse::parse(&body).map_err(|err| contract_failure(status, &body, err))
    }

    async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryResult, AnalysisError> {
        let url = self.config.recommend_url();
        log::debug!("POST {}", url);
        let (status, body) = self
            .post(self.client.post(&url).json(request))
            .await
            .map_err(AnalysisError::AdvisoryFailure)?;
        log::debug!("recommend responded {}", status);

        AdvisoryResponse::parse(&body)
            .map_err(|err| contract_failure(status, &body, err).into_advisory())
    }
}
