use async_trait::async_trait;
use shared::{AdvisoryRequest, AdvisoryResult, ClassificationResult};

use crate::error::AnalysisError;
use crate::submission::ImageSubmission;

/// The two remote calls of an analysis.
///
/// `classify` maps transport problems to [`AnalysisError::Transport`] and an
/// `ok: false` envelope to [`AnalysisError::Rejected`]. Whatever `advise`
/// returns as an error is treated as an advisory failure.
#[async_trait(?Send)]
pub trait AnalysisService {
    async fn classify(
        &self,
        submission: &ImageSubmission,
    ) -> Result<ClassificationResult, AnalysisError>;

    async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryResult, AnalysisError>;
}
