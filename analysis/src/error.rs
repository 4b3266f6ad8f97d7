use shared::ContractError;

pub const INVALID_FILE_MESSAGE: &str = "File không hợp lệ. Chỉ nhận PNG/JPG/JPEG/BMP.";
pub const NO_INPUT_MESSAGE: &str = "Vui lòng chọn ảnh X-quang trước.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Lỗi không xác định";
pub const GENERIC_FAILURE_MESSAGE: &str = "Có lỗi xảy ra khi phân tích.";
pub const ADVISORY_UNAVAILABLE_MESSAGE: &str =
    "Không lấy được khuyến nghị. Vui lòng thử lại hoặc tham khảo bác sĩ.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NoInput,
    Transport,
    Rejected,
    AdvisoryFailure,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("unsupported file {file_name:?} ({media_type})")]
    InvalidInput {
        file_name: String,
        media_type: String,
    },
    #[error("no image staged for analysis")]
    NoInput,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("rejected by classification service: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),
    #[error("advisory unavailable: {0}")]
    AdvisoryFailure(String),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::InvalidInput { .. } => ErrorKind::InvalidInput,
            AnalysisError::NoInput => ErrorKind::NoInput,
            AnalysisError::Transport(_) => ErrorKind::Transport,
            AnalysisError::Rejected(_) => ErrorKind::Rejected,
            AnalysisError::AdvisoryFailure(_) => ErrorKind::AdvisoryFailure,
        }
    }

    /// Text shown in the error box (or the advisory slot for advisory failures).
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::InvalidInput { .. } => INVALID_FILE_MESSAGE.to_string(),
            AnalysisError::NoInput => NO_INPUT_MESSAGE.to_string(),
            AnalysisError::Transport(msg) if !msg.trim().is_empty() => msg.clone(),
            AnalysisError::Transport(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            AnalysisError::Rejected(Some(msg)) if !msg.trim().is_empty() => msg.clone(),
            AnalysisError::Rejected(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
            AnalysisError::AdvisoryFailure(_) => ADVISORY_UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    /// Re-labels any failure of the secondary request as advisory.
    pub fn into_advisory(self) -> Self {
        match self {
            AnalysisError::AdvisoryFailure(_) => self,
            other => AnalysisError::AdvisoryFailure(other.to_string()),
        }
    }
}

impl From<ContractError> for AnalysisError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::Rejected(reason) => AnalysisError::Rejected(reason),
            ContractError::Malformed(detail) => {
                AnalysisError::Transport(format!("Failed to parse response: {}", detail))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_prefers_server_message() {
        let err = AnalysisError::Rejected(Some("Chưa chọn file.".into()));
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.user_message(), "Chưa chọn file.");

        assert_eq!(
            AnalysisError::Rejected(Some(String::new())).user_message(),
            UNKNOWN_ERROR_MESSAGE
        );
        assert_eq!(AnalysisError::Rejected(None).user_message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_transport_fallback() {
        assert_eq!(
            AnalysisError::Transport("  ".into()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            AnalysisError::Transport("Network error: offline".into()).user_message(),
            "Network error: offline"
        );
    }

    #[test]
    fn test_contract_errors_map_to_kinds() {
        let malformed: AnalysisError = ContractError::Malformed("eof".into()).into();
        assert_eq!(malformed.kind(), ErrorKind::Transport);

        let rejected: AnalysisError = ContractError::Rejected(None).into();
        assert_eq!(rejected.kind(), ErrorKind::Rejected);
        assert_eq!(rejected.into_advisory().kind(), ErrorKind::AdvisoryFailure);
    }
}
