use shared::{ClassificationResult, GradeMetadata, KlGrade};

use crate::error::ADVISORY_UNAVAILABLE_MESSAGE;
use crate::session::SessionId;
use crate::submission::ImageSubmission;

pub const ADVISORY_PENDING_MESSAGE: &str = "Đang lấy khuyến nghị từ chuyên gia AI...";
pub const ADVISORY_READY_MESSAGE: &str = "Có khuyến nghị. Nhấn Chi tiết để xem.";
pub const ADVISORY_EMPTY_MESSAGE: &str = "Chưa có khuyến nghị.";
pub const MISSING_MODEL_PLACEHOLDER: &str = "—";

/// Display side of the flow. Every call is made only on behalf of the live
/// session, so implementations never need to filter stale updates.
pub trait Presenter {
    fn show_preview(&self, submission: &ImageSubmission);
    fn clear_preview(&self);
    fn show_error(&self, message: &str);
    fn clear_error(&self);
    fn set_analyzing_state(&self, analyzing: bool);
    fn set_analyze_enabled(&self, enabled: bool);
    fn render_result(&self, view: &ResultView);
    fn clear_result(&self);
    fn render_advisory(&self, advisory: &AdvisoryDisplay);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencySource {
    /// `inference_ms` as reported by the service.
    Reported,
    /// Wall time since the request was issued.
    Measured,
}

/// Classification merged with its grade metadata, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub session: SessionId,
    pub file_name: String,
    pub grade: KlGrade,
    pub metadata: &'static GradeMetadata,
    pub classification: ClassificationResult,
    pub latency_ms: f64,
    pub latency_source: LatencySource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub label: String,
    pub percent: f64,
}

impl ProbabilityBar {
    pub fn value_text(&self) -> String {
        format!("{:.2}%", self.percent)
    }
}

impl ResultView {
    pub fn confidence_percent(&self) -> f64 {
        self.classification.confidence * 100.0
    }

    pub fn confidence_text(&self) -> String {
        format!("{:.1}%", self.confidence_percent())
    }

    /// Width of the confidence meter, always within 0..=100.
    pub fn confidence_bar_width(&self) -> f64 {
        let percent = self.confidence_percent();
        if percent.is_nan() {
            return 0.0;
        }
        percent.clamp(0.0, 100.0)
    }

    pub fn model_text(&self) -> &str {
        self.classification
            .model_name
            .as_deref()
            .unwrap_or(MISSING_MODEL_PLACEHOLDER)
    }

    pub fn latency_text(&self) -> String {
        format!("{:.1} ms", self.latency_ms)
    }

    pub fn probability_bars(&self) -> Vec<ProbabilityBar> {
        self.classification
            .probabilities()
            .map(|(label, probability)| ProbabilityBar {
                label: format!("KL{}", label),
                percent: probability * 100.0,
            })
            .collect()
    }
}

/// Contents of the advisory slot, independent of the main result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryDisplay {
    Pending,
    Ready { details: String },
    Unavailable { reason: String },
}

impl AdvisoryDisplay {
    pub fn ready(advice: String) -> Self {
        if advice.trim().is_empty() {
            AdvisoryDisplay::Ready {
                details: ADVISORY_EMPTY_MESSAGE.to_string(),
            }
        } else {
            AdvisoryDisplay::Ready { details: advice }
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            AdvisoryDisplay::Pending => ADVISORY_PENDING_MESSAGE,
            AdvisoryDisplay::Ready { .. } => ADVISORY_READY_MESSAGE,
            AdvisoryDisplay::Unavailable { .. } => ADVISORY_UNAVAILABLE_MESSAGE,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            AdvisoryDisplay::Ready { details } => Some(details),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, AdvisoryDisplay::Pending)
    }
}
