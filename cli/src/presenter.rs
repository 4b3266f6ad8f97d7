use analysis::{AdvisoryDisplay, ImageSubmission, LatencySource, Presenter, ResultView};
use std::fmt::Write as _;
use tokio::sync::watch;

/// Prints the result to stdout and errors to stderr. The advisory slot is
/// published on a watch channel so the caller can wait for it to settle.
pub struct TerminalPresenter {
    advisory: watch::Sender<Option<AdvisoryDisplay>>,
}

impl TerminalPresenter {
    pub fn new() -> (Self, watch::Receiver<Option<AdvisoryDisplay>>) {
        let (advisory, receiver) = watch::channel(None);
        (Self { advisory }, receiver)
    }
}

impl Presenter for TerminalPresenter {
    fn show_preview(&self, submission: &ImageSubmission) {
        log::info!(
            "Selected {} ({} bytes, {})",
            submission.file_name(),
            submission.len(),
            submission.upload_media_type()
        );
        if submission.is_empty() {
            log::warn!("{} has no content", submission.file_name());
        }
    }

    fn clear_preview(&self) {}

    fn show_error(&self, message: &str) {
        eprintln!("Lỗi: {}", message);
    }

    fn clear_error(&self) {}

    fn set_analyzing_state(&self, analyzing: bool) {
        if analyzing {
            eprintln!("Đang phân tích...");
        }
    }

    fn set_analyze_enabled(&self, _enabled: bool) {}

    fn render_result(&self, view: &ResultView) {
        print!("{}", format_result(view));
    }

    fn clear_result(&self) {
        self.advisory.send_replace(None);
    }

    fn render_advisory(&self, advisory: &AdvisoryDisplay) {
        self.advisory.send_replace(Some(advisory.clone()));
    }
}

pub fn format_result(view: &ResultView) -> String {
    let info = view.metadata;
    let mut out = String::new();
    let _ = writeln!(out, "{} | {}", info.heading(), info.display_label);
    let _ = writeln!(out, "Độ tin cậy: {}", view.confidence_text());
    let _ = writeln!(out, "Mô hình: {}", view.model_text());
    let measured = match view.latency_source {
        LatencySource::Reported => "",
        LatencySource::Measured => " (đo phía client)",
    };
    let _ = writeln!(out, "Thời gian suy luận: {}{}", view.latency_text(), measured);
    let _ = writeln!(
        out,
        "Gai xương: {} | Hẹp khe khớp: {} | Xơ xương dưới sụn: {}",
        info.osteophytes.level, info.joint_space_narrowing.level, info.sclerosis.level
    );
    for bar in view.probability_bars() {
        let _ = writeln!(out, "  {:<4} {:>7}", bar.label, bar.value_text());
    }
    let _ = writeln!(out, "Khuyến nghị: {}", info.recommendation);
    out
}

pub fn format_advisory(advisory: &AdvisoryDisplay) -> String {
    match advisory.details() {
        Some(details) => format!("{}\n{}\n", advisory.summary(), details),
        None => format!("{}\n", advisory.summary()),
    }
}
