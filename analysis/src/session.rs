use derive_more::Display;
use std::time::Duration;

use crate::submission::ImageSubmission;

/// Monotonic token identifying one analysis attempt. A later id
/// supersedes every earlier one.
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display(fmt = "session-{}", _0)]
pub struct SessionId(u64);

impl SessionId {
    pub fn next(self) -> Self {
        SessionId(self.0 + 1)
    }
}

#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    #[default]
    #[display(fmt = "idle")]
    Idle,
    #[display(fmt = "analyzing")]
    Analyzing,
    #[display(fmt = "completed")]
    Completed,
    #[display(fmt = "failed")]
    Failed,
}

/// State private to one attempt: what is being analysed and since when.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    pub id: SessionId,
    pub submission: ImageSubmission,
    pub started_at: Duration,
}

impl AnalysisSession {
    pub fn new(id: SessionId, submission: ImageSubmission, started_at: Duration) -> Self {
        Self {
            id,
            submission,
            started_at,
        }
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }

    /// What is left of the minimum display window at `now`.
    pub fn gate_remaining(&self, now: Duration, min_display: Duration) -> Duration {
        min_display.saturating_sub(self.elapsed(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::SelectedFile;

    fn session(started_ms: u64) -> AnalysisSession {
        let submission = ImageSubmission::validate(SelectedFile {
            name: "knee.png".into(),
            media_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        })
        .unwrap();
        AnalysisSession::new(
            SessionId::default().next(),
            submission,
            Duration::from_millis(started_ms),
        )
    }

    #[test]
    fn test_gate_remaining() {
        let s = session(100);
        let min = Duration::from_millis(5000);
        assert_eq!(s.gate_remaining(Duration::from_millis(1300), min), Duration::from_millis(3800));
        assert_eq!(s.gate_remaining(Duration::from_millis(6100), min), Duration::ZERO);
        assert_eq!(s.gate_remaining(Duration::from_millis(5100), min), Duration::ZERO);
    }

    #[test]
    fn test_session_ids_are_monotonic() {
        let first = SessionId::default().next();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.to_string(), "session-2");
    }
}
