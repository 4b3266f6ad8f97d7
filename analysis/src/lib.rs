//! Client-side orchestration of one knee X-ray analysis attempt.
//!
//! The crate is platform agnostic: networking, presentation and timers are
//! reached through the [`AnalysisService`], [`Presenter`] and [`Runtime`]
//! seams, implemented by the wasm frontend and the native CLI.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod presenter;
pub mod runtime;
pub mod service;
pub mod session;
pub mod submission;

pub use config::OrchestratorConfig;
pub use error::{AnalysisError, ErrorKind};
pub use orchestrator::{AnalysisOrchestrator, AnalysisOutcome};
pub use presenter::{AdvisoryDisplay, LatencySource, Presenter, ProbabilityBar, ResultView};
pub use runtime::Runtime;
#[cfg(not(target_arch = "wasm32"))]
pub use runtime::TokioRuntime;
pub use service::AnalysisService;
pub use session::{AnalysisPhase, AnalysisSession, SessionId};
pub use submission::{ImageSubmission, SelectedFile};
