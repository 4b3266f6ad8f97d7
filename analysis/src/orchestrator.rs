//! Lifecycle of an analysis attempt.
//!
//! `Idle → Analyzing → {Completed | Failed}`, back to `Idle` on a new
//! submission or a reset. Every write to shared state and every presenter
//! call goes through a session check: once a newer session exists, an older
//! attempt (and its advisory task) can no longer change what is displayed.

use log::{debug, error, info, warn};
use shared::{AdvisoryRequest, GradeCoercion};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::OrchestratorConfig;
use crate::error::AnalysisError;
use crate::presenter::{AdvisoryDisplay, LatencySource, Presenter, ResultView};
use crate::runtime::{Runtime, with_timeout};
use crate::service::AnalysisService;
use crate::session::{AnalysisPhase, AnalysisSession, SessionId};
use crate::submission::{ImageSubmission, SelectedFile};

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(ResultView),
    /// A newer submission, reset or analysis took over; nothing was shown.
    Superseded,
}

#[derive(Debug, Default)]
struct State {
    staged: Option<ImageSubmission>,
    phase: AnalysisPhase,
    current: SessionId,
    in_flight: bool,
}

struct Inner<S, P, R> {
    service: Rc<S>,
    runtime: Rc<R>,
    presenter: P,
    config: OrchestratorConfig,
    state: RefCell<State>,
}

impl<S, P, R> Inner<S, P, R> {
    fn is_current(&self, session: SessionId) -> bool {
        self.state.borrow().current == session
    }

    /// Opens a new session. Returns the previous one if it was still running.
    fn supersede(&self, in_flight: bool) -> (SessionId, Option<SessionId>) {
        let mut state = self.state.borrow_mut();
        let previous = state.current;
        let was_in_flight = std::mem::replace(&mut state.in_flight, in_flight);
        state.current = previous.next();
        (state.current, was_in_flight.then_some(previous))
    }
}

/// Drives analyses of the staged image. Cheap to clone; clones share state.
pub struct AnalysisOrchestrator<S, P, R> {
    inner: Rc<Inner<S, P, R>>,
}

impl<S, P, R> Clone for AnalysisOrchestrator<S, P, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, P, R> AnalysisOrchestrator<S, P, R>
where
    S: AnalysisService + 'static,
    P: Presenter + 'static,
    R: Runtime + 'static,
{
    pub fn new(service: S, presenter: P, runtime: R, config: OrchestratorConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                service: Rc::new(service),
                runtime: Rc::new(runtime),
                presenter,
                config,
                state: RefCell::new(State::default()),
            }),
        }
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.inner.state.borrow().phase
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.state.borrow().in_flight
    }

    pub fn current_session(&self) -> SessionId {
        self.inner.state.borrow().current
    }

    pub fn staged(&self) -> Option<ImageSubmission> {
        self.inner.state.borrow().staged.clone()
    }

    /// Validates `file` and makes it the staged submission.
    ///
    /// A rejected file leaves any earlier staging in place. An accepted one
    /// replaces it and supersedes a running analysis.
    pub fn validate_and_stage(&self, file: SelectedFile) -> Result<(), AnalysisError> {
        let presenter = &self.inner.presenter;
        let submission = match ImageSubmission::validate(file) {
            Ok(submission) => submission,
            Err(err) => {
                warn!("Rejected file: {}", err);
                presenter.show_error(&err.user_message());
                return Err(err);
            }
        };

        let (_, superseded) = self.inner.supersede(false);
        {
            let mut state = self.inner.state.borrow_mut();
            state.staged = Some(submission.clone());
            state.phase = AnalysisPhase::Idle;
        }
        if let Some(previous) = superseded {
            info!("{} superseded by new file {}", previous, submission.file_name());
        }
        debug!(
            "Staged {} ({} bytes, {})",
            submission.file_name(),
            submission.len(),
            submission.id()
        );

        presenter.clear_error();
        presenter.clear_result();
        presenter.show_preview(&submission);
        if superseded.is_some() {
            presenter.set_analyzing_state(false);
        }
        presenter.set_analyze_enabled(true);
        Ok(())
    }

    /// Drops the staged file and anything shown for it.
    pub fn reset(&self) {
        let (_, superseded) = self.inner.supersede(false);
        {
            let mut state = self.inner.state.borrow_mut();
            state.staged = None;
            state.phase = AnalysisPhase::Idle;
        }
        if let Some(previous) = superseded {
            info!("{} cancelled by reset", previous);
        }

        let presenter = &self.inner.presenter;
        presenter.clear_preview();
        presenter.clear_error();
        presenter.clear_result();
        if superseded.is_some() {
            presenter.set_analyzing_state(false);
        }
        presenter.set_analyze_enabled(false);
    }

    /// Runs one analysis of the staged submission.
    ///
    /// Calling this while another analysis is running supersedes it: the
    /// earlier call resolves to [`AnalysisOutcome::Superseded`] and never
    /// touches the display again.
    pub async fn run_analysis(&self) -> Result<AnalysisOutcome, AnalysisError> {
        let inner = &*self.inner;
        let presenter = &inner.presenter;

        let staged = inner.state.borrow().staged.clone();
        let Some(submission) = staged else {
            let err = AnalysisError::NoInput;
            warn!("Analysis requested with nothing staged");
            presenter.show_error(&err.user_message());
            return Err(err);
        };

        let started_at = inner.runtime.now();
        let (session_id, superseded) = inner.supersede(true);
        inner.state.borrow_mut().phase = AnalysisPhase::Analyzing;
        if let Some(previous) = superseded {
            info!("{} superseded by {}", previous, session_id);
        }
        let session = AnalysisSession::new(session_id, submission, started_at);
        info!(
            "{} analyzing {} ({} bytes)",
            session.id,
            session.submission.file_name(),
            session.submission.len()
        );

        presenter.clear_error();
        presenter.clear_result();
        presenter.set_analyzing_state(true);
        presenter.set_analyze_enabled(false);
        let _in_flight = InFlightGuard {
            inner,
            session: session.id,
        };

        let classified = with_timeout(
            &*inner.runtime,
            inner.config.request_timeout(),
            inner.service.classify(&session.submission),
        )
        .await
        .unwrap_or_else(|| {
            Err(AnalysisError::Transport(format!(
                "Request timed out after {} ms",
                inner.config.request_timeout_ms
            )))
        });

        if !inner.is_current(session.id) {
            debug!("{} superseded, dropping classification response", session.id);
            return Ok(AnalysisOutcome::Superseded);
        }

        let classification = match classified {
            Ok(classification) => classification,
            Err(err) => {
                error!("{} failed ({:?}): {}", session.id, err.kind(), err);
                inner.state.borrow_mut().phase = AnalysisPhase::Failed;
                presenter.show_error(&err.user_message());
                return Err(err);
            }
        };

        let (latency_ms, latency_source) = match classification.inference_ms {
            Some(ms) => (ms, LatencySource::Reported),
            None => (
                session.elapsed(inner.runtime.now()).as_secs_f64() * 1000.0,
                LatencySource::Measured,
            ),
        };

        self.spawn_advisory(
            session.id,
            AdvisoryRequest::from_classification(&classification, latency_ms),
        );

        let remaining = session.gate_remaining(inner.runtime.now(), inner.config.min_display());
        if !remaining.is_zero() {
            debug!("{} holding result for {:?}", session.id, remaining);
            inner.runtime.sleep(remaining).await;
            if !inner.is_current(session.id) {
                debug!("{} superseded during display gate", session.id);
                return Ok(AnalysisOutcome::Superseded);
            }
        }

        let (grade, coercion) = classification.grade();
        if coercion != GradeCoercion::Exact {
            warn!(
                "{} class value {:?} coerced to {} ({:?})",
                session.id, classification.predicted_class, grade, coercion
            );
        }

        let view = ResultView {
            session: session.id,
            file_name: session.submission.file_name().to_string(),
            grade,
            metadata: grade.metadata(),
            classification,
            latency_ms,
            latency_source,
        };
        inner.state.borrow_mut().phase = AnalysisPhase::Completed;
        presenter.render_result(&view);
        info!(
            "{} completed: {} at {} ({})",
            session.id,
            view.metadata.display_label,
            view.confidence_text(),
            view.latency_text()
        );

        Ok(AnalysisOutcome::Completed(view))
    }

    fn spawn_advisory(&self, session: SessionId, request: AdvisoryRequest) {
        let slot = AdvisorySlot {
            inner: Rc::downgrade(&self.inner),
            session,
        };
        slot.publish(&AdvisoryDisplay::Pending);

        let service = Rc::clone(&self.inner.service);
        let runtime = Rc::clone(&self.inner.runtime);
        let limit = self.inner.config.advisory_timeout();

        let task = async move {
            let outcome = with_timeout(&*runtime, limit, service.advise(&request))
                .await
                .unwrap_or_else(|| Err(AnalysisError::AdvisoryFailure("request timed out".into())));

            let display = match outcome {
                Ok(result) => AdvisoryDisplay::ready(result.advice_text),
                Err(err) => {
                    let err = err.into_advisory();
                    warn!("{} {}", session, err);
                    AdvisoryDisplay::Unavailable {
                        reason: err.to_string(),
                    }
                }
            };
            slot.publish(&display);
        };
        self.inner.runtime.spawn(Box::pin(task));
    }
}

/// Write access to the advisory slot of one session, and nothing else.
struct AdvisorySlot<S, P, R> {
    inner: Weak<Inner<S, P, R>>,
    session: SessionId,
}

impl<S, P: Presenter, R> AdvisorySlot<S, P, R> {
    fn publish(&self, display: &AdvisoryDisplay) {
        match self.inner.upgrade() {
            Some(inner) if inner.is_current(self.session) => {
                inner.presenter.render_advisory(display);
            }
            _ => debug!("{} advisory update dropped", self.session),
        }
    }
}

/// Clears the in-flight marker when an attempt ends, however it ends, as
/// long as no newer session has taken over.
struct InFlightGuard<'a, S, P: Presenter, R> {
    inner: &'a Inner<S, P, R>,
    session: SessionId,
}

impl<S, P: Presenter, R> Drop for InFlightGuard<'_, S, P, R> {
    fn drop(&mut self) {
        let released = {
            let mut state = self.inner.state.borrow_mut();
            if state.current == self.session && state.in_flight {
                state.in_flight = false;
                true
            } else {
                false
            }
        };
        if released {
            self.inner.presenter.set_analyzing_state(false);
            self.inner.presenter.set_analyze_enabled(true);
        }
    }
}
