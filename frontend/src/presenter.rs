use analysis::{AdvisoryDisplay, ImageSubmission, Presenter, ResultView};
use yew::html::Scope;

use crate::{Model, Msg};

/// Forwards orchestrator updates into the component's message queue.
pub struct YewPresenter {
    link: Scope<Model>,
}

impl YewPresenter {
    pub fn new(link: Scope<Model>) -> Self {
        Self { link }
    }
}

impl Presenter for YewPresenter {
    fn show_preview(&self, submission: &ImageSubmission) {
        self.link.send_message(Msg::ShowPreview(submission.clone()));
    }

    fn clear_preview(&self) {
        self.link.send_message(Msg::ClearPreview);
    }

    fn show_error(&self, message: &str) {
        self.link.send_message(Msg::SetError(Some(message.to_string())));
    }

    fn clear_error(&self) {
        self.link.send_message(Msg::SetError(None));
    }

    fn set_analyzing_state(&self, analyzing: bool) {
        self.link.send_message(Msg::SetAnalyzing(analyzing));
    }

    fn set_analyze_enabled(&self, enabled: bool) {
        self.link.send_message(Msg::SetAnalyzeEnabled(enabled));
    }

    fn render_result(&self, view: &ResultView) {
        self.link
            .send_message(Msg::SetResult(Some(Box::new(view.clone()))));
    }

    fn clear_result(&self) {
        self.link.send_message(Msg::SetResult(None));
    }

    fn render_advisory(&self, advisory: &AdvisoryDisplay) {
        self.link.send_message(Msg::SetAdvisory(advisory.clone()));
    }
}
