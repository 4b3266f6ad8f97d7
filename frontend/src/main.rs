use analysis::{
    AdvisoryDisplay, AnalysisOrchestrator, ImageSubmission, OrchestratorConfig, ResultView,
    SelectedFile,
};
use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

mod api;
mod presenter;
mod runtime;

mod components {
    pub mod handlers;
    pub mod header;
    pub mod preview_area;
    pub mod results;
    pub mod upload_section;
    pub mod utils;
}

use api::GlooAnalysisService;
use components::{handlers, header, preview_area, results, upload_section, utils};
use presenter::YewPresenter;
use runtime::BrowserRuntime;

pub type Orchestrator = AnalysisOrchestrator<GlooAnalysisService, YewPresenter, BrowserRuntime>;

// Models
pub struct Preview {
    pub file_name: String,
    pub url: ObjectUrl,
}

// Yew msg components
pub enum Msg {
    // Input events
    FilesChosen(Vec<GlooFile>),
    FileRead(SelectedFile),
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
    SetDragging(bool),

    // User actions
    Analyze,
    Reset,
    ToggleAdvisory,

    // Presenter updates
    ShowPreview(ImageSubmission),
    ClearPreview,
    SetError(Option<String>),
    SetAnalyzing(bool),
    SetAnalyzeEnabled(bool),
    SetResult(Option<Box<ResultView>>),
    SetAdvisory(AdvisoryDisplay),
}

// Main component
pub struct Model {
    pub orchestrator: Orchestrator,
    pub preview: Option<Preview>,
    pub error: Option<String>,
    pub analyzing: bool,
    pub analyze_enabled: bool,
    pub result: Option<Box<ResultView>>,
    pub advisory: Option<AdvisoryDisplay>,
    pub advisory_open: bool,
    pub is_dragging: bool,
    paste_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = OrchestratorConfig::default();
        let orchestrator = AnalysisOrchestrator::new(
            GlooAnalysisService::new(config.clone()),
            YewPresenter::new(ctx.link().clone()),
            BrowserRuntime::new(),
            config,
        );

        let paste_listener = web_sys::window().map(|window| {
            let link = ctx.link().clone();
            EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            })
        });

        Self {
            orchestrator,
            preview: None,
            error: None,
            analyzing: false,
            analyze_enabled: false,
            result: None,
            advisory: None,
            advisory_open: false,
            is_dragging: false,
            paste_listener,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // Input events
            Msg::FilesChosen(files) => handlers::handle_files_chosen(ctx, files),
            Msg::FileRead(file) => handlers::handle_file_read(self, file),
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(ctx, event),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            // User actions
            Msg::Analyze => handlers::handle_analyze(self),
            Msg::Reset => handlers::handle_reset(self),
            Msg::ToggleAdvisory => {
                self.advisory_open = !self.advisory_open;
                true
            }

            // Presenter updates
            Msg::ShowPreview(submission) => handlers::handle_show_preview(self, &submission),
            Msg::ClearPreview => {
                self.preview = None;
                true
            }
            Msg::SetError(error) => {
                self.error = error;
                true
            }
            Msg::SetAnalyzing(analyzing) => {
                self.analyzing = analyzing;
                true
            }
            Msg::SetAnalyzeEnabled(enabled) => {
                self.analyze_enabled = enabled;
                true
            }
            Msg::SetResult(result) => {
                if result.is_none() {
                    self.advisory = None;
                    self.advisory_open = false;
                }
                self.result = result;
                true
            }
            Msg::SetAdvisory(advisory) => {
                self.advisory = Some(advisory);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { header::render_header() }

                <main class="main-content">
                { upload_section::render_upload_section(self, ctx) }
                { preview_area::render_preview_area(self, ctx) }
                { utils::render_error_message(self) }
                { results::render_results(self, ctx) }
                </main>

                <footer class="app-footer">
                    <p>{"Kết quả chỉ mang tính tham khảo, không thay thế chẩn đoán của bác sĩ."}</p>
                </footer>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.paste_listener.take();
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
