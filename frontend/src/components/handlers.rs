use super::super::{Model, Msg, Preview};
use super::utils::collect_files;
use analysis::{AnalysisOutcome, ImageSubmission, SelectedFile};
use gloo_file::{Blob, File as GlooFile, ObjectUrl};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

/// Only one image is analysed at a time; extra files are ignored.
pub fn handle_files_chosen(ctx: &Context<Model>, files: Vec<GlooFile>) -> bool {
    let mut files = files.into_iter();
    let Some(file) = files.next() else {
        return false;
    };
    if files.len() > 0 {
        log::warn!("{} extra file(s) ignored, keeping {}", files.len(), file.name());
    }

    let link = ctx.link().clone();
    spawn_local(async move {
        match gloo_file::futures::read_as_bytes(&file).await {
            Ok(bytes) => link.send_message(Msg::FileRead(SelectedFile {
                name: file.name(),
                media_type: file.raw_mime_type(),
                bytes,
            })),
            Err(e) => {
                log::error!("Failed to read {}: {}", file.name(), e);
                link.send_message(Msg::SetError(Some(format!("Không đọc được file: {}", e))));
            }
        }
    });
    false
}

pub fn handle_file_read(model: &mut Model, file: SelectedFile) -> bool {
    // Rejections are reported through the presenter.
    let _ = model.orchestrator.validate_and_stage(file);
    false
}

pub fn handle_show_preview(model: &mut Model, submission: &ImageSubmission) -> bool {
    let blob = Blob::new_with_options(submission.bytes(), Some(submission.upload_media_type()));
    model.preview = Some(Preview {
        file_name: submission.file_name().to_string(),
        url: ObjectUrl::from(blob),
    });
    true
}

pub fn handle_analyze(model: &mut Model) -> bool {
    let orchestrator = model.orchestrator.clone();
    spawn_local(async move {
        match orchestrator.run_analysis().await {
            Ok(AnalysisOutcome::Completed(view)) => {
                log::info!("Analysis of {} completed", view.file_name)
            }
            Ok(AnalysisOutcome::Superseded) => log::debug!("Analysis superseded"),
            Err(e) => log::warn!("Analysis failed: {}", e),
        }
    });
    false
}

pub fn handle_reset(model: &mut Model) -> bool {
    model.orchestrator.reset();
    false
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file_list) = event.data_transfer().and_then(|dt| dt.files()) {
        handle_files_chosen(ctx, collect_files(&file_list));
    }

    true
}

pub fn handle_paste(ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    let Some(file_list) = event.clipboard_data().and_then(|dt| dt.files()) else {
        return false;
    };
    if file_list.length() == 0 {
        return false;
    }
    event.prevent_default();
    handle_files_chosen(ctx, collect_files(&file_list))
}
