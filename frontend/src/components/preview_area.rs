use super::super::{Model, Msg};
use super::utils::debounce;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(preview) = &model.preview else {
        return html! {};
    };

    let link = ctx.link().clone();

    html! {
        <div id="preview-container">
            <img id="actual-image-preview"
                src={preview.url.to_string()}
                alt={preview.file_name.clone()} />
            <p class="preview-name">{ &preview.file_name }</p>
            <div class="button-container">
                <button
                    id="clear-btn"
                    class="analyze-btn"
                    style="background-color: var(--clear-color);"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Reset)
                    })}
                >
                    <i class="fa-solid fa-trash"></i>{" Xóa ảnh"}
                </button>
                <button
                    id="analyze-btn"
                    class="analyze-btn"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Analyze)
                    })}
                    disabled={model.analyzing || !model.analyze_enabled}
                >
                    { render_analyze_button_content(model) }
                </button>
            </div>
        </div>
    }
}

fn render_analyze_button_content(model: &Model) -> Html {
    if model.analyzing {
        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Đang phân tích..."}</> }
    } else {
        html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Phân tích"}</> }
    }
}
