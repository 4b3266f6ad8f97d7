use super::super::{Model, Msg};
use analysis::{AdvisoryDisplay, ResultView};
use shared::ClinicalFlag;
use yew::prelude::*;

pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(view) = model.result.as_deref() else {
        return html! {};
    };
    let info = view.metadata;

    html! {
        <div class="results-container">
            <div class="result-header">
                <h2 title={format!("Kết quả phân tích: {}", view.file_name)}>
                    <span class={classes!("grade-heading", info.tier.css_class())}>{ info.heading() }</span>
                    <span class={classes!("grade-label", info.tier.css_class())}>{ info.display_label }</span>
                </h2>
                <div class="confidence-meter">
                    <div class="meter-label">{"Độ tin cậy:"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {}%", view.confidence_bar_width())}></div>
                    </div>
                    <div class="meter-value">{ view.confidence_text() }</div>
                </div>
                <p class="result-meta">{ format!("Mô hình: {}", view.model_text()) }</p>
                <p class="result-meta">{ format!("Thời gian suy luận: {}", view.latency_text()) }</p>
            </div>
            <div class="clinical-badges">
                { render_badge("Gai xương", info.osteophytes) }
                { render_badge("Hẹp khe khớp", info.joint_space_narrowing) }
                { render_badge("Xơ xương dưới sụn", info.sclerosis) }
            </div>
            <p class="recommendation">{ info.recommendation }</p>
            { render_probability_bars(view) }
            { render_advisory(model, ctx) }
        </div>
    }
}

fn render_badge(name: &str, flag: ClinicalFlag) -> Html {
    html! {
        <span class={classes!("badge", flag.tone.css_class())}>
            { format!("{}: {}", name, flag.level) }
        </span>
    }
}

fn render_probability_bars(view: &ResultView) -> Html {
    let bars = view.probability_bars();
    if bars.is_empty() {
        return html! {};
    }

    html! {
        <div class="detailed-results">
            <h3>{"Xác suất"}</h3>
            <div class="result-bars">
                { for bars.iter().map(|bar| html! {
                    <div class="result-item">
                        <div class="result-label">{ &bar.label }</div>
                        <div class="result-bar-container">
                            <div class="result-bar" style={format!("width: {}%", bar.percent.clamp(0.0, 100.0))}></div>
                        </div>
                        <div class="result-value">{ bar.value_text() }</div>
                    </div>
                })}
            </div>
        </div>
    }
}

fn render_advisory(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(advisory) = &model.advisory else {
        return html! {};
    };

    let toggle = match advisory {
        AdvisoryDisplay::Ready { .. } => html! {
            <button class="advisory-toggle" onclick={ctx.link().callback(|_| Msg::ToggleAdvisory)}>
                { if model.advisory_open { "Thu gọn" } else { "Chi tiết" } }
            </button>
        },
        _ => html! {},
    };

    let details = match advisory.details() {
        Some(text) if model.advisory_open => html! { <div class="advisory-details">{ text }</div> },
        _ => html! {},
    };

    html! {
        <div class={classes!("advisory", (!advisory.is_settled()).then_some("pending"))}>
            <p class="advisory-summary">{ advisory.summary() }</p>
            { toggle }
            { details }
        </div>
    }
}
