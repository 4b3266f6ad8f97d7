use yew::prelude::*;

pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-x-ray"></i> {" Đánh giá thoái hóa khớp gối"}</h1>
            <p class="subtitle">{"Phân độ Kellgren–Lawrence (KL0–KL4) từ ảnh X-quang"}</p>
        </header>
    }
}
