mod api;
mod app;
mod cookie;
mod env;
mod models;
mod settings;
mod ui;

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

#[component]
fn App() -> impl IntoView {
    view! {
        <div
            id="kanku-runtime-marker"
            data-runtime="kanku-web"
            style="display:none;"
        ></div>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    if let Some(root) = ui::web_document()
        .and_then(|doc| doc.get_element_by_id("kanku-runtime-root"))
        .and_then(|node| node.dyn_into::<HtmlElement>().ok())
    {
        mount_to(root, || view! { <App /> });
    } else {
        mount_to_body(|| view! { <App /> });
    }

    app::boot();
}
