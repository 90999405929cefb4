//! Delete Confirm Button Component
//!
//! A single button that arms on the first click and fires on the second.
//! Moving the pointer away disarms it.

use leptos::prelude::*;

#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] button_class: String,
    #[prop(into)] label: String,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let armed = RwSignal::new(false);

    let class = move || {
        if armed.get() { format!("{} armed", button_class) } else { button_class.clone() }
    };
    let title = move || if armed.get() { "Click again to confirm".to_string() } else { label.clone() };

    let on_click = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        if armed.get_untracked() {
            armed.set(false);
            on_confirm.run(());
        } else {
            armed.set(true);
        }
    };

    view! {
        <button
            class=class
            title=title
            on:mousedown=|ev: web_sys::MouseEvent| ev.stop_propagation()
            on:click=on_click
            on:mouseleave=move |_: web_sys::MouseEvent| armed.set(false)
        >
            {move || if armed.get() { "Delete?" } else { "×" }}
        </button>
    }
}
