//! Notice Toast Component
//!
//! Shows the latest failed mutation until dismissed.

use leptos::prelude::*;

use crate::context::use_board_context;

#[component]
pub fn NoticeToast() -> impl IntoView {
    let reconciler = use_board_context().reconciler;
    let notice = reconciler.notice;

    view! {
        <Show when=move || notice.with(Option::is_some)>
            <div class="notice-toast" role="alert">
                <span class="notice-text">{move || notice.get().unwrap_or_default()}</span>
                <button
                    class="notice-dismiss"
                    on:click={
                        let reconciler = reconciler.clone();
                        move |_| reconciler.dismiss_notice()
                    }
                >
                    "×"
                </button>
            </div>
        </Show>
    }
}
