//! Log Panel Component
//!
//! Collapsible view over the in-memory log ring.

use leptos::prelude::*;
use rolling_logger::{LogBuffer, LogRecord};

const SHOWN_RECORDS: usize = 50;

#[component]
pub fn LogPanel() -> impl IntoView {
    let Some(logs) = use_context::<LogBuffer>() else {
        return ().into_any();
    };
    let (open, set_open) = signal(false);
    let (records, set_records) = signal(Vec::<LogRecord>::new());
    let (summary, set_summary) = signal(String::new());

    let reload = {
        let logs = logs.clone();
        move || {
            let all = logs.records();
            let skip = all.len().saturating_sub(SHOWN_RECORDS);
            set_records.set(all.into_iter().skip(skip).collect());
            let mut text = format!("{} / {} records", logs.len(), logs.capacity());
            if let Some(err) = logs.latest_error() {
                text.push_str(&format!(", last error: {}", err.message));
            }
            set_summary.set(text);
        }
    };

    let toggle = {
        let reload = reload.clone();
        move |_: web_sys::MouseEvent| {
            if !open.get_untracked() {
                reload();
            }
            set_open.update(|v| *v = !*v);
        }
    };

    let clear = move |_: web_sys::MouseEvent| {
        logs.clear();
        reload();
    };

    view! {
        <div class="log-panel">
            <button class="log-panel-toggle" on:click=toggle>
                {move || if open.get() { "Hide log" } else { "Show log" }}
            </button>
            <Show when=move || open.get()>
                <div class="log-panel-summary">
                    <span>{move || summary.get()}</span>
                    <button class="log-panel-clear" on:click=clear.clone()>"Clear"</button>
                </div>
                <ul class="log-panel-records">
                    <For
                        each=move || records.get().into_iter().enumerate()
                        key=|(i, record)| (*i, record.timestamp)
                        children=move |(_, record)| {
                            let class = if record.is_error() { "log-record error" } else { "log-record" };
                            view! {
                                <li class=class>
                                    <span class="log-time">{record.timestamp.format("%H:%M:%S").to_string()}</span>
                                    <span class="log-level">{record.level.clone()}</span>
                                    <span class="log-message">{record.message.clone()}</span>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
        </div>
    }
    .into_any()
}
