//! 通知组件
//!
//! daisyUI toast 样式的轻量通知：写入即显示，3 秒后自动消失。
//! 每条失败路径都要产生一条用户可见的通知，没有任何失败是致命的。

use gloo_timers::callback::Timeout;
use leptos::prelude::*;

const DISMISS_MS: u32 = 3_000;

#[derive(Clone, PartialEq)]
struct ToastMessage {
    id: u64,
    text: String,
    is_error: bool,
}

/// 通知上下文，通过 Context 在组件间共享
#[derive(Clone, Copy)]
pub struct Toaster {
    messages: RwSignal<Vec<ToastMessage>>,
    next_id: StoredValue<u64>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            messages: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    pub fn success(&self, text: impl Into<String>) {
        self.push(text.into(), false);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(text.into(), true);
    }

    fn push(&self, text: String, is_error: bool) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.messages
            .update(|list| list.push(ToastMessage { id, text, is_error }));

        let messages = self.messages;
        Timeout::new(DISMISS_MS, move || {
            let _ = messages.try_update(|list| list.retain(|message| message.id != id));
        })
        .forget();
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取通知上下文
pub fn use_toast() -> Toaster {
    use_context::<Toaster>().expect("Toaster should be provided")
}

/// 通知渲染出口，挂在布局右上角
#[component]
pub fn ToastHost() -> impl IntoView {
    let toaster = use_toast();

    view! {
        <div class="toast toast-top toast-end z-50">
            <For
                each=move || toaster.messages.get()
                key=|message| message.id
                children=move |message| {
                    let class = if message.is_error {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    };
                    view! {
                        <div class=class>
                            <span>{message.text.clone()}</span>
                        </div>
                    }
                }
            />
        </div>
    }
}
