//! 登录页
//!
//! 必填校验在输入层完成；登录成功后 token 进入会话存储，
//! 随后跳转到面板。

use crate::auth;
use crate::auth::use_api;
use crate::components::icons::ShieldCheck;
use crate::session::SessionStore;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

#[component]
pub fn LoginPage() -> impl IntoView {
    let api = use_api();
    let navigate = use_navigate();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 已持有 token 时直接进入面板
    Effect::new({
        let api = api.clone();
        let navigate = navigate.clone();
        move |_| {
            if api.session().get().is_some() {
                navigate("/dashboard", Default::default());
            }
        }
    });

    let on_submit = {
        let api = api.clone();
        let navigate = navigate.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            if email.get().is_empty() || password.get().is_empty() {
                set_error_msg.set(Some("请填写邮箱和密码".to_string()));
                return;
            }

            set_is_submitting.set(true);
            set_error_msg.set(None);

            let api = api.clone();
            let navigate = navigate.clone();
            spawn_local(async move {
                match auth::login(&api, email.get(), password.get()).await {
                    Ok(()) => navigate("/dashboard", Default::default()),
                    Err(err) => {
                        let message = err
                            .server_message()
                            .unwrap_or_else(|| "登录失败，请检查邮箱和密码".to_string());
                        set_error_msg.set(Some(message));
                    }
                }
                set_is_submitting.set(false);
            });
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <ShieldCheck attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">"Astro 卖家中心"</h1>
                        <p class="text-base-content/70">"登录以管理您的商品与订单"</p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"邮箱"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                placeholder="seller@example.com"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"密码"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "登录中..." }.into_any()
                                } else {
                                    "登录".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
