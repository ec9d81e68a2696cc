//! 卖家面板
//!
//! 每次激活都重新拉取服务端计算好的汇总数据，本地不缓存。

use crate::auth::{self, use_api};
use crate::components::icons::RefreshCw;
use crate::components::toast::use_toast;
use astro_shared::{DashboardSummary, SeriesPoint};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_api();
    let navigate = use_navigate();
    let toaster = use_toast();

    let (summary, set_summary) = signal(DashboardSummary::default());
    let (loading, set_loading) = signal(true);

    let load_summary = {
        let api = api.clone();
        move || {
            let api = api.clone();
            set_loading.set(true);
            spawn_local(async move {
                match api.fetch_dashboard().await {
                    Ok(data) => set_summary.set(data),
                    Err(err) => {
                        web_sys::console::error_1(
                            &format!("[Dashboard] fetch failed: {err}").into(),
                        );
                        toaster.error("加载面板数据失败");
                    }
                }
                set_loading.set(false);
            });
        }
    };

    // 导航守卫：激活时检查一次 token，缺失则跳转登录页且不发起请求
    Effect::new({
        let api = api.clone();
        let navigate = navigate.clone();
        let load_summary = load_summary.clone();
        move |_| {
            if !auth::guard(&api, &navigate) {
                return;
            }
            load_summary();
        }
    });

    view! {
        <div class="max-w-7xl mx-auto space-y-8">
            <div class="flex items-center justify-between">
                <h1 class="text-3xl font-bold">"卖家面板"</h1>
                <button
                    on:click=move |_| load_summary()
                    disabled=move || loading.get()
                    class="btn btn-ghost btn-circle"
                >
                    <RefreshCw attr:class=move || {
                        if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" }
                    } />
                </button>
            </div>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-title">"总销量"</div>
                    <div class="stat-value text-primary">
                        {move || summary.get().total_sales}
                    </div>
                </div>
                <div class="stat">
                    <div class="stat-title">"待处理订单"</div>
                    <div class="stat-value text-warning">
                        {move || summary.get().pending_orders}
                    </div>
                </div>
                <div class="stat">
                    <div class="stat-title">"总收入"</div>
                    <div class="stat-value text-success">
                        {move || format!("${:.2}", summary.get().total_earnings)}
                    </div>
                </div>
            </div>

            <div class="grid grid-cols-1 md:grid-cols-2 gap-6">
                <SeriesCard
                    title="近期销量"
                    points=Signal::derive(move || summary.get().recent_sales)
                />
                <SeriesCard
                    title="月度收入"
                    points=Signal::derive(move || summary.get().monthly_earnings)
                />
            </div>
        </div>
    }
}

/// 时间序列卡片：纯标记渲染，不依赖图表库
#[component]
fn SeriesCard(title: &'static str, #[prop(into)] points: Signal<Vec<SeriesPoint>>) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">{title}</h3>
                <Show when=move || points.get().is_empty()>
                    <p class="text-base-content/50 text-sm">"暂无数据"</p>
                </Show>
                {move || {
                    let points = points.get();
                    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
                    points
                        .into_iter()
                        .map(|point| {
                            let percent = if max > 0.0 {
                                (point.value / max * 100.0).round()
                            } else {
                                0.0
                            };
                            view! {
                                <div class="flex items-center gap-2 text-sm">
                                    <span class="w-16 shrink-0 text-base-content/70">
                                        {point.label}
                                    </span>
                                    <progress
                                        class="progress progress-primary w-full"
                                        max="100"
                                        value=percent
                                    ></progress>
                                    <span class="w-20 text-right font-mono">
                                        {format!("{:.0}", point.value)}
                                    </span>
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
        </div>
    }
}
