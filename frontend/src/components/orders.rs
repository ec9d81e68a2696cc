//! 订单管理页
//!
//! 状态变更走乐观更新模式：先改内存让变化立即可见，再发 PATCH；
//! 成功时合并服务端返回的权威字段（可能带重算出的运单号/发票号），
//! 失败时还原快照并重置下拉框的显示值。

use crate::auth::{self, use_api};
use crate::components::icons::{FileText, RefreshCw};
use crate::components::toast::{Toaster, use_toast};
use crate::optimistic::{OptimisticUpdate, PendingMutations};
use astro_shared::{Order, OrderStatus};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use wasm_bindgen::JsCast;

fn status_badge_class(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "badge badge-warning",
        OrderStatus::Processing => "badge badge-info",
        OrderStatus::Shipped => "badge badge-secondary",
        OrderStatus::Delivered => "badge badge-success",
        OrderStatus::Canceled => "badge badge-error",
    }
}

/// 重置下拉框的显示值。
/// 下拉框自带独立显示状态，不会自动与内存集合对齐。
fn reset_status_select(order_id: u64, status: OrderStatus) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(element) = document.get_element_by_id(&format!("status-{order_id}")) {
        if let Ok(select) = element.dyn_into::<web_sys::HtmlSelectElement>() {
            select.set_value(status.as_str());
        }
    }
}

/// 会话过期：不自动跳转（避免丢掉未保存的上下文），
/// 提示后由用户决定是否整页刷新。
fn prompt_session_expired(toaster: Toaster) {
    toaster.error("会话已过期，请刷新页面后重新登录");
    if let Some(window) = web_sys::window() {
        if window.confirm_with_message("现在刷新页面吗？").unwrap_or(false) {
            let _ = window.location().reload();
        }
    }
}

#[component]
pub fn OrdersPage() -> impl IntoView {
    let api = use_api();
    let navigate = use_navigate();
    let toaster = use_toast();

    let (orders, set_orders) = signal(Vec::<Order>::new());
    let (loading, set_loading) = signal(true);
    let pending = PendingMutations::new();

    let load_orders = {
        let api = api.clone();
        let navigate = navigate.clone();
        move || {
            let api = api.clone();
            let navigate = navigate.clone();
            set_loading.set(true);
            spawn_local(async move {
                match api.fetch_orders().await {
                    Ok(data) => set_orders.set(data),
                    Err(err) if err.is_unauthorized() => {
                        // 401 已让客户端清掉 token，回到登录页
                        web_sys::console::error_1(
                            &format!("[Orders] fetch unauthorized: {err}").into(),
                        );
                        navigate("/login", Default::default());
                    }
                    Err(err) => {
                        web_sys::console::error_1(&format!("[Orders] fetch failed: {err}").into());
                        toaster.error("加载订单失败");
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
        let load_orders = load_orders.clone();
        move |_| {
            if !auth::guard(&api, &navigate) {
                return;
            }
            load_orders();
        }
    });

    let on_status = Callback::new({
        let api = api.clone();
        move |(order_id, next): (u64, OrderStatus)| {
            // 同一订单已有在途变更时，拒绝第二次并发变更，
            // 避免把未确认的乐观状态捕获成回滚快照
            if !pending.begin(order_id) {
                toaster.error("该订单已有变更正在处理");
                if let Some(current) = orders
                    .with_untracked(|list| list.iter().find(|o| o.id == order_id).map(|o| o.status))
                {
                    reset_status_select(order_id, current);
                }
                return;
            }

            // 1-2. 捕获快照并立即应用乐观写入
            let applied = set_orders.try_update(|list| {
                OptimisticUpdate::apply(list, |o| o.id == order_id, |o| o.status = next)
            });
            let applied = match applied {
                Some(Ok(update)) => update,
                _ => {
                    pending.finish(order_id);
                    toaster.error("订单不存在");
                    return;
                }
            };

            let api = api.clone();
            spawn_local(async move {
                // 3. 发起网络调用；结算之前视图保持乐观值
                match api.update_order_status(order_id, next).await {
                    // 4. 成功：合并服务端的权威字段，替换乐观猜测
                    Ok(patch) => {
                        set_orders.update(|list| {
                            applied.commit(list, |o| o.id == order_id, |o| patch.merge_into(o));
                        });
                        toaster.success("订单状态已更新");
                    }
                    // 5. 失败：还原快照并重置下拉框的显示值
                    Err(err) => {
                        let snapshot = set_orders
                            .try_update(|list| applied.rollback(list, |o| o.id == order_id));
                        if let Some(snapshot) = snapshot {
                            reset_status_select(order_id, snapshot.status);
                        }
                        web_sys::console::error_1(
                            &format!("[Orders] update failed: {err}").into(),
                        );
                        if err.is_unauthorized() {
                            prompt_session_expired(toaster);
                        } else if let Some(message) = err.server_message() {
                            toaster.error(message);
                        } else {
                            toaster.error("更新订单状态失败，请重试");
                        }
                    }
                }
                pending.finish(order_id);
            });
        }
    });

    let on_invoice = Callback::new({
        let api = api.clone();
        move |order_id: u64| {
            let api = api.clone();
            spawn_local(async move {
                match api.fetch_invoice(order_id).await {
                    Ok(invoice) => {
                        if let Some(number) = invoice.invoice_number {
                            set_orders.update(|list| {
                                if let Some(order) = list.iter_mut().find(|o| o.id == order_id) {
                                    order.invoice_number = Some(number);
                                }
                            });
                        }
                        toaster.success("发票已生成");
                    }
                    Err(err) if err.is_unauthorized() => {
                        toaster.error("会话已过期，请刷新页面后重新登录");
                    }
                    Err(err) => {
                        web_sys::console::error_1(
                            &format!("[Orders] invoice failed: {err}").into(),
                        );
                        toaster.error("生成发票失败");
                    }
                }
            });
        }
    });

    let on_refresh = {
        let load_orders = load_orders.clone();
        move |_| load_orders()
    };

    view! {
        <div class="max-w-7xl mx-auto space-y-6">
            <div class="flex items-center justify-between">
                <h1 class="text-3xl font-bold">"订单管理"</h1>
                <button
                    on:click=on_refresh
                    disabled=move || loading.get()
                    class="btn btn-ghost btn-circle"
                >
                    <RefreshCw attr:class=move || {
                        if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" }
                    } />
                </button>
            </div>

            <Show when=move || loading.get() && orders.with(|list| list.is_empty())>
                <div class="text-center py-8 text-base-content/50">
                    <span class="loading loading-spinner loading-md"></span>
                    " 加载中..."
                </div>
            </Show>
            <Show when=move || !loading.get() && orders.with(|list| list.is_empty())>
                <div class="card bg-base-100 shadow">
                    <div class="card-body text-center text-base-content/50">"暂无订单"</div>
                </div>
            </Show>

            <For
                each=move || orders.get()
                key=|order| order.id
                children=move |order| {
                    view! {
                        <OrderCard
                            order_id=order.id
                            orders=orders
                            pending=pending
                            on_status=on_status
                            on_invoice=on_invoice
                        />
                    }
                }
            />
        </div>
    }
}

#[component]
fn OrderCard(
    order_id: u64,
    orders: ReadSignal<Vec<Order>>,
    pending: PendingMutations,
    on_status: Callback<(u64, OrderStatus)>,
    on_invoice: Callback<u64>,
) -> impl IntoView {
    // 行内字段跟随集合变化：乐观写入、提交合并与回滚都要立即反映
    let row = Memo::new(move |_| {
        orders.with(|list| list.iter().find(|o| o.id == order_id).cloned())
    });

    move || {
        row.get().map(|order| {
            let status = order.status;
            let badge_class = status_badge_class(status);
            let is_updating = pending.contains(order_id);

            view! {
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <div class="flex items-center justify-between">
                            <h2 class="card-title">{format!("订单 #{order_id}")}</h2>
                            <span class=badge_class>{status.as_str()}</span>
                        </div>

                        <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4 text-sm mt-2">
                            <div>
                                <p class="text-base-content/60">"商品"</p>
                                <p class="mt-1">{order.product.name.clone()}</p>
                            </div>
                            <div>
                                <p class="text-base-content/60">"数量"</p>
                                <p class="mt-1">{order.quantity}</p>
                            </div>
                            <div>
                                <p class="text-base-content/60">"金额"</p>
                                <p class="mt-1">{format!("${:.2}", order.amount)}</p>
                            </div>
                            <div>
                                <p class="text-base-content/60">"买家邮箱"</p>
                                <p class="mt-1">{order.buyer.email.clone()}</p>
                            </div>
                            <div>
                                <p class="text-base-content/60">"收货地址"</p>
                                <p class="mt-1">{order.shipping_address.clone()}</p>
                            </div>
                            <div>
                                <p class="text-base-content/60">"下单日期"</p>
                                <p class="mt-1">{order.created_at.format("%Y-%m-%d").to_string()}</p>
                            </div>
                        </div>

                        <div class="mt-4 flex flex-col sm:flex-row justify-between items-start sm:items-center gap-4">
                            <div class="flex items-center gap-2">
                                <select
                                    id=format!("status-{order_id}")
                                    class="select select-bordered select-sm"
                                    disabled=is_updating
                                    prop:value=status.as_str()
                                    on:change=move |ev| {
                                        if let Ok(next) = event_target_value(&ev).parse::<OrderStatus>() {
                                            on_status.run((order_id, next));
                                        }
                                    }
                                >
                                    {OrderStatus::ALL
                                        .into_iter()
                                        .map(|option| {
                                            view! {
                                                <option value=option.as_str() selected=(option == status)>
                                                    {option.as_str()}
                                                </option>
                                            }
                                        })
                                        .collect_view()}
                                </select>
                                <Show when=move || pending.contains(order_id)>
                                    <span class="loading loading-spinner loading-xs"></span>
                                </Show>
                            </div>

                            <Show when=move || status == OrderStatus::Delivered>
                                <button
                                    on:click=move |_| on_invoice.run(order_id)
                                    class="btn btn-primary btn-sm gap-2"
                                >
                                    <FileText attr:class="h-4 w-4" />
                                    "生成发票"
                                </button>
                            </Show>
                        </div>

                        {order.tracking_number.clone().map(|tracking| view! {
                            <div class="mt-2 bg-base-200 rounded-md p-3 text-sm">
                                <span class="text-base-content/60">"运单号 "</span>
                                <span class="font-mono">{tracking}</span>
                            </div>
                        })}
                        {order.invoice_number.clone().map(|invoice| view! {
                            <div class="mt-2 bg-base-200 rounded-md p-3 text-sm">
                                <span class="text-base-content/60">"发票号 "</span>
                                <span class="font-mono">{invoice}</span>
                            </div>
                        })}
                    </div>
                </div>
            }
        })
    }
}
