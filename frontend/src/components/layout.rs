//! 布局与导航
//!
//! 受保护页面的外壳：顶部导航、路由出口与通知区域。
//! 注销只负责清空会话并回到登录页。

use crate::auth::{logout, use_api};
use crate::components::icons::LogOut;
use crate::components::toast::ToastHost;
use leptos::prelude::*;
use leptos_router::components::Outlet;
use leptos_router::hooks::{use_location, use_navigate};

fn link_class(current: &str, path: &str) -> &'static str {
    if current == path {
        "btn btn-ghost btn-sm btn-active"
    } else {
        "btn btn-ghost btn-sm"
    }
}

#[component]
pub fn Layout() -> impl IntoView {
    let api = use_api();
    let navigate = use_navigate();
    let pathname = use_location().pathname;

    let on_logout = {
        let api = api.clone();
        let navigate = navigate.clone();
        move |_| {
            logout(&api);
            navigate("/login", Default::default());
        }
    };

    let nav_dashboard = {
        let navigate = navigate.clone();
        move |_| navigate("/dashboard", Default::default())
    };
    let nav_products = {
        let navigate = navigate.clone();
        move |_| navigate("/dashboard/products", Default::default())
    };
    let nav_orders = {
        let navigate = navigate.clone();
        move |_| navigate("/dashboard/orders", Default::default())
    };

    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <div class="navbar bg-base-100 shadow-lg px-4">
                <div class="flex-1 gap-2">
                    <span class="text-xl font-bold text-primary px-2">"Astro"</span>
                    <a
                        class=move || link_class(&pathname.get(), "/dashboard")
                        on:click=nav_dashboard
                    >
                        "面板"
                    </a>
                    <a
                        class=move || link_class(&pathname.get(), "/dashboard/products")
                        on:click=nav_products
                    >
                        "商品"
                    </a>
                    <a
                        class=move || link_class(&pathname.get(), "/dashboard/orders")
                        on:click=nav_orders
                    >
                        "订单"
                    </a>
                </div>
                <div class="flex-none">
                    <button on:click=on_logout class="btn btn-outline btn-error btn-sm gap-2">
                        <LogOut attr:class="h-4 w-4" />
                        "退出登录"
                    </button>
                </div>
            </div>

            <main class="p-4 md:p-8">
                <Outlet />
            </main>

            <ToastHost />
        </div>
    }
}
