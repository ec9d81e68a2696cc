//! Astro 卖家控制台前端
//!
//! 远端 REST API 之上的瘦客户端：业务逻辑、持久化与认证校验
//! 全部在服务端。架构分层：
//! - `session`: 会话存储（唯一的客户端持久状态）
//! - `api`: 带请求增强与 401 归一化的 API 客户端
//! - `auth`: 登录、注销与导航守卫
//! - `optimistic`: 订单视图的乐观更新/回滚模式
//! - `upload`: 图片预览的临时资源域
//! - `components`: UI 组件层

pub mod api;
pub mod auth;
pub mod config;
pub mod optimistic;
pub mod session;
pub mod upload;

mod components {
    pub mod dashboard;
    mod icons;
    pub mod layout;
    pub mod login;
    pub mod orders;
    pub mod products;
    pub mod toast;
}

use crate::api::ApiClient;
use crate::components::dashboard::DashboardPage;
use crate::components::layout::Layout;
use crate::components::login::LoginPage;
use crate::components::orders::OrdersPage;
use crate::components::products::ProductsPage;
use crate::components::toast::Toaster;
use crate::session::BrowserSession;

use leptos::prelude::*;
use leptos_router::components::{ParentRoute, Redirect, Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    // 1. 共享 API 客户端：固定基地址 + 注入的浏览器会话存储
    let api = ApiClient::new(config::api_base_url(), BrowserSession);
    provide_context(api);

    // 2. 通知上下文
    provide_context(Toaster::new());

    view! {
        <Router>
            <Routes fallback=|| view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <div class="text-center">
                        <h1 class="text-6xl font-bold text-error">"404"</h1>
                        <p class="text-xl mt-4">"页面未找到"</p>
                    </div>
                </div>
            }>
                <Route path=path!("/") view=|| view! { <Redirect path="/login" /> } />
                <Route path=path!("/login") view=LoginPage />
                <ParentRoute path=path!("/dashboard") view=Layout>
                    <Route path=path!("") view=DashboardPage />
                    <Route path=path!("products") view=ProductsPage />
                    <Route path=path!("orders") view=OrdersPage />
                </ParentRoute>
            </Routes>
        </Router>
    }
}
