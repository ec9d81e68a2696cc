//! 认证模块
//!
//! 会话 token 的建立与销毁，以及受保护视图的导航守卫。
//! 视图通过 Context 获取共享的 API 客户端，守卫与请求拦截
//! 读写的是同一个注入的会话存储。

use crate::api::{ApiClient, ApiError};
use crate::session::SessionStore;
use astro_shared::protocol::LoginRequest;
use leptos::prelude::*;
use leptos_router::NavigateOptions;

/// 从 Context 获取共享的 API 客户端
pub fn use_api() -> ApiClient {
    use_context::<ApiClient>().expect("ApiClient should be provided")
}

/// 登录：用邮箱密码换取 token 并写入会话存储
pub async fn login(api: &ApiClient, email: String, password: String) -> Result<(), ApiError> {
    let response = api.login(&LoginRequest { email, password }).await?;
    api.session().set(&response.token);
    Ok(())
}

/// 注销：清空会话存储；跳转由调用方负责
pub fn logout(api: &ApiClient) {
    api.session().clear();
}

/// 导航守卫：受保护视图激活时调用一次。
///
/// 无 token 时跳转登录页并返回 false，该次激活不得再发起任何请求。
/// 守卫与后续请求各自独立读取 token：两者之间 token 被清掉时，
/// 请求会以未认证方式发出，由 API 客户端的 401 归一化兜底。
pub fn guard(api: &ApiClient, navigate: &impl Fn(&str, NavigateOptions)) -> bool {
    if api.session().get().is_none() {
        web_sys::console::log_1(&"[Guard] No session token. Redirecting to login.".into());
        navigate("/login", NavigateOptions::default());
        return false;
    }
    true
}
