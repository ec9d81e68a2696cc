//! API 客户端 (API Client)
//!
//! 与远端 REST API 的唯一出站通道，带两个固定行为：
//! - 请求增强：发出前读取会话存储，存在 token 时附加 Bearer 凭据；
//!   不存在时请求以未认证方式发出，由服务端拒绝受保护路由。
//! - 响应归一：任何 401 响应都会同步清空会话存储，然后把失败
//!   原样传播给调用方（是否跳转由调用方决定）。
//!
//! 调用方不能假设 token 能在错误路径中幸存。

use crate::session::SessionStore;
use astro_shared::protocol::{
    CreateProductRequest, DeleteResponse, ErrorBody, InvoiceResponse, LoginRequest, LoginResponse,
    OrderPatch, ProductEditRequest, UpdateOrderStatusRequest, UploadResponse,
};
use astro_shared::{BEARER_PREFIX, DashboardSummary, HEADER_AUTHORIZATION, Order, OrderStatus, Product};
use gloo_net::http::{Method, Request, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use web_sys::FormData;

// =========================================================
// 错误类型
// =========================================================

/// API 调用失败
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 请求构建失败（序列化等）
    Request(String),
    /// 传输层失败（网络不可达、被中断等）
    Network(String),
    /// 非 2xx 响应，保留状态码与原始响应体
    Status { status: u16, body: String },
    /// 2xx 但响应体解析失败
    Decode(String),
}

impl ApiError {
    /// 是否为 401（会话已失效）
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }

    /// 服务端在响应体中给出的 `message` / `error` 说明（逐字展示给用户）
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::Status { body, .. } => serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(ErrorBody::surface),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Request(msg) => write!(f, "请求构建失败: {}", msg),
            ApiError::Network(msg) => write!(f, "网络错误: {}", msg),
            ApiError::Status { status, .. } => write!(f, "服务端返回 {}", status),
            ApiError::Decode(msg) => write!(f, "响应解析失败: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

fn bearer_value(token: &str) -> String {
    format!("{BEARER_PREFIX}{token}")
}

// =========================================================
// 客户端
// =========================================================

/// 固定基地址的 HTTP 客户端，会话存储通过构造注入
#[derive(Clone)]
pub struct ApiClient<S: SessionStore = crate::session::BrowserSession> {
    base_url: String,
    session: S,
}

impl<S: SessionStore> ApiClient<S> {
    pub fn new(base_url: String, session: S) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url, session }
    }

    /// 注入的会话存储（守卫与认证流程也读写同一实例）
    pub fn session(&self) -> &S {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 请求增强：调用时刻读取会话存储，有 token 则附加认证头
    fn builder(&self, method: Method, path: &str, extra_headers: &[(&str, String)]) -> RequestBuilder {
        let mut builder = RequestBuilder::new(&self.url(path)).method(method);
        if let Some(token) = self.session.get() {
            builder = builder.header(HEADER_AUTHORIZATION, &bearer_value(&token));
        }
        for (name, value) in extra_headers {
            builder = builder.header(name, value);
        }
        builder
    }

    /// 响应归一：401 时同步清空会话存储，之后失败原样传播
    fn normalize_failure(&self, status: u16, body: String) -> ApiError {
        if status == 401 {
            self.session.clear();
        }
        ApiError::Status { status, body }
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: Result<Request, gloo_net::Error>,
    ) -> Result<T, ApiError> {
        let request = request.map_err(|e| ApiError::Request(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.normalize_failure(status, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    // ---- 按动词划分的方法：路径 + 可选请求体 + 可选的每请求头覆盖 ----

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.dispatch(self.builder(Method::GET, path, headers).build())
            .await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.dispatch(self.builder(Method::POST, path, headers).json(body))
            .await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.dispatch(self.builder(Method::PATCH, path, headers).json(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.dispatch(self.builder(Method::DELETE, path, headers).build())
            .await
    }

    /// multipart 上传：浏览器自行生成带 boundary 的 Content-Type
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: FormData,
        headers: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.dispatch(self.builder(Method::POST, path, headers).body(form))
            .await
    }
}

// =========================================================
// 域方法（每个消费的端点一个）
// =========================================================

impl<S: SessionStore> ApiClient<S> {
    /// 调用点再读一次 token 并作为显式头传入（与拦截器各自独立读取）。
    /// 两次读取之间 token 被清掉时，请求会以未认证方式发出，
    /// 由 401 归一化兜底。
    fn auth_override(&self) -> Vec<(&'static str, String)> {
        match self.session.get() {
            Some(token) => vec![(HEADER_AUTHORIZATION, bearer_value(&token))],
            None => Vec::new(),
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.post("/auth/login", request, &[]).await
    }

    pub async fn fetch_dashboard(&self) -> Result<DashboardSummary, ApiError> {
        self.get("/seller/dashboard", &self.auth_override()).await
    }

    pub async fn fetch_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/orders", &self.auth_override()).await
    }

    /// 变更响应是类型化的部分更新，由调用方合并回内存中的订单
    pub async fn update_order_status(
        &self,
        id: u64,
        status: OrderStatus,
    ) -> Result<OrderPatch, ApiError> {
        self.patch(
            &format!("/orders/{id}"),
            &UpdateOrderStatusRequest { status },
            &self.auth_override(),
        )
        .await
    }

    pub async fn fetch_invoice(&self, id: u64) -> Result<InvoiceResponse, ApiError> {
        self.get(&format!("/orders/{id}/invoice"), &self.auth_override())
            .await
    }

    pub async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/products", &self.auth_override()).await
    }

    /// 创建响应被丢弃，调用方整体重拉列表
    pub async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<serde_json::Value, ApiError> {
        self.post("/products", request, &self.auth_override()).await
    }

    pub async fn upload_product_images(&self, form: FormData) -> Result<UploadResponse, ApiError> {
        self.post_form("/products/upload", form, &self.auth_override())
            .await
    }

    /// 行内编辑价格/库存；响应被丢弃，调用方整体重拉列表
    pub async fn edit_product(
        &self,
        id: u64,
        request: &ProductEditRequest,
    ) -> Result<serde_json::Value, ApiError> {
        self.patch(&format!("/products/{id}"), request, &self.auth_override())
            .await
    }

    /// 上架/下架开关，空对象请求体
    pub async fn toggle_product(&self, id: u64) -> Result<serde_json::Value, ApiError> {
        self.patch(
            &format!("/products/{id}/toggle"),
            &serde_json::json!({}),
            &self.auth_override(),
        )
        .await
    }

    pub async fn delete_product(&self, id: u64) -> Result<DeleteResponse, ApiError> {
        self.delete(&format!("/products/{id}"), &self.auth_override())
            .await
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::MemorySession;

    fn client_with(session: MemorySession) -> ApiClient<MemorySession> {
        ApiClient::new("http://localhost:3005/".to_string(), session)
    }

    #[test]
    fn url_joins_with_and_without_slash() {
        let client = client_with(MemorySession::default());
        assert_eq!(client.url("/orders"), "http://localhost:3005/orders");
        assert_eq!(client.url("orders"), "http://localhost:3005/orders");
    }

    #[test]
    fn auth_override_attached_iff_token_present() {
        let client = client_with(MemorySession::with_token("tok-1"));
        assert_eq!(
            client.auth_override(),
            vec![(HEADER_AUTHORIZATION, "Bearer tok-1".to_string())]
        );

        let client = client_with(MemorySession::default());
        assert!(client.auth_override().is_empty());
    }

    #[test]
    fn unauthorized_response_clears_session() {
        let session = MemorySession::with_token("tok-1");
        let client = client_with(session.clone());

        let err = client.normalize_failure(401, String::new());

        assert!(err.is_unauthorized());
        // 任何调用触发的 401 都会让 token 立刻消失
        assert_eq!(session.get(), None);
    }

    #[test]
    fn unauthorized_without_token_stays_absent() {
        let session = MemorySession::default();
        let client = client_with(session.clone());

        let err = client.normalize_failure(401, String::new());

        assert!(err.is_unauthorized());
        assert_eq!(session.get(), None);
    }

    #[test]
    fn other_failures_keep_session() {
        let session = MemorySession::with_token("tok-1");
        let client = client_with(session.clone());

        let err = client.normalize_failure(500, "{}".to_string());

        assert!(!err.is_unauthorized());
        assert_eq!(session.get().as_deref(), Some("tok-1"));
    }

    #[test]
    fn server_message_is_surfaced_verbatim() {
        let err = ApiError::Status {
            status: 400,
            body: r#"{"message": "stock too low"}"#.to_string(),
        };
        assert_eq!(err.server_message().as_deref(), Some("stock too low"));

        let err = ApiError::Status {
            status: 500,
            body: "<html>oops</html>".to_string(),
        };
        assert_eq!(err.server_message(), None);

        let err = ApiError::Network("offline".to_string());
        assert_eq!(err.server_message(), None);
    }
}
