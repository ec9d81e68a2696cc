//! 运行配置
//!
//! 远端 REST API 的固定源地址。所有请求路径都相对于这个地址。

const DEFAULT_API_BASE: &str = "http://localhost:3005";

/// API 基地址，构建时可用 `API_BASE_URL` 环境变量覆盖
pub fn api_base_url() -> String {
    option_env!("API_BASE_URL")
        .unwrap_or(DEFAULT_API_BASE)
        .trim_end_matches('/')
        .to_string()
}
