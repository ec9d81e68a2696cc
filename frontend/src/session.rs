//! 会话存储 (Session Store)
//!
//! 持有登录后获得的不透明 bearer token，唯一的一份客户端持久状态。
//! 客户端不跟踪过期时间，token 是否有效由服务端通过 401 告知。
//!
//! 以 trait 形式注入（而不是到处直接摸全局存储），
//! 守卫、API 客户端与视图共享同一实例，测试时可替换为内存实现。

use gloo_storage::{LocalStorage, Storage};

/// LocalStorage 中存放会话 token 的键
pub const TOKEN_KEY: &str = "token";

/// 会话存储契约：`get` / `set` / `clear`
pub trait SessionStore {
    /// 读取当前 token，不存在时返回 None
    fn get(&self) -> Option<String>;
    /// 写入 token（登录成功时调用）
    fn set(&self, token: &str);
    /// 清空 token（注销或收到 401 时调用）
    fn clear(&self);
}

/// 生产实现：浏览器 LocalStorage，按源隔离
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrowserSession;

impl SessionStore for BrowserSession {
    fn get(&self) -> Option<String> {
        LocalStorage::get(TOKEN_KEY).ok()
    }

    fn set(&self, token: &str) {
        let _ = LocalStorage::set(TOKEN_KEY, token);
    }

    fn clear(&self) {
        LocalStorage::delete(TOKEN_KEY);
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
pub mod tests {
    use super::SessionStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// 内存实现，克隆共享同一份状态，便于测试观察清空行为
    #[derive(Clone, Default)]
    pub struct MemorySession(Rc<RefCell<Option<String>>>);

    impl MemorySession {
        pub fn with_token(token: &str) -> Self {
            let session = Self::default();
            session.set(token);
            session
        }
    }

    impl SessionStore for MemorySession {
        fn get(&self) -> Option<String> {
            self.0.borrow().clone()
        }

        fn set(&self, token: &str) {
            *self.0.borrow_mut() = Some(token.to_string());
        }

        fn clear(&self) {
            *self.0.borrow_mut() = None;
        }
    }

    #[test]
    fn memory_session_round_trip() {
        let session = MemorySession::default();
        assert_eq!(session.get(), None);

        session.set("tok-1");
        assert_eq!(session.get().as_deref(), Some("tok-1"));

        session.clear();
        assert_eq!(session.get(), None);
    }

    #[test]
    fn clones_share_state() {
        let session = MemorySession::with_token("tok-1");
        let observer = session.clone();

        session.clear();
        assert_eq!(observer.get(), None);
    }
}
