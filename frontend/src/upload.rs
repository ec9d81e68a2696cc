//! 商品图片预览的临时资源域
//!
//! 本地文件先通过 object URL 渲染预览；上传接口返回持久 URL 之后
//! 才会发起创建请求，创建请求里永远不携带临时引用。
//! 临时 URL 在预览集被替换、提交成功以及析构时统一回收。

use web_sys::{File, Url};

/// 一组在途的本地预览 URL，离开作用域时保证回收
#[derive(Debug, Default)]
pub struct PreviewUrls {
    urls: Vec<String>,
}

impl PreviewUrls {
    pub fn new() -> Self {
        Self { urls: Vec::new() }
    }

    /// 用新选择的文件替换预览集，旧的 object URL 先全部回收
    pub fn replace(&mut self, files: &[File]) {
        self.release();
        for file in files {
            if let Ok(url) = Url::create_object_url_with_blob(file) {
                self.urls.push(url);
            }
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// 回收全部临时 URL（提交成功后也走这里）
    pub fn release(&mut self) {
        for url in self.urls.drain(..) {
            let _ = Url::revoke_object_url(&url);
        }
    }
}

impl Drop for PreviewUrls {
    fn drop(&mut self) {
        self.release();
    }
}
