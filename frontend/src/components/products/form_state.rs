//! 商品创建表单状态
//!
//! 将零散的 signal 整合为 `FormState` 结构体，负责：
//! - 数据的持有与重置
//! - 输入层校验（必填 + 数字解析）
//! - 数据到请求对象的转换

use astro_shared::protocol::{CreateProductRequest, ProductEditRequest};
use leptos::prelude::*;
use web_sys::File;

/// 校验通过的表单草稿，上传成功后再换成创建请求
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: u32,
}

impl ProductDraft {
    /// 携带上传接口返回的持久 URL 组装创建请求
    pub fn into_request(self, images: Vec<String>) -> CreateProductRequest {
        CreateProductRequest {
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            stock: self.stock,
            images,
        }
    }
}

/// 表单状态结构体
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct FormState {
    pub name: RwSignal<String>,
    pub description: RwSignal<String>,
    pub price: RwSignal<String>,
    pub category: RwSignal<String>,
    pub stock: RwSignal<String>,
    /// 已选择的本地文件（上传之前）
    pub files: RwSignal<Vec<File>, LocalStorage>,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            price: RwSignal::new(String::new()),
            category: RwSignal::new(String::new()),
            stock: RwSignal::new(String::new()),
            files: RwSignal::new_local(Vec::new()),
        }
    }

    /// 重置表单到初始状态
    pub fn reset(&self) {
        self.name.set(String::new());
        self.description.set(String::new());
        self.price.set(String::new());
        self.category.set(String::new());
        self.stock.set(String::new());
        self.files.set(Vec::new());
    }

    /// 输入层校验：必填字段 + 数字解析，通过后得到草稿
    pub fn draft(&self) -> Result<ProductDraft, String> {
        let name = self.name.get_untracked().trim().to_string();
        if name.is_empty() {
            return Err("请填写商品名称".to_string());
        }
        let description = self.description.get_untracked().trim().to_string();
        if description.is_empty() {
            return Err("请填写商品描述".to_string());
        }
        let category = self.category.get_untracked().trim().to_string();
        if category.is_empty() {
            return Err("请填写商品分类".to_string());
        }
        let price: f64 = self
            .price
            .get_untracked()
            .parse()
            .map_err(|_| "价格格式不正确".to_string())?;
        let stock: u32 = self
            .stock
            .get_untracked()
            .parse()
            .map_err(|_| "库存格式不正确".to_string())?;

        Ok(ProductDraft {
            name,
            description,
            price,
            category,
            stock,
        })
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

/// 行内编辑（价格/库存）的草稿
///
/// 输入框里保存的是字符串，保存时才解析；同一时刻最多一个在编辑。
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub id: u64,
    pub price: String,
    pub stock: String,
}

impl EditDraft {
    pub fn from_product(id: u64, price: f64, stock: u32) -> Self {
        Self {
            id,
            price: price.to_string(),
            stock: stock.to_string(),
        }
    }

    /// 输入层校验：数字解析通过后转换为编辑请求
    pub fn to_request(&self) -> Result<ProductEditRequest, String> {
        let price: f64 = self
            .price
            .parse()
            .map_err(|_| "价格格式不正确".to_string())?;
        let stock: u32 = self
            .stock
            .parse()
            .map_err(|_| "库存格式不正确".to_string())?;
        Ok(ProductEditRequest { price, stock })
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> FormState {
        let form = FormState::new();
        form.name.set("Mug".to_string());
        form.description.set("A mug".to_string());
        form.price.set("12.5".to_string());
        form.category.set("Kitchen".to_string());
        form.stock.set("3".to_string());
        form
    }

    #[test]
    fn draft_converts_valid_input() {
        let draft = filled_form().draft().unwrap();
        assert_eq!(draft.name, "Mug");
        assert_eq!(draft.price, 12.5);
        assert_eq!(draft.stock, 3);

        let request = draft.into_request(vec!["https://cdn/img.png".to_string()]);
        assert_eq!(request.images, vec!["https://cdn/img.png".to_string()]);
    }

    #[test]
    fn draft_rejects_missing_required_fields() {
        let form = filled_form();
        form.name.set("   ".to_string());
        assert!(form.draft().is_err());
    }

    #[test]
    fn draft_rejects_unparseable_numbers() {
        let form = filled_form();
        form.price.set("abc".to_string());
        assert_eq!(form.draft().err().as_deref(), Some("价格格式不正确"));

        let form = filled_form();
        form.stock.set("-1".to_string());
        assert_eq!(form.draft().err().as_deref(), Some("库存格式不正确"));
    }

    #[test]
    fn reset_clears_fields() {
        let form = filled_form();
        form.reset();
        assert!(form.name.get_untracked().is_empty());
        assert!(form.price.get_untracked().is_empty());
    }

    #[test]
    fn edit_draft_round_trips_numbers() {
        let draft = EditDraft::from_product(3, 12.5, 7);
        let request = draft.to_request().unwrap();
        assert_eq!(request.price, 12.5);
        assert_eq!(request.stock, 7);
    }

    #[test]
    fn edit_draft_rejects_bad_input() {
        let mut draft = EditDraft::from_product(3, 12.5, 7);
        draft.stock = "lots".to_string();
        assert!(draft.to_request().is_err());
    }
}
