use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================
// 所有 DTO 与远端 REST API 交换，线上格式为 camelCase。
// 客户端不持有权威状态，这些结构只是渲染用的瞬时副本。

/// 订单状态，封闭枚举
///
/// 序列化值与服务端约定的字符串完全一致（`"Pending"` 等），
/// 界面通过下拉框选择，永远不会发送自由文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    /// 全部合法状态，按流转顺序排列（用于渲染下拉框选项）
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Canceled => "Canceled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(())
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 订单内嵌的商品摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProduct {
    pub name: String,
    pub price: f64,
}

/// 订单内嵌的买家摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBuyer {
    pub email: String,
}

/// 订单 DTO
///
/// 本客户端只会修改 `status` 一个字段，其余字段由服务端维护。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub product: OrderProduct,
    pub buyer: OrderBuyer,
    pub quantity: u32,
    pub amount: f64,
    pub status: OrderStatus,
    pub shipping_address: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 商品 DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    pub category: String,
    pub stock: u32,
    /// 图片 URL，有序；创建时只允许携带上传后的持久 URL
    #[serde(default)]
    pub images: Vec<String>,
    pub is_active: bool,
}

impl Product {
    /// 界面上展示的价格：有折扣价时优先折扣价
    pub fn display_price(&self) -> f64 {
        self.discount_price.unwrap_or(self.price)
    }
}

/// 时间序列上的一个点（近期销量 / 月度收入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// 面板汇总数据，只读，服务端每次重新计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_sales: u64,
    pub pending_orders: u64,
    pub total_earnings: f64,
    #[serde(default)]
    pub recent_sales: Vec<SeriesPoint>,
    #[serde(default)]
    pub monthly_earnings: Vec<SeriesPoint>,
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_serializes_to_exact_strings() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn order_status_rejects_free_text() {
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("Refunded".parse::<OrderStatus>().is_err());
        assert_eq!("Shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
    }

    #[test]
    fn order_deserializes_from_api_shape() {
        let json = r#"{
            "id": 7,
            "product": {"name": "Mug", "price": 12.5},
            "buyer": {"email": "buyer@example.com"},
            "quantity": 2,
            "amount": 25.0,
            "status": "Pending",
            "shippingAddress": "1 Main St",
            "createdAt": "2024-05-01T10:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, 7);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.shipping_address, "1 Main St");
        // 可选字段缺省时为空
        assert_eq!(order.tracking_number, None);
        assert_eq!(order.invoice_number, None);
    }

    #[test]
    fn product_display_price_prefers_discount() {
        let json = r#"{
            "id": 1,
            "name": "Mug",
            "description": "A mug",
            "price": 12.5,
            "discountPrice": 9.9,
            "category": "Kitchen",
            "stock": 3,
            "images": ["https://cdn/img.png"],
            "isActive": true
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.display_price(), 9.9);
        assert!(product.is_active);
    }

    #[test]
    fn dashboard_summary_defaults_to_zero() {
        let summary = DashboardSummary::default();
        assert_eq!(summary.total_sales, 0);
        assert_eq!(summary.pending_orders, 0);
        assert!(summary.recent_sales.is_empty());
    }
}
