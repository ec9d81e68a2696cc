//! 请求 / 响应载荷 (Protocol Payloads)
//!
//! 每个会被合并回本地状态的变更响应都有显式的结构定义，
//! 合并只发生在这些已声明的字段上，绝不盲目展开未知对象。

use crate::{Order, OrderStatus};
use serde::{Deserialize, Serialize};

// =========================================================
// 认证
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// =========================================================
// 订单
// =========================================================

/// `PATCH /orders/:id` 请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// 订单变更响应的类型化部分更新契约
///
/// 服务端可能返回整个订单，也可能只返回它重算过的派生字段
/// （例如发货后生成的运单号）。缺失的字段保持本地值不变。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
}

impl OrderPatch {
    /// 将服务端的权威字段合并进内存中的订单，覆盖乐观猜测值
    pub fn merge_into(self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(amount) = self.amount {
            order.amount = amount;
        }
        if let Some(tracking) = self.tracking_number {
            order.tracking_number = Some(tracking);
        }
        if let Some(invoice) = self.invoice_number {
            order.invoice_number = Some(invoice);
        }
    }
}

/// `GET /orders/:id/invoice` 响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    #[serde(default)]
    pub invoice_number: Option<String>,
}

// =========================================================
// 商品
// =========================================================

/// `POST /products` 请求体
///
/// `images` 只能携带上传接口返回的持久 URL，
/// 绝不能是本地预览用的临时 object URL。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: u32,
    pub images: Vec<String>,
}

/// `PATCH /products/:id` 请求体（行内编辑价格与库存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductEditRequest {
    pub price: f64,
    pub stock: u32,
}

/// `POST /products/upload` 响应：持久图片 URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

/// `DELETE /products/:id` 响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// =========================================================
// 错误
// =========================================================

/// 非 2xx 响应体中服务端可能携带的错误说明
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// 优先 `message`，其次 `error`，都没有则返回 None
    pub fn surface(self) -> Option<String> {
        self.message.or(self.error)
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OrderBuyer, OrderProduct};
    use chrono::{TimeZone, Utc};

    fn pending_order() -> Order {
        Order {
            id: 7,
            product: OrderProduct {
                name: "Mug".to_string(),
                price: 12.5,
            },
            buyer: OrderBuyer {
                email: "buyer@example.com".to_string(),
            },
            quantity: 2,
            amount: 25.0,
            status: OrderStatus::Pending,
            shipping_address: "1 Main St".to_string(),
            tracking_number: None,
            invoice_number: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn merge_applies_only_present_fields() {
        let mut order = pending_order();
        let patch: OrderPatch =
            serde_json::from_str(r#"{"status": "Shipped", "trackingNumber": "TRK1"}"#).unwrap();

        patch.merge_into(&mut order);

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.tracking_number.as_deref(), Some("TRK1"));
        // 未出现的字段保持不变
        assert_eq!(order.amount, 25.0);
        assert_eq!(order.invoice_number, None);
    }

    #[test]
    fn merge_of_empty_patch_is_noop() {
        let mut order = pending_order();
        let before = order.clone();

        OrderPatch::default().merge_into(&mut order);

        assert_eq!(order, before);
    }

    #[test]
    fn update_request_serializes_status_string() {
        let body = UpdateOrderStatusRequest {
            status: OrderStatus::Shipped,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"status":"Shipped"}"#
        );
    }

    #[test]
    fn error_body_prefers_message_over_error() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message": "stock too low", "error": "Bad Request"}"#)
                .unwrap();
        assert_eq!(body.surface().as_deref(), Some("stock too low"));

        let body: ErrorBody = serde_json::from_str(r#"{"error": "Bad Request"}"#).unwrap();
        assert_eq!(body.surface().as_deref(), Some("Bad Request"));

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.surface(), None);
    }
}
