//! 乐观更新模式 (Optimistic Mutation)
//!
//! 列表视图上的单字段变更：先改内存让变化立即可见，再发网络请求；
//! 失败时用第一步捕获的快照精确还原。每个实体同一时刻只保留一份
//! 在途快照，这不是事务日志。

use leptos::prelude::*;
use std::collections::HashSet;

/// 变更目标在本地集合中不存在
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotFound;

/// 一次在途乐观变更的提交/回滚凭据
#[must_use]
pub struct OptimisticUpdate<T> {
    snapshot: T,
}

impl<T: Clone> OptimisticUpdate<T> {
    /// 捕获变更前快照，并立即对内存集合应用变更。
    /// 找不到匹配实体时返回 `NotFound`，不做任何修改。
    pub fn apply(
        list: &mut [T],
        matches: impl Fn(&T) -> bool,
        mutate: impl FnOnce(&mut T),
    ) -> Result<Self, NotFound> {
        let Some(entry) = list.iter_mut().find(|entry| matches(entry)) else {
            return Err(NotFound);
        };
        let snapshot = entry.clone();
        mutate(entry);
        Ok(Self { snapshot })
    }

    /// 提交：把服务端响应的权威字段合并进实体，替换乐观猜测值
    pub fn commit(self, list: &mut [T], matches: impl Fn(&T) -> bool, merge: impl FnOnce(&mut T)) {
        if let Some(entry) = list.iter_mut().find(|entry| matches(entry)) {
            merge(entry);
        }
    }

    /// 回滚：还原变更前的快照。
    /// 返回快照副本，供调用方重置自带显示状态的输入控件。
    pub fn rollback(self, list: &mut [T], matches: impl Fn(&T) -> bool) -> T {
        if let Some(entry) = list.iter_mut().find(|entry| matches(entry)) {
            *entry = self.snapshot.clone();
        }
        self.snapshot
    }
}

/// 按实体序列化在途变更。
///
/// 同一实体上第二个并发变更会被拒绝，避免把尚未确认的乐观状态
/// 捕获成回滚快照；不同实体之间互不影响。
#[derive(Clone, Copy)]
pub struct PendingMutations {
    in_flight: RwSignal<HashSet<u64>>,
}

impl PendingMutations {
    pub fn new() -> Self {
        Self {
            in_flight: RwSignal::new(HashSet::new()),
        }
    }

    /// 尝试开始一次变更；该实体已有在途变更时返回 false
    pub fn begin(&self, id: u64) -> bool {
        self.in_flight
            .try_update(|set| set.insert(id))
            .unwrap_or(false)
    }

    /// 变更结算（无论成败）后释放
    pub fn finish(&self, id: u64) {
        self.in_flight.update(|set| {
            set.remove(&id);
        });
    }

    /// 响应式读取：该实体是否有在途变更
    pub fn contains(&self, id: u64) -> bool {
        self.in_flight.with(|set| set.contains(&id))
    }
}

impl Default for PendingMutations {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use astro_shared::protocol::OrderPatch;
    use astro_shared::{Order, OrderBuyer, OrderProduct, OrderStatus};
    use chrono::{TimeZone, Utc};

    #[derive(Debug, Clone, PartialEq)]
    struct Entity {
        id: u64,
        value: String,
    }

    fn entities() -> Vec<Entity> {
        vec![
            Entity {
                id: 1,
                value: "a".to_string(),
            },
            Entity {
                id: 2,
                value: "b".to_string(),
            },
        ]
    }

    #[test]
    fn apply_mutates_immediately() {
        let mut list = entities();

        let update = OptimisticUpdate::apply(&mut list, |e| e.id == 2, |e| {
            e.value = "changed".to_string();
        })
        .unwrap();

        // 网络确认之前变更已对视图可见
        assert_eq!(list[1].value, "changed");
        drop(update);
    }

    #[test]
    fn apply_missing_entity_is_notfound_and_noop() {
        let mut list = entities();
        let before = list.clone();

        let result = OptimisticUpdate::apply(&mut list, |e| e.id == 99, |e| {
            e.value = "changed".to_string();
        });

        assert_eq!(result.err(), Some(NotFound));
        assert_eq!(list, before);
    }

    #[test]
    fn rollback_restores_exact_snapshot() {
        let mut list = entities();
        let update = OptimisticUpdate::apply(&mut list, |e| e.id == 1, |e| {
            e.value = "guess".to_string();
        })
        .unwrap();

        let snapshot = update.rollback(&mut list, |e| e.id == 1);

        // 结算后可见状态等于变更发起前的状态
        assert_eq!(list, entities());
        assert_eq!(snapshot.value, "a");
    }

    #[test]
    fn commit_replaces_optimistic_guess_with_server_fields() {
        let mut list = entities();
        let update = OptimisticUpdate::apply(&mut list, |e| e.id == 1, |e| {
            e.value = "guess".to_string();
        })
        .unwrap();

        update.commit(&mut list, |e| e.id == 1, |e| {
            e.value = "authoritative".to_string();
        });

        assert_eq!(list[0].value, "authoritative");
    }

    /// 订单 7 Pending -> Shipped，服务端返回 {status, trackingNumber}
    #[test]
    fn order_status_scenario_commit() {
        let mut orders = vec![Order {
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
        }];

        let update = OptimisticUpdate::apply(&mut orders, |o| o.id == 7, |o| {
            o.status = OrderStatus::Shipped;
        })
        .unwrap();
        assert_eq!(orders[0].status, OrderStatus::Shipped);

        let patch = OrderPatch {
            status: Some(OrderStatus::Shipped),
            tracking_number: Some("TRK1".to_string()),
            ..OrderPatch::default()
        };
        update.commit(&mut orders, |o| o.id == 7, |o| patch.merge_into(o));

        assert_eq!(orders[0].status, OrderStatus::Shipped);
        assert_eq!(orders[0].tracking_number.as_deref(), Some("TRK1"));
    }

    /// 同一订单，调用失败：结算后可见状态等于变更前
    #[test]
    fn order_status_scenario_rollback() {
        let mut orders = entities();
        let update = OptimisticUpdate::apply(&mut orders, |e| e.id == 1, |e| {
            e.value = "Shipped".to_string();
        })
        .unwrap();

        let snapshot = update.rollback(&mut orders, |e| e.id == 1);

        assert_eq!(orders[0].value, "a");
        assert_eq!(snapshot.value, "a");
    }

    #[test]
    fn pending_rejects_second_mutation_on_same_entity() {
        let pending = PendingMutations::new();

        assert!(pending.begin(7));
        // 同一实体的第二个并发变更被拒绝
        assert!(!pending.begin(7));
        // 不同实体互不影响
        assert!(pending.begin(8));

        pending.finish(7);
        assert!(pending.begin(7));
    }

    #[test]
    fn finish_releases_entity() {
        let pending = PendingMutations::new();
        pending.begin(7);
        assert!(pending.contains(7));

        pending.finish(7);
        assert!(!pending.contains(7));
    }
}
