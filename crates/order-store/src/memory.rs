use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    NewOrder, Order, OrderId, OrderPatch, OrderQuery, OrderStatistics, Page, Result, StoreError,
    store::{OrderRepository, UpdateOptions},
};

#[derive(Default)]
struct Inner {
    /// Insertion order; newest is last.
    orders: Vec<Order>,
    by_id: HashMap<OrderId, usize>,
    /// Every code ever issued, including soft-deleted orders.
    by_code: HashMap<String, usize>,
}

impl Inner {
    fn live(&self, id: OrderId) -> Option<usize> {
        self.by_id
            .get(&id)
            .copied()
            .filter(|&idx| !self.orders[idx].is_deleted())
    }
}

/// In-memory order store.
///
/// Backs tests and single-process deployments without a database. Holds the
/// same guarantees as the PostgreSQL implementation: code uniqueness is
/// checked under the write lock, and soft-deleted codes stay reserved.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders, including soft-deleted ones.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Returns the stored record for `id` even if it was soft-deleted.
    pub async fn find_including_deleted(&self, id: OrderId) -> Option<Order> {
        let inner = self.inner.read().await;
        inner.by_id.get(&id).map(|&idx| inner.orders[idx].clone())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.live(id).map(|idx| inner.orders[idx].clone()))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_code
            .get(code)
            .map(|&idx| &inner.orders[idx])
            .filter(|order| !order.is_deleted())
            .cloned())
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool> {
        Ok(self.inner.read().await.by_code.contains_key(code))
    }

    async fn create(&self, order: NewOrder) -> Result<Order> {
        let mut inner = self.inner.write().await;

        // Unique constraint simulation
        if inner.by_code.contains_key(&order.code) {
            return Err(StoreError::DuplicateCode { code: order.code });
        }

        let record = order.into_order(OrderId::new(), Utc::now());
        let idx = inner.orders.len();
        inner.by_id.insert(record.id, idx);
        inner.by_code.insert(record.code.clone(), idx);
        inner.orders.push(record.clone());

        Ok(record)
    }

    async fn update(
        &self,
        id: OrderId,
        patch: OrderPatch,
        options: UpdateOptions,
    ) -> Result<Option<Order>> {
        let mut inner = self.inner.write().await;
        let Some(idx) = inner.live(id) else {
            return Ok(None);
        };
        let order = &mut inner.orders[idx];

        if let Some(expected) = options.expected_status
            && order.status != expected
        {
            return Err(StoreError::StatusConflict {
                order_id: id,
                expected,
                actual: order.status,
            });
        }

        patch.apply(order, Utc::now());
        Ok(Some(order.clone()))
    }

    async fn soft_delete(&self, id: OrderId) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(idx) = inner.live(id) else {
            return Ok(false);
        };
        let now = Utc::now();
        let order = &mut inner.orders[idx];
        order.deleted_at = Some(now);
        order.updated_at = now;
        Ok(true)
    }

    async fn search(&self, query: OrderQuery) -> Result<Page<Order>> {
        let inner = self.inner.read().await;
        let matching: Vec<&Order> = inner
            .orders
            .iter()
            .rev()
            .filter(|order| query.matches(order))
            .collect();

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset())
            .take(query.per_page)
            .cloned()
            .collect();

        Ok(Page::new(items, query.page, query.per_page, total))
    }

    async fn statistics(&self) -> Result<OrderStatistics> {
        let inner = self.inner.read().await;
        Ok(OrderStatistics::from_counts(
            inner
                .orders
                .iter()
                .filter(|order| !order.is_deleted())
                .map(|order| (order.status, 1)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{Customer, OrderStatus, ServiceId, store::OrderRepositoryExt};

    fn new_order(code: &str, name: &str) -> NewOrder {
        NewOrder {
            code: code.to_string(),
            service_id: ServiceId::new(3),
            customer: Customer::new(name, format!("{}@x.test", name.to_lowercase()), "0812"),
            description: "Company profile website".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let store = InMemoryOrderRepository::new();
        let created = store
            .create(new_order("ORD-SITE-20261018-AAAAA", "Budi"))
            .await
            .unwrap();

        assert_eq!(created.status, OrderStatus::Pending);
        assert_eq!(store.find_by_id(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(
            store.find_by_code(&created.code).await.unwrap(),
            Some(created.clone())
        );
        assert!(store.exists_by_code(&created.code).await.unwrap());
        assert!(!store.exists_by_code("ORD-SITE-20261018-ZZZZZ").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let store = InMemoryOrderRepository::new();
        store
            .create(new_order("ORD-SITE-20261018-AAAAA", "Budi"))
            .await
            .unwrap();

        let result = store
            .create(new_order("ORD-SITE-20261018-AAAAA", "Siti"))
            .await;

        assert!(matches!(result, Err(StoreError::DuplicateCode { .. })));
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn soft_deleted_code_stays_reserved() {
        let store = InMemoryOrderRepository::new();
        let order = store
            .create(new_order("ORD-SITE-20261018-AAAAA", "Budi"))
            .await
            .unwrap();

        assert!(store.soft_delete(order.id).await.unwrap());
        assert!(!store.soft_delete(order.id).await.unwrap());

        assert_eq!(store.find_by_id(order.id).await.unwrap(), None);
        assert_eq!(store.find_by_code(&order.code).await.unwrap(), None);
        assert!(store.exists_by_code(&order.code).await.unwrap());
        assert!(matches!(
            store.create(new_order(&order.code, "Siti")).await,
            Err(StoreError::DuplicateCode { .. })
        ));

        let raw = store.find_including_deleted(order.id).await.unwrap();
        assert!(raw.is_deleted());
    }

    #[tokio::test]
    async fn update_applies_patch() {
        let store = InMemoryOrderRepository::new();
        let order = store
            .create(new_order("ORD-SITE-20261018-AAAAA", "Budi"))
            .await
            .unwrap();

        let updated = store
            .update(
                order.id,
                OrderPatch::new().with_phone("0899").with_status(OrderStatus::Verification),
                UpdateOptions::new(),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.customer.phone, "0899");
        assert_eq!(updated.status, OrderStatus::Verification);
        assert!(updated.updated_at >= order.updated_at);
    }

    #[tokio::test]
    async fn update_of_deleted_order_returns_none() {
        let store = InMemoryOrderRepository::new();
        let order = store
            .create(new_order("ORD-SITE-20261018-AAAAA", "Budi"))
            .await
            .unwrap();
        store.soft_delete(order.id).await.unwrap();

        let result = store
            .update(order.id, OrderPatch::status(OrderStatus::Verification), UpdateOptions::new())
            .await
            .unwrap();

        assert_eq!(result, None);
        let raw = store.find_including_deleted(order.id).await.unwrap();
        assert_eq!(raw.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn guarded_update_detects_conflict() {
        let store = InMemoryOrderRepository::new();
        let order = store
            .create(new_order("ORD-SITE-20261018-AAAAA", "Budi"))
            .await
            .unwrap();

        store
            .transition_status(order.id, OrderStatus::Pending, OrderStatus::Verification)
            .await
            .unwrap();

        let result = store
            .transition_status(order.id, OrderStatus::Pending, OrderStatus::Verification)
            .await;

        assert!(matches!(
            result,
            Err(StoreError::StatusConflict {
                expected: OrderStatus::Pending,
                actual: OrderStatus::Verification,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn search_is_newest_first_and_paginated() {
        let store = InMemoryOrderRepository::new();
        for (i, name) in ["Ani", "Budi", "Citra", "Dewi", "Eko"].iter().enumerate() {
            store
                .create(new_order(&format!("ORD-SITE-20261018-AAAA{i}"), name))
                .await
                .unwrap();
        }

        let page = store
            .search(OrderQuery::new().per_page(2))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        let names: Vec<_> = page.items.iter().map(|o| o.customer.name.as_str()).collect();
        assert_eq!(names, vec!["Eko", "Dewi"]);

        let last = store
            .search(OrderQuery::new().per_page(2).page(3))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].customer.name, "Ani");

        let beyond = store
            .search(OrderQuery::new().page(usize::MAX))
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[tokio::test]
    async fn search_filters_and_skips_deleted() {
        let store = InMemoryOrderRepository::new();
        let budi = store
            .create(new_order("ORD-SITE-20261018-AAAA1", "Budi"))
            .await
            .unwrap();
        store
            .create(new_order("ORD-SITE-20261018-AAAA2", "Budiman"))
            .await
            .unwrap();
        store
            .create(new_order("ORD-SITE-20261018-AAAA3", "Siti"))
            .await
            .unwrap();
        store.soft_delete(budi.id).await.unwrap();

        let page = store.search(OrderQuery::new().search("budi")).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].customer.name, "Budiman");
    }

    #[tokio::test]
    async fn statistics_count_live_orders() {
        let store = InMemoryOrderRepository::new();
        let a = store
            .create(new_order("ORD-SITE-20261018-AAAA1", "Ani"))
            .await
            .unwrap();
        let b = store
            .create(new_order("ORD-SITE-20261018-AAAA2", "Budi"))
            .await
            .unwrap();
        store
            .create(new_order("ORD-SITE-20261018-AAAA3", "Citra"))
            .await
            .unwrap();

        store
            .update(a.id, OrderPatch::status(OrderStatus::Completed), UpdateOptions::new())
            .await
            .unwrap();
        store.soft_delete(b.id).await.unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.count(OrderStatus::Completed), 1);
        assert_eq!(stats.count(OrderStatus::Pending), 1);
    }
}
