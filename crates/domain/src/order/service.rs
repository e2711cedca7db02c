//! Order service: creation, status workflow, tracking and bulk admin actions.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use common::{OrderId, OrderStatus, Page, ServiceId};
use order_store::{
    NewOrder, Order, OrderPatch, OrderQuery, OrderRepository, OrderStatistics, StoreError,
    UpdateOptions,
};

use super::{
    CacheInvalidator, CacheTag, CreateOrder, LoggingDispatcher, NoopInvalidator,
    NotificationDispatcher, NotificationKind, OrderCodeGenerator, OrderCreated, OrderError,
    OrderLifecycle, OrderNotification, OrderTracking, OrderUpdated, ServiceCatalog,
    catalog::InMemoryServiceCatalog,
};
use crate::error::DomainError;

/// Default base URL for tracking links in notifications.
pub const DEFAULT_TRACKING_BASE_URL: &str = "http://localhost:3000/orders/track";

/// Service for managing orders.
///
/// Writes go to the repository first. Notifications are sent only after a
/// write has succeeded, and their failures are logged and reported as flags;
/// they never undo the write.
pub struct OrderService<R: OrderRepository> {
    repository: R,
    codes: OrderCodeGenerator,
    notifier: Arc<dyn NotificationDispatcher>,
    catalog: Arc<dyn ServiceCatalog>,
    cache: Arc<dyn CacheInvalidator>,
    tracking_base_url: String,
}

impl<R: OrderRepository> OrderService<R> {
    /// Creates a service with default collaborators: the `SITE` code tag,
    /// log-only notifications, an empty catalogue and no cache.
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            codes: OrderCodeGenerator::default(),
            notifier: Arc::new(LoggingDispatcher),
            catalog: Arc::new(InMemoryServiceCatalog::new()),
            cache: Arc::new(NoopInvalidator),
            tracking_base_url: DEFAULT_TRACKING_BASE_URL.to_string(),
        }
    }

    pub fn with_code_generator(mut self, codes: OrderCodeGenerator) -> Self {
        self.codes = codes;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn ServiceCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheInvalidator>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_tracking_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.tracking_base_url = base_url.into();
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn code_generator(&self) -> &OrderCodeGenerator {
        &self.codes
    }

    /// Registers a new order and sends the confirmation message.
    ///
    /// The tracking code is drawn until one is free. If the store still
    /// rejects it as a duplicate (a concurrent insert won the race), a new
    /// code is drawn, up to the generator's attempt budget.
    #[tracing::instrument(skip(self, cmd), fields(service_id = %cmd.service_id))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<OrderCreated, DomainError> {
        let start = Instant::now();
        let today = Utc::now().date_naive();
        let mut attempts = 0;

        let order = loop {
            let code = self.codes.generate(&self.repository, today).await?;
            let new_order = NewOrder {
                code,
                service_id: cmd.service_id,
                customer: cmd.customer.clone(),
                description: cmd.description.clone(),
                due_date: cmd.due_date,
            };

            match self.repository.create(new_order).await {
                Ok(order) => break order,
                Err(StoreError::DuplicateCode { code }) => {
                    attempts += 1;
                    metrics::counter!("order_code_collisions_total").increment(1);
                    tracing::warn!(%code, attempts, "order code lost insert race");
                    if attempts >= self.codes.max_attempts() {
                        return Err(OrderError::CodeGenerationExhausted { attempts }.into());
                    }
                }
                Err(e) => return Err(e.into()),
            }
        };

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(code = %order.code, order_id = %order.id, "order created");
        self.invalidate(&order);

        let email_sent = self.notify(NotificationKind::OrderCreated, &order).await;

        metrics::histogram!("order_create_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        Ok(OrderCreated {
            tracking_code: order.code.clone(),
            order,
            email_sent,
        })
    }

    /// Applies a field update to an order.
    ///
    /// A status in `patch` that differs from the current one must be a legal
    /// next step; it is written only if no one else changed the status in
    /// the meantime, and triggers a status-changed message. A status equal
    /// to the current one is ignored.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_order(
        &self,
        id: OrderId,
        mut patch: OrderPatch,
    ) -> Result<OrderUpdated, DomainError> {
        let current = self.require(id).await?;

        patch.status = patch.status.filter(|&status| status != current.status);
        if let Some(target) = patch.status {
            OrderLifecycle::validate(current.status, target)?;
        }

        if patch.is_empty() {
            return Ok(OrderUpdated {
                previous_status: current.status,
                order: current,
                email_sent: None,
            });
        }

        self.apply(current, patch).await
    }

    /// Moves an order to `target`, which must be a legal next step.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: OrderId,
        target: OrderStatus,
    ) -> Result<OrderUpdated, DomainError> {
        let current = self.require(id).await?;
        OrderLifecycle::validate(current.status, target)?;
        self.apply(current, OrderPatch::status(target)).await
    }

    /// Soft-deletes an order. Returns false if it was absent or already deleted.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<bool, DomainError> {
        let Some(order) = self.repository.find_by_id(id).await? else {
            return Ok(false);
        };

        let deleted = self.repository.soft_delete(id).await?;
        if deleted {
            tracing::info!(code = %order.code, "order deleted");
            self.invalidate(&order);
        }
        Ok(deleted)
    }

    /// Soft-deletes each order independently. Returns how many were deleted.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[OrderId]) -> usize {
        let mut deleted = 0;
        for &id in ids {
            match self.delete_order(id).await {
                Ok(true) => deleted += 1,
                Ok(false) => tracing::debug!(%id, "bulk delete skipped missing order"),
                Err(e) => tracing::warn!(%id, error = %e, "bulk delete failed for order"),
            }
        }
        deleted
    }

    /// Moves each order to `target` independently, with the same rules as
    /// [`update_status`](Self::update_status). Returns how many moved.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_update_status(&self, ids: &[OrderId], target: OrderStatus) -> usize {
        let mut updated = 0;
        for &id in ids {
            match self.update_status(id, target).await {
                Ok(_) => updated += 1,
                Err(e) => tracing::warn!(%id, error = %e, "bulk status update failed for order"),
            }
        }
        updated
    }

    /// Loads a live order by ID.
    pub async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Loads a live order by tracking code.
    ///
    /// Soft-deleted orders are not found, even though their codes stay reserved.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Order>, DomainError> {
        Ok(self.repository.find_by_code(code.trim()).await?)
    }

    /// Public tracking view for a code.
    #[tracing::instrument(skip(self))]
    pub async fn track(&self, code: &str) -> Result<Option<OrderTracking>, DomainError> {
        let Some(order) = self.find_by_code(code).await? else {
            return Ok(None);
        };
        let title = self.service_title(order.service_id).await;
        Ok(Some(OrderTracking::new(order, title)))
    }

    /// Statuses a live order may move to next.
    pub async fn next_options(&self, id: OrderId) -> Result<&'static [OrderStatus], DomainError> {
        let order = self.require(id).await?;
        Ok(OrderLifecycle::next_options(order.status))
    }

    /// Lists live orders for the admin console.
    pub async fn list(&self, query: OrderQuery) -> Result<Page<Order>, DomainError> {
        Ok(self.repository.search(query).await?)
    }

    /// Per-status counts of live orders.
    pub async fn statistics(&self) -> Result<OrderStatistics, DomainError> {
        Ok(self.repository.statistics().await?)
    }

    async fn require(&self, id: OrderId) -> Result<Order, DomainError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id).into())
    }

    /// Writes an already validated patch, guarded on the status it was
    /// validated against when the status changes.
    async fn apply(&self, current: Order, patch: OrderPatch) -> Result<OrderUpdated, DomainError> {
        let previous_status = current.status;
        let status_change = patch.status.filter(|&status| status != previous_status);
        let options = match status_change {
            Some(_) => UpdateOptions::expect_status(previous_status),
            None => UpdateOptions::new(),
        };

        let order = self
            .repository
            .update(current.id, patch, options)
            .await?
            .ok_or(OrderError::NotFound(current.id))?;
        self.invalidate(&order);

        let email_sent = match status_change {
            Some(target) => {
                metrics::counter!(
                    "order_status_transitions_total",
                    "from" => previous_status.as_str(),
                    "to" => target.as_str()
                )
                .increment(1);
                tracing::info!(
                    code = %order.code,
                    from = %previous_status,
                    to = %target,
                    "order status changed"
                );
                Some(self.notify(NotificationKind::StatusChanged, &order).await)
            }
            None => None,
        };

        Ok(OrderUpdated {
            order,
            previous_status,
            email_sent,
        })
    }

    /// Sends a notification for `order`. Failures are logged and reported as false.
    async fn notify(&self, kind: NotificationKind, order: &Order) -> bool {
        let notification = OrderNotification {
            kind,
            recipient: order.customer.email.clone(),
            customer_name: order.customer.name.clone(),
            code: order.code.clone(),
            service_name: self.service_title(order.service_id).await,
            status: order.status,
            tracking_url: self.tracking_url(&order.code),
        };

        let result = match kind {
            NotificationKind::OrderCreated => self.notifier.send_order_created(&notification).await,
            NotificationKind::StatusChanged => {
                self.notifier.send_status_changed(&notification).await
            }
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                metrics::counter!("order_notifications_failed_total", "kind" => kind.as_str())
                    .increment(1);
                tracing::warn!(
                    code = %order.code,
                    kind = kind.as_str(),
                    error = %e,
                    "order notification failed"
                );
                false
            }
        }
    }

    async fn service_title(&self, id: ServiceId) -> String {
        self.catalog
            .service_title(id)
            .await
            .unwrap_or_else(|| format!("Service #{id}"))
    }

    fn tracking_url(&self, code: &str) -> String {
        format!("{}/{}", self.tracking_base_url.trim_end_matches('/'), code)
    }

    fn invalidate(&self, order: &Order) {
        self.cache.invalidate(&[
            CacheTag::OrderList,
            CacheTag::OrderStatistics,
            CacheTag::Order(order.code.clone()),
        ]);
    }
}
