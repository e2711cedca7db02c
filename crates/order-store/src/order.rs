//! Persisted order records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderStatus, ServiceId};

/// Contact details supplied by the customer at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Customer {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// An order as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Public tracking code, e.g. `ORD-SITE-20260118-7QK2D`.
    pub code: String,
    pub service_id: ServiceId,
    pub customer: Customer,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns true once the order has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Data needed to insert a new order. New orders always start `Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub code: String,
    pub service_id: ServiceId,
    pub customer: Customer,
    pub description: String,
    pub due_date: NaiveDate,
}

impl NewOrder {
    /// Materialises the record the store will hold for this insert.
    pub(crate) fn into_order(self, id: OrderId, now: DateTime<Utc>) -> Order {
        Order {
            id,
            code: self.code,
            service_id: self.service_id,
            customer: self.customer,
            description: self.description,
            due_date: self.due_date,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update of an order. `None` fields are left untouched.
///
/// The code and the timestamps are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub service_id: Option<ServiceId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
}

impl OrderPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that only moves the status.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_service(mut self, service_id: ServiceId) -> Self {
        self.service_id = Some(service_id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns true if applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the set fields to `order` and bumps `updated_at`.
    pub fn apply(&self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(service_id) = self.service_id {
            order.service_id = service_id;
        }
        if let Some(ref name) = self.name {
            order.customer.name = name.clone();
        }
        if let Some(ref email) = self.email {
            order.customer.email = email.clone();
        }
        if let Some(ref phone) = self.phone {
            order.customer.phone = phone.clone();
        }
        if let Some(ref description) = self.description {
            order.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            order.due_date = due_date;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        order.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        NewOrder {
            code: "ORD-SITE-20260118-AAAAA".to_string(),
            service_id: ServiceId::new(1),
            customer: Customer::new("Budi", "budi@x.test", "0812"),
            description: "Landing page".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        }
        .into_order(OrderId::new(), Utc::now())
    }

    #[test]
    fn new_order_starts_pending() {
        let order = sample_order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, order.updated_at);
        assert!(!order.is_deleted());
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(OrderPatch::new().is_empty());
        assert!(!OrderPatch::status(OrderStatus::Running).is_empty());
    }

    #[test]
    fn apply_only_touches_set_fields() {
        let mut order = sample_order();
        let before = order.clone();
        let later = before.updated_at + chrono::Duration::seconds(5);

        OrderPatch::new()
            .with_email("budi@y.test")
            .with_status(OrderStatus::Verification)
            .apply(&mut order, later);

        assert_eq!(order.customer.email, "budi@y.test");
        assert_eq!(order.customer.name, before.customer.name);
        assert_eq!(order.status, OrderStatus::Verification);
        assert_eq!(order.code, before.code);
        assert_eq!(order.updated_at, later);
        assert_eq!(order.created_at, before.created_at);
    }
}
