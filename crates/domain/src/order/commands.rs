//! Order service inputs and outcomes.

use chrono::{DateTime, NaiveDate, Utc};
use common::{OrderId, OrderStatus, ServiceId};
use order_store::{Customer, Order};
use serde::Serialize;

use super::OrderLifecycle;

/// Command to register a new order from the public intake form.
///
/// Fields are expected to be validated by the caller: required values
/// present, a well-formed e-mail, a description of at most
/// `MAX_DESCRIPTION_LEN` characters, and a due date after today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub service_id: ServiceId,
    pub customer: Customer,
    pub description: String,
    pub due_date: NaiveDate,
}

impl CreateOrder {
    pub const MAX_DESCRIPTION_LEN: usize = 5000;

    /// Creates a new CreateOrder command.
    pub fn new(
        service_id: ServiceId,
        customer: Customer,
        description: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            service_id,
            customer,
            description: description.into(),
            due_date,
        }
    }
}

/// Result of a successful order creation.
#[derive(Debug, Clone)]
pub struct OrderCreated {
    pub order: Order,
    /// Code the customer uses to track the order.
    pub tracking_code: String,
    /// False if the confirmation message could not be sent. The order is
    /// stored either way.
    pub email_sent: bool,
}

/// Result of a successful order update.
#[derive(Debug, Clone)]
pub struct OrderUpdated {
    pub order: Order,
    pub previous_status: OrderStatus,
    /// Outcome of the status-changed message; None when the status did not change.
    pub email_sent: Option<bool>,
}

impl OrderUpdated {
    pub fn status_changed(&self) -> bool {
        self.order.status != self.previous_status
    }
}

/// What a customer sees when tracking an order by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTracking {
    pub id: OrderId,
    pub code: String,
    pub customer: Customer,
    pub service_id: ServiceId,
    pub service_title: String,
    pub due_date: NaiveDate,
    pub status: OrderStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

impl OrderTracking {
    pub(crate) fn new(order: Order, service_title: String) -> Self {
        Self {
            id: order.id,
            progress: OrderLifecycle::progress(order.status),
            code: order.code,
            customer: order.customer,
            service_id: order.service_id,
            service_title,
            due_date: order.due_date,
            status: order.status,
            created_at: order.created_at,
        }
    }
}
