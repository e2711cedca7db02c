//! Admin console endpoints: listing, detail, updates and bulk actions.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{OrderId, OrderStatus, Page, ServiceId};
use domain::{OrderLifecycle, OrderUpdated};
use order_store::{Order, OrderPatch, OrderQuery, OrderRepository, OrderStatistics};
use serde::{Deserialize, Serialize};

use super::orders::{AppState, check_description, check_email, check_required};
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub service_id: Option<i64>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    pub service_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub telp: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<String>,
}

impl UpdateOrderRequest {
    /// Checks the supplied fields and converts them into a patch.
    ///
    /// A due date in the past is accepted here: admins may record orders
    /// that are already overdue.
    pub fn into_patch(self) -> Result<OrderPatch, ApiError> {
        let mut errors = Vec::new();
        let mut patch = OrderPatch::new();

        if let Some(service_id) = self.service_id {
            if service_id <= 0 {
                errors.push("service_id must be a positive integer".to_string());
            }
            patch = patch.with_service(ServiceId::new(service_id));
        }
        if let Some(name) = self.name {
            check_required(&mut errors, "name", &name);
            patch = patch.with_name(name.trim());
        }
        if let Some(email) = self.email {
            check_email(&mut errors, &email);
            patch = patch.with_email(email.trim());
        }
        if let Some(telp) = self.telp {
            check_required(&mut errors, "telp", &telp);
            patch = patch.with_phone(telp.trim());
        }
        if let Some(description) = self.description {
            check_description(&mut errors, &description);
            patch = patch.with_description(description.trim());
        }
        if let Some(due_date) = self.due_date {
            patch = patch.with_due_date(due_date);
        }
        if let Some(status) = self.status {
            match status.parse::<OrderStatus>() {
                Ok(status) => patch = patch.with_status(status),
                Err(e) => errors.push(e.to_string()),
            }
        }

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        Ok(patch)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<OrderId>,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest {
    pub ids: Vec<OrderId>,
    pub status: String,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Page<Order>,
    pub total_pages: usize,
    pub statistics: OrderStatistics,
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub order: Order,
    pub next_options: Vec<OrderStatus>,
    pub progress: u8,
    pub is_terminal: bool,
}

impl From<Order> for OrderDetailResponse {
    fn from(order: Order) -> Self {
        Self {
            next_options: OrderLifecycle::next_options(order.status).to_vec(),
            progress: OrderLifecycle::progress(order.status),
            is_terminal: OrderLifecycle::is_terminal(order.status),
            order,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderUpdatedResponse {
    #[serde(flatten)]
    pub detail: OrderDetailResponse,
    pub previous_status: OrderStatus,
    pub status_changed: bool,
    pub email_sent: Option<bool>,
}

impl From<OrderUpdated> for OrderUpdatedResponse {
    fn from(updated: OrderUpdated) -> Self {
        Self {
            status_changed: updated.status_changed(),
            previous_status: updated.previous_status,
            email_sent: updated.email_sent,
            detail: updated.order.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub affected: usize,
}

// -- Handlers --

/// GET /admin/orders — paginated order list with dashboard counters.
#[tracing::instrument(skip(state))]
pub async fn list<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let mut query = OrderQuery::new();
    if let Some(search) = params.search {
        query = query.search(search);
    }
    if let Some(status) = params.status.filter(|s| !s.trim().is_empty()) {
        query = query.status(parse_status(&status)?);
    }
    if let Some(service_id) = params.service_id {
        query = query.service_id(ServiceId::new(service_id));
    }
    if let Some(page) = params.page {
        query = query.page(page);
    }
    if let Some(per_page) = params.per_page {
        query = query.per_page(per_page);
    }

    let orders = state.order_service.list(query).await?;
    let statistics = state.order_service.statistics().await?;

    Ok(Json(OrderListResponse {
        total_pages: orders.total_pages(),
        orders,
        statistics,
    }))
}

/// GET /admin/orders/{id} — full order with its workflow options.
#[tracing::instrument(skip(state))]
pub async fn get<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .order_service
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(order.into()))
}

/// PATCH /admin/orders/{id} — update order fields, optionally the status.
#[tracing::instrument(skip(state, req))]
pub async fn update<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderUpdatedResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let patch = req.into_patch()?;

    let updated = state.order_service.update_order(order_id, patch).await?;
    Ok(Json(updated.into()))
}

/// POST /admin/orders/{id}/status — move an order to its next status.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderUpdatedResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let target = parse_status(&req.status)?;

    let updated = state.order_service.update_status(order_id, target).await?;
    Ok(Json(updated.into()))
}

/// DELETE /admin/orders/{id} — soft-delete an order.
#[tracing::instrument(skip(state))]
pub async fn delete<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id = parse_order_id(&id)?;

    if state.order_service.delete_order(order_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Order {id} not found")))
    }
}

/// POST /admin/orders/bulk-delete — soft-delete many orders.
#[tracing::instrument(skip(state, req))]
pub async fn bulk_delete<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<BulkDeleteRequest>,
) -> Json<BulkResponse> {
    let affected = state.order_service.bulk_delete(&req.ids).await;
    Json(BulkResponse { affected })
}

/// POST /admin/orders/bulk-status — move many orders to one status.
#[tracing::instrument(skip(state, req))]
pub async fn bulk_status<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<BulkStatusRequest>,
) -> Result<Json<BulkResponse>, ApiError> {
    let target = parse_status(&req.status)?;
    let affected = state
        .order_service
        .bulk_update_status(&req.ids, target)
        .await;
    Ok(Json(BulkResponse { affected }))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}

fn parse_status(status: &str) -> Result<OrderStatus, ApiError> {
    status
        .parse()
        .map_err(|e: common::ParseStatusError| ApiError::BadRequest(e.to_string()))
}
