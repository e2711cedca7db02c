//! Public order endpoints: the intake form and tracking lookup.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use common::ServiceId;
use domain::{CreateOrder, OrderService, OrderTracking};
use order_store::{Customer, OrderRepository};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R: OrderRepository> {
    pub order_service: OrderService<R>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub service_id: i64,
    pub name: String,
    pub email: String,
    pub telp: String,
    pub description: String,
    pub due_date: NaiveDate,
}

impl CreateOrderRequest {
    /// Checks every field and converts the request into a domain command.
    ///
    /// All problems are reported together.
    pub fn validate(self, today: NaiveDate) -> Result<CreateOrder, ApiError> {
        let mut errors = Vec::new();

        if self.service_id <= 0 {
            errors.push("service_id must be a positive integer".to_string());
        }
        check_required(&mut errors, "name", &self.name);
        check_email(&mut errors, &self.email);
        check_required(&mut errors, "telp", &self.telp);
        check_description(&mut errors, &self.description);
        check_due_date(&mut errors, self.due_date, today);

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        Ok(CreateOrder::new(
            ServiceId::new(self.service_id),
            Customer::new(self.name.trim(), self.email.trim(), self.telp.trim()),
            self.description.trim(),
            self.due_date,
        ))
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderCreatedResponse {
    pub tracking_code: String,
    pub email_sent: bool,
    pub message: String,
}

// -- Field checks shared with the admin endpoints --

pub(crate) fn check_required(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    } else if value.chars().count() > 255 {
        errors.push(format!("{field} must be at most 255 characters"));
    }
}

pub(crate) fn check_email(errors: &mut Vec<String>, email: &str) {
    let email = email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        })
        && !email.chars().any(char::is_whitespace);

    if email.is_empty() {
        errors.push("email is required".to_string());
    } else if !well_formed {
        errors.push("email must be a valid e-mail address".to_string());
    }
}

pub(crate) fn check_description(errors: &mut Vec<String>, description: &str) {
    if description.trim().is_empty() {
        errors.push("description is required".to_string());
    } else if description.chars().count() > CreateOrder::MAX_DESCRIPTION_LEN {
        errors.push(format!(
            "description must be at most {} characters",
            CreateOrder::MAX_DESCRIPTION_LEN
        ));
    }
}

pub(crate) fn check_due_date(errors: &mut Vec<String>, due_date: NaiveDate, today: NaiveDate) {
    if due_date <= today {
        errors.push("due_date must be after today".to_string());
    }
}

// -- Handlers --

/// POST /orders — register a new order from the public form.
#[tracing::instrument(skip(state, req))]
pub async fn create<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError> {
    let cmd = req.validate(Utc::now().date_naive())?;
    let created = state.order_service.create_order(cmd).await?;

    let message = if created.email_sent {
        format!(
            "Order received. A confirmation with tracking code {} has been sent to your e-mail.",
            created.tracking_code
        )
    } else {
        format!(
            "Order received, but the confirmation e-mail could not be sent. \
             Please keep your tracking code {} to follow your order.",
            created.tracking_code
        )
    };

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            tracking_code: created.tracking_code,
            email_sent: created.email_sent,
            message,
        }),
    ))
}

/// GET /orders/track/{code} — public tracking view for a code.
#[tracing::instrument(skip(state))]
pub async fn track<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(code): Path<String>,
) -> Result<Json<OrderTracking>, ApiError> {
    state
        .order_service
        .track(&code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Order {} not found", code.trim())))
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            service_id: 3,
            name: " Budi ".to_string(),
            email: "budi@x.test".to_string(),
            telp: "0812".to_string(),
            description: "Company profile website".to_string(),
            due_date: today().checked_add_days(Days::new(1)).unwrap(),
        }
    }

    fn validation_errors(req: CreateOrderRequest) -> Vec<String> {
        match req.validate(today()) {
            Err(ApiError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_request_is_trimmed() {
        let cmd = request().validate(today()).unwrap();
        assert_eq!(cmd.customer.name, "Budi");
        assert_eq!(cmd.service_id, ServiceId::new(3));
    }

    #[test]
    fn test_due_date_must_be_after_today() {
        let mut req = request();
        req.due_date = today();
        assert_eq!(validation_errors(req), vec!["due_date must be after today"]);
    }

    #[test]
    fn test_all_errors_reported() {
        let req = CreateOrderRequest {
            service_id: 0,
            name: "  ".to_string(),
            email: "not-an-email".to_string(),
            telp: String::new(),
            description: "x".repeat(CreateOrder::MAX_DESCRIPTION_LEN + 1),
            due_date: today(),
        };
        assert_eq!(validation_errors(req).len(), 6);
    }

    #[test]
    fn test_email_shapes() {
        for bad in ["a@b", "@x.test", "a@@x.test", "a b@x.test", "a@x.test."] {
            let mut errors = Vec::new();
            check_email(&mut errors, bad);
            assert_eq!(errors.len(), 1, "{bad} should be rejected");
        }

        let mut errors = Vec::new();
        check_email(&mut errors, "budi.s@mail.example.id");
        assert!(errors.is_empty());
    }
}
