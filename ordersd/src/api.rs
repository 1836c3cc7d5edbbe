//! HTTP surface: order creation, item addition, health check.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use orders_app::{AddItemToOrder, AddItemToOrderInput, AppError, CreateOrder, CreateOrderInput};
use orders_domain::{MoneyView, Order};

pub struct ApiState {
    pub create_order: Arc<CreateOrder>,
    pub add_item_to_order: Arc<AddItemToOrder>,
    pub started_at: Instant,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/orders", post(create_order_handler))
        .route("/orders/:id", get(get_order_handler))
        .route("/orders/:id/items", post(add_item_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: u64,
}

async fn health_handler(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateOrderRequest {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderItemView {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub quantity: u32,
    #[serde(rename = "unitPrice")]
    pub unit_price: MoneyView,
    pub subtotal: MoneyView,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub items: Vec<OrderItemView>,
    pub total: MoneyView,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let items = order
            .items()
            .iter()
            .map(|item| OrderItemView {
                product_id: item.product_id().as_str().to_string(),
                quantity: item.quantity().value(),
                unit_price: item.unit_price().into(),
                subtotal: item
                    .subtotal()
                    .map(MoneyView::from)
                    .unwrap_or_else(|_| MoneyView {
                        amount: 0.0,
                        currency: "USD".to_string(),
                    }),
            })
            .collect();

        let total = order
            .calculate_total()
            .map(MoneyView::from)
            .unwrap_or_else(|_| MoneyView {
                amount: 0.0,
                currency: "USD".to_string(),
            });

        OrderView {
            order_id: order.id().as_str().to_string(),
            items,
            total,
            created_at: order.created_at(),
        }
    }
}

async fn create_order_handler(
    State(state): State<Arc<ApiState>>,
    body: Option<Json<CreateOrderRequest>>,
) -> Result<(StatusCode, Json<OrderView>), (StatusCode, Json<ErrorResponse>)> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let order = state
        .create_order
        .execute(CreateOrderInput {
            order_id: request.order_id,
        })
        .await
        .map_err(to_error_response)?;

    Ok((StatusCode::CREATED, Json(OrderView::from(&order))))
}

async fn add_item_handler(
    State(state): State<Arc<ApiState>>,
    Path(order_id): Path<String>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<OrderView>, (StatusCode, Json<ErrorResponse>)> {
    let order = state
        .add_item_to_order
        .execute(AddItemToOrderInput {
            order_id,
            product_id: request.product_id,
            quantity: request.quantity,
        })
        .await
        .map_err(to_error_response)?;

    Ok(Json(OrderView::from(&order)))
}

async fn get_order_handler(Path(_order_id): Path<String>) -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

fn to_error_response(error: AppError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, body) = match error {
        AppError::Validation { message, field } => (
            StatusCode::BAD_REQUEST,
            ErrorBody {
                kind: "validation",
                message,
                field,
                resource: None,
                id: None,
                reason: None,
            },
        ),
        AppError::NotFound { resource, id, message } => (
            StatusCode::NOT_FOUND,
            ErrorBody {
                kind: "not_found",
                message,
                field: None,
                resource: Some(resource.to_string()),
                id: Some(id),
                reason: None,
            },
        ),
        AppError::Conflict { message, reason } => (
            StatusCode::CONFLICT,
            ErrorBody {
                kind: "conflict",
                message,
                field: None,
                resource: None,
                id: None,
                reason: Some(reason.to_string()),
            },
        ),
        AppError::Infra { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody {
                kind: "infra",
                message,
                field: None,
                resource: None,
                id: None,
                reason: None,
            },
        ),
    };

    (status, Json(ErrorResponse { error: body }))
}
