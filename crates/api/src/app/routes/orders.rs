use std::sync::Arc;

use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    Json,
};

use doorsales_core::OrderId;
use doorsales_sales::{Order, OrderDraft};

use crate::app::dto::{MessageResponse, OrderRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Parse and validate the body before any storage access.
fn draft_from(payload: Result<Json<OrderRequest>, JsonRejection>) -> Result<OrderDraft, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(OrderDraft::try_from(body)?)
}

fn order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse::<OrderId>()
        .map_err(|_| ApiError::BadRequest(format!("invalid order id {raw:?}")))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let draft = draft_from(payload)?;
    let order = services.orders.create(&draft).await?;

    tracing::info!(
        order_id = order.id.get(),
        doors = order.doors.len(),
        user = principal.login(),
        "order created"
    );
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(services.orders.list().await?))
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = order_id(&id)?;
    Ok(Json(services.orders.get(id).await?))
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let id = order_id(&id)?;
    let draft = draft_from(payload)?;
    let order = services.orders.update(id, &draft).await?;

    tracing::info!(
        order_id = id.get(),
        doors = order.doors.len(),
        user = principal.login(),
        "order updated"
    );
    Ok(Json(order))
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = order_id(&id)?;
    services.orders.delete(id).await?;

    tracing::info!(order_id = id.get(), user = principal.login(), "order deleted");
    Ok(Json(MessageResponse {
        message: "order deleted",
    }))
}
