use std::sync::Arc;

use axum::{
    extract::{Extension, rejection::JsonRejection},
    Json,
};

use crate::app::dto::{LoginRequest, LoginResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (login, password) = body.into_credentials()?;

    let token = services.auth.login(&login, password).await?;
    Ok(Json(LoginResponse { token }))
}
