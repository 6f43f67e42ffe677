use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use contracts::common::MessageResponse;
use contracts::domain::a001_category::{CategoryRead, CreateCategory};

use super::{api_error, internal_error, ApiError};
use crate::domain::a001_category::service;
use crate::shared::data::db::get_connection;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/v1/category
pub async fn list_all() -> Result<Json<Vec<CategoryRead>>, ApiError> {
    let items = service::list_active(get_connection())
        .await
        .map_err(internal_error)?;
    Ok(Json(items))
}

/// POST /api/v1/category — только администратор.
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<CreateCategory>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if !claims.is_admin() {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "You must be admin user for this",
        ));
    }
    service::create(get_connection(), dto)
        .await
        .map_err(internal_error)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(201, "Success")),
    ))
}

/// PUT /api/v1/category/:slug — только администратор.
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(slug): Path<String>,
    Json(dto): Json<CreateCategory>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !claims.is_admin() {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "You must be admin user for this",
        ));
    }
    let updated = service::update_by_slug(get_connection(), &slug, dto)
        .await
        .map_err(internal_error)?;
    if !updated {
        return Err(api_error(StatusCode::NOT_FOUND, "Category not found"));
    }
    Ok(Json(MessageResponse::new(
        200,
        "Category update is successful",
    )))
}

/// DELETE /api/v1/category/:slug — только администратор.
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !claims.is_admin() {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "You must be admin user for this",
        ));
    }
    let deleted = service::delete_by_slug(get_connection(), &slug)
        .await
        .map_err(internal_error)?;
    if !deleted {
        return Err(api_error(StatusCode::NOT_FOUND, "Category not found"));
    }
    Ok(Json(MessageResponse::new(
        200,
        "Category delete is successful",
    )))
}
