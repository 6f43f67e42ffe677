use axum::extract::Query;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{api_error, internal_error, ApiError};
use crate::shared::data::db::get_connection;
use crate::system::users::service::{self, DeleteOutcome};

#[derive(Debug, Deserialize)]
pub struct PermissionQuery {
    pub user_id: i64,
}

fn status_detail(detail: &str) -> Json<Value> {
    Json(json!({ "status": 200, "detail": detail }))
}

/// PATCH /api/v1/permission — переключает роль supplier/customer.
/// Маршрут закрыт middleware require_admin.
pub async fn toggle_supplier(
    Query(query): Query<PermissionQuery>,
) -> Result<Json<Value>, ApiError> {
    let is_supplier = service::toggle_supplier(get_connection(), query.user_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "User does not exist!"))?;
    if is_supplier {
        Ok(status_detail("User is supplier now"))
    } else {
        Ok(status_detail("User is no longer supplier"))
    }
}

/// DELETE /api/v1/permission/delete — деактивация пользователя.
/// Администратора удалить нельзя.
pub async fn delete_user(Query(query): Query<PermissionQuery>) -> Result<Json<Value>, ApiError> {
    match service::delete(get_connection(), query.user_id)
        .await
        .map_err(internal_error)?
    {
        DeleteOutcome::NotFound => Err(api_error(StatusCode::NOT_FOUND, "User does not exist")),
        DeleteOutcome::IsAdmin => Err(api_error(
            StatusCode::FORBIDDEN,
            "You can not delete admin user",
        )),
        DeleteOutcome::Deleted => Ok(status_detail("User is deleted successfully")),
    }
}
