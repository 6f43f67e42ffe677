use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use contracts::common::{ListQuery, MessageResponse, PageResponse};
use contracts::domain::a003_review::{CreateReview, ReviewRead};

use super::{api_error, internal_error, ApiError};
use crate::domain::a003_review::error::ReviewError;
use crate::domain::a003_review::service;
use crate::shared::data::db::get_connection;
use crate::system::auth::extractor::CurrentUser;

fn review_error_response(err: ReviewError) -> ApiError {
    match err {
        ReviewError::NotFound => api_error(StatusCode::NOT_FOUND, "Review or product not found"),
        ReviewError::DuplicateReview => api_error(
            StatusCode::CONFLICT,
            "You have already left a review on this product",
        ),
        ReviewError::InvalidGrade => api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Grade must be between 1 and 5",
        ),
        ReviewError::Forbidden => api_error(
            StatusCode::FORBIDDEN,
            "You must be admin user for this",
        ),
        ReviewError::TransactionConflict => api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "The operation could not be completed, please retry",
        ),
        ReviewError::Db(db_err) => internal_error(db_err.into()),
    }
}

/// GET /api/v1/reviews
pub async fn list_all(
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse<ReviewRead>>, ApiError> {
    query
        .validate()
        .map_err(|msg| api_error(StatusCode::UNPROCESSABLE_ENTITY, &msg))?;
    let page = service::list(get_connection(), &query)
        .await
        .map_err(internal_error)?;
    Ok(Json(page))
}

/// GET /api/v1/reviews/:slug — отзывы одного товара.
pub async fn by_product(
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse<ReviewRead>>, ApiError> {
    query
        .validate()
        .map_err(|msg| api_error(StatusCode::UNPROCESSABLE_ENTITY, &msg))?;
    let page = service::list_by_product_slug(get_connection(), &slug, &query)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Product not found"))?;
    Ok(Json(page))
}

/// POST /api/v1/reviews — любой авторизованный пользователь.
pub async fn add(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<CreateReview>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    service::add_review(get_connection(), claims.sub, &dto)
        .await
        .map_err(review_error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(201, "Review added successfully")),
    ))
}

/// DELETE /api/v1/reviews/:id — только администратор.
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(review_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !claims.is_admin() {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "You must be admin user for this",
        ));
    }
    service::delete_review(get_connection(), review_id)
        .await
        .map_err(review_error_response)?;
    Ok(Json(MessageResponse::new(
        200,
        "Review deleted successfully",
    )))
}
