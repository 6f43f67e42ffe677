use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use contracts::common::{ListQuery, MessageResponse, PageResponse};
use contracts::domain::a002_product::{CreateProduct, ProductRead};

use super::{api_error, internal_error, ApiError};
use crate::domain::a002_product::service::{self, ProductOutcome};
use crate::shared::data::db::get_connection;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/v1/products
pub async fn list_all(
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse<ProductRead>>, ApiError> {
    query
        .validate()
        .map_err(|msg| api_error(StatusCode::UNPROCESSABLE_ENTITY, &msg))?;
    let page = service::list(get_connection(), &query)
        .await
        .map_err(internal_error)?;
    Ok(Json(page))
}

/// GET /api/v1/products/:slug — товары категории.
pub async fn by_category(
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse<ProductRead>>, ApiError> {
    query
        .validate()
        .map_err(|msg| api_error(StatusCode::UNPROCESSABLE_ENTITY, &msg))?;
    let page = service::list_by_category(get_connection(), &slug, &query)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Category not found"))?;
    Ok(Json(page))
}

/// GET /api/v1/products/detail/:slug
pub async fn detail(Path(slug): Path<String>) -> Result<Json<ProductRead>, ApiError> {
    let product = service::detail(get_connection(), &slug)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Product not found"))?;
    Ok(Json(product))
}

/// POST /api/v1/products — администратор или продавец.
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<CreateProduct>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if !claims.can_manage_products() {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "You must be admin or supplier user for this",
        ));
    }
    match service::create(get_connection(), dto, claims.sub)
        .await
        .map_err(internal_error)?
    {
        ProductOutcome::CategoryNotFound => {
            Err(api_error(StatusCode::NOT_FOUND, "Category not found"))
        }
        _ => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new(201, "Success")),
        )),
    }
}

/// PUT /api/v1/products/:slug
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(slug): Path<String>,
    Json(dto): Json<CreateProduct>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !claims.can_manage_products() {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "You must be admin or supplier user for this",
        ));
    }
    match service::update_by_slug(get_connection(), &slug, dto, &claims)
        .await
        .map_err(internal_error)?
    {
        ProductOutcome::ProductNotFound => {
            Err(api_error(StatusCode::NOT_FOUND, "Product not found"))
        }
        ProductOutcome::CategoryNotFound => {
            Err(api_error(StatusCode::NOT_FOUND, "Category not found"))
        }
        ProductOutcome::NotOwner => Err(api_error(
            StatusCode::FORBIDDEN,
            "You can only modify your own products",
        )),
        ProductOutcome::Ok => Ok(Json(MessageResponse::new(
            200,
            "Product update is successful",
        ))),
    }
}

/// DELETE /api/v1/products/:slug
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !claims.can_manage_products() {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "You must be admin or supplier user for this",
        ));
    }
    match service::delete_by_slug(get_connection(), &slug, &claims)
        .await
        .map_err(internal_error)?
    {
        ProductOutcome::ProductNotFound => {
            Err(api_error(StatusCode::NOT_FOUND, "Product not found"))
        }
        ProductOutcome::NotOwner => Err(api_error(
            StatusCode::FORBIDDEN,
            "You can only modify your own products",
        )),
        _ => Ok(Json(MessageResponse::new(
            200,
            "Product delete is successful",
        ))),
    }
}
