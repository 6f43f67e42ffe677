use contracts::common::{ListQuery, PageResponse};
use contracts::domain::a002_product::{CreateProduct, ProductRead};
use contracts::system::auth::TokenClaims;
use sea_orm::ConnectionTrait;

use super::repository::{self, ProductFilter};
use crate::domain::a001_category;
use crate::shared::slug::slugify;

/// Исход административных операций над товаром; handler переводит
/// его в HTTP-статус.
#[derive(Debug, PartialEq, Eq)]
pub enum ProductOutcome {
    Ok,
    ProductNotFound,
    CategoryNotFound,
    NotOwner,
}

fn filter_from_query(query: &ListQuery) -> ProductFilter {
    ProductFilter {
        search: query.search.clone(),
        min_price: query.min_price,
        max_price: query.max_price,
        category_ids: None,
        limit: query.limit(),
        offset: query.offset(),
    }
}

pub async fn list<C: ConnectionTrait>(
    conn: &C,
    query: &ListQuery,
) -> anyhow::Result<PageResponse<ProductRead>> {
    let filter = filter_from_query(query);
    let (items, total) = repository::list_paginated(conn, &filter).await?;
    Ok(PageResponse {
        items: items.into_iter().map(Into::into).collect(),
        total,
        limit: filter.limit,
        offset: filter.offset,
    })
}

/// Товары по слагу категории, включая её прямые подкатегории.
/// `None` — категория не найдена или неактивна.
pub async fn list_by_category<C: ConnectionTrait>(
    conn: &C,
    category_slug: &str,
    query: &ListQuery,
) -> anyhow::Result<Option<PageResponse<ProductRead>>> {
    let Some(category) = a001_category::repository::find_active_by_slug(conn, category_slug).await?
    else {
        return Ok(None);
    };

    let mut category_ids = vec![category.id];
    category_ids.extend(a001_category::repository::subcategory_ids(conn, category.id).await?);

    let mut filter = filter_from_query(query);
    filter.category_ids = Some(category_ids);

    let (items, total) = repository::list_paginated(conn, &filter).await?;
    Ok(Some(PageResponse {
        items: items.into_iter().map(Into::into).collect(),
        total,
        limit: filter.limit,
        offset: filter.offset,
    }))
}

pub async fn detail<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> anyhow::Result<Option<ProductRead>> {
    let item = repository::find_storefront_by_slug(conn, slug).await?;
    Ok(item.map(Into::into))
}

pub async fn create<C: ConnectionTrait>(
    conn: &C,
    dto: CreateProduct,
    supplier_id: i64,
) -> anyhow::Result<ProductOutcome> {
    if a001_category::repository::find_by_id(conn, dto.category)
        .await?
        .is_none()
    {
        return Ok(ProductOutcome::CategoryNotFound);
    }
    let slug = slugify(&dto.name);
    let id = repository::insert(
        conn,
        repository::NewProduct {
            name: &dto.name,
            slug: &slug,
            description: &dto.description,
            image_url: &dto.image_url,
            price: dto.price,
            stock: dto.stock,
            category_id: dto.category,
            supplier_id: Some(supplier_id),
        },
    )
    .await?;
    tracing::info!("Product '{}' created with id {}", dto.name, id);
    Ok(ProductOutcome::Ok)
}

/// Обновление товара; продавец может менять только свои товары,
/// администратор — любые.
pub async fn update_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
    dto: CreateProduct,
    claims: &TokenClaims,
) -> anyhow::Result<ProductOutcome> {
    let Some(mut product) = repository::find_by_slug(conn, slug).await? else {
        return Ok(ProductOutcome::ProductNotFound);
    };
    if !claims.is_admin() && product.supplier_id != Some(claims.sub) {
        return Ok(ProductOutcome::NotOwner);
    }
    if a001_category::repository::find_by_id(conn, dto.category)
        .await?
        .is_none()
    {
        return Ok(ProductOutcome::CategoryNotFound);
    }

    product.slug = slugify(&dto.name);
    product.name = dto.name;
    product.description = dto.description;
    product.price = dto.price;
    product.image_url = dto.image_url;
    product.stock = dto.stock;
    product.category_id = dto.category;
    product.is_active = true;
    repository::update(conn, product).await?;
    Ok(ProductOutcome::Ok)
}

pub async fn delete_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
    claims: &TokenClaims,
) -> anyhow::Result<ProductOutcome> {
    let Some(product) = repository::find_by_slug(conn, slug).await? else {
        return Ok(ProductOutcome::ProductNotFound);
    };
    if !product.is_active {
        return Ok(ProductOutcome::ProductNotFound);
    }
    if !claims.is_admin() && product.supplier_id != Some(claims.sub) {
        return Ok(ProductOutcome::NotOwner);
    }
    repository::soft_delete(conn, product.id).await?;
    Ok(ProductOutcome::Ok)
}
