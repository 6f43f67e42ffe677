use contracts::domain::a001_category::{CategoryRead, CreateCategory};
use sea_orm::ConnectionTrait;

use super::repository;
use crate::shared::slug::slugify;

pub async fn list_active<C: ConnectionTrait>(conn: &C) -> anyhow::Result<Vec<CategoryRead>> {
    let items = repository::list_active(conn).await?;
    Ok(items.into_iter().map(Into::into).collect())
}

pub async fn create<C: ConnectionTrait>(conn: &C, dto: CreateCategory) -> anyhow::Result<i64> {
    let slug = slugify(&dto.name);
    let id = repository::insert(conn, &dto.name, &slug, dto.parent_id).await?;
    tracing::info!("Category '{}' created with id {}", dto.name, id);
    Ok(id)
}

/// Возвращает `false`, если категории с таким слагом нет.
pub async fn update_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
    dto: CreateCategory,
) -> anyhow::Result<bool> {
    let Some(mut category) = repository::find_by_slug(conn, slug).await? else {
        return Ok(false);
    };
    category.slug = slugify(&dto.name);
    category.name = dto.name;
    category.parent_id = dto.parent_id;
    repository::update(conn, category).await?;
    Ok(true)
}

/// Soft-delete активной категории. `false`, если не найдена.
pub async fn delete_by_slug<C: ConnectionTrait>(conn: &C, slug: &str) -> anyhow::Result<bool> {
    let Some(category) = repository::find_active_by_slug(conn, slug).await? else {
        return Ok(false);
    };
    repository::soft_delete(conn, category.id).await?;
    Ok(true)
}
