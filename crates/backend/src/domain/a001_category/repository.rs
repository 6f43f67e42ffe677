use contracts::domain::a001_category::CategoryRead;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CategoryRead {
    fn from(m: Model) -> Self {
        CategoryRead {
            id: m.id,
            name: m.name,
            slug: m.slug,
            parent_id: m.parent_id,
            is_active: m.is_active,
        }
    }
}

pub async fn list_active<C: ConnectionTrait>(conn: &C) -> anyhow::Result<Vec<Model>> {
    let items = Entity::find()
        .filter(Column::IsActive.eq(true))
        .order_by_asc(Column::Id)
        .all(conn)
        .await?;
    Ok(items)
}

pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i64) -> anyhow::Result<Option<Model>> {
    let item = Entity::find_by_id(id).one(conn).await?;
    Ok(item)
}

pub async fn find_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> anyhow::Result<Option<Model>> {
    let item = Entity::find()
        .filter(Column::Slug.eq(slug))
        .one(conn)
        .await?;
    Ok(item)
}

pub async fn find_active_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> anyhow::Result<Option<Model>> {
    let item = Entity::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::IsActive.eq(true))
        .one(conn)
        .await?;
    Ok(item)
}

/// Прямые подкатегории (один уровень, как в выборке каталога).
pub async fn subcategory_ids<C: ConnectionTrait>(
    conn: &C,
    parent_id: i64,
) -> anyhow::Result<Vec<i64>> {
    let ids = Entity::find()
        .filter(Column::ParentId.eq(parent_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    Ok(ids)
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    slug: &str,
    parent_id: Option<i64>,
) -> anyhow::Result<i64> {
    let active = ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        parent_id: Set(parent_id),
        is_active: Set(true),
        ..Default::default()
    };
    let res = Entity::insert(active).exec(conn).await?;
    Ok(res.last_insert_id)
}

pub async fn update<C: ConnectionTrait>(conn: &C, model: Model) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(model.id),
        name: Set(model.name),
        slug: Set(model.slug),
        parent_id: Set(model.parent_id),
        is_active: Set(model.is_active),
    };
    active.update(conn).await?;
    Ok(())
}

pub async fn soft_delete<C: ConnectionTrait>(conn: &C, id: i64) -> anyhow::Result<()> {
    Entity::update_many()
        .col_expr(Column::IsActive, Expr::value(false))
        .filter(Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}
