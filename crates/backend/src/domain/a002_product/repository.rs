use contracts::domain::a002_product::ProductRead;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image_url: String,
    pub price: i64,
    pub stock: i64,
    pub supplier_id: Option<i64>,
    pub category_id: i64,
    pub rating: f64,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ProductRead {
    fn from(m: Model) -> Self {
        ProductRead {
            id: m.id,
            name: m.name,
            slug: m.slug,
            description: m.description,
            image_url: m.image_url,
            price: m.price,
            stock: m.stock,
            supplier_id: m.supplier_id,
            category_id: m.category_id,
            rating: m.rating,
            is_active: m.is_active,
        }
    }
}

/// Фильтры витрины: только активные товары с положительным остатком,
/// опционально текстовый поиск, диапазон цен и набор категорий.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub category_ids: Option<Vec<i64>>,
    pub limit: u64,
    pub offset: u64,
}

fn storefront_query(filter: &ProductFilter) -> Select<Entity> {
    let mut query = Entity::find()
        .filter(Column::IsActive.eq(true))
        .filter(Column::Stock.gt(0));

    if let Some(search) = &filter.search {
        query = query.filter(
            Condition::any()
                .add(Column::Name.contains(search))
                .add(Column::Description.contains(search)),
        );
    }
    if let Some(min_price) = filter.min_price {
        query = query.filter(Column::Price.gte(min_price));
    }
    if let Some(max_price) = filter.max_price {
        query = query.filter(Column::Price.lte(max_price));
    }
    if let Some(ids) = &filter.category_ids {
        query = query.filter(Column::CategoryId.is_in(ids.clone()));
    }
    query
}

pub async fn list_paginated<C: ConnectionTrait>(
    conn: &C,
    filter: &ProductFilter,
) -> anyhow::Result<(Vec<Model>, u64)> {
    let query = storefront_query(filter);
    let total = query.clone().count(conn).await?;
    let items = query
        .order_by_asc(Column::Id)
        .limit(filter.limit)
        .offset(filter.offset)
        .all(conn)
        .await?;
    Ok((items, total))
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

/// Карточка товара на витрине: активный и в наличии.
pub async fn find_storefront_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> anyhow::Result<Option<Model>> {
    let item = Entity::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::IsActive.eq(true))
        .filter(Column::Stock.gt(0))
        .one(conn)
        .await?;
    Ok(item)
}

pub async fn find_active_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> anyhow::Result<Option<Model>> {
    let item = Entity::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(conn)
        .await?;
    Ok(item)
}

/// Чтение строки товара с блокировкой на время транзакции (SELECT ..
/// FOR UPDATE там, где backend её поддерживает; на SQLite запись и так
/// сериализуется одним писателем).
pub async fn find_for_update_txn<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id).lock_exclusive().one(conn).await
}

pub async fn find_active_for_update_txn<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .lock_exclusive()
        .one(conn)
        .await
}

/// Единственная точка записи `products.rating`; вызывается только
/// агрегатором отзывов внутри его транзакции.
pub async fn set_rating_txn<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    rating: f64,
) -> Result<(), DbErr> {
    Entity::update_many()
        .col_expr(Column::Rating, Expr::value(rating))
        .filter(Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}

pub struct NewProduct<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub image_url: &'a str,
    pub price: i64,
    pub stock: i64,
    pub category_id: i64,
    pub supplier_id: Option<i64>,
}

pub async fn insert<C: ConnectionTrait>(conn: &C, new: NewProduct<'_>) -> anyhow::Result<i64> {
    let active = ActiveModel {
        name: Set(new.name.to_string()),
        slug: Set(new.slug.to_string()),
        description: Set(new.description.to_string()),
        image_url: Set(new.image_url.to_string()),
        price: Set(new.price),
        stock: Set(new.stock),
        supplier_id: Set(new.supplier_id),
        category_id: Set(new.category_id),
        rating: Set(0.0),
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
        description: Set(model.description),
        image_url: Set(model.image_url),
        price: Set(model.price),
        stock: Set(model.stock),
        supplier_id: Set(model.supplier_id),
        category_id: Set(model.category_id),
        rating: Set(model.rating),
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
