use chrono::Utc;
use contracts::domain::a003_review::ReviewRead;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<i64>,
    pub product_id: i64,
    pub comment: Option<String>,
    pub comment_date: chrono::DateTime<Utc>,
    pub grade: f64,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::a002_product::repository::Entity",
        from = "Column::ProductId",
        to = "crate::domain::a002_product::repository::Column::Id"
    )]
    Product,
}

impl Related<crate::domain::a002_product::repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ReviewRead {
    fn from(m: Model) -> Self {
        ReviewRead {
            id: m.id,
            user_id: m.user_id,
            product_id: m.product_id,
            comment: m.comment,
            comment_date: m.comment_date,
            grade: m.grade,
            is_active: m.is_active,
        }
    }
}

/// Фильтры списка отзывов. Диапазон цен относится к товару отзыва
/// и требует соединения с таблицей товаров.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub product_id: Option<i64>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub limit: u64,
    pub offset: u64,
}

fn listing_query(filter: &ReviewFilter) -> Select<Entity> {
    use crate::domain::a002_product::repository as product;

    let mut query = Entity::find().filter(Column::IsActive.eq(true));

    if let Some(product_id) = filter.product_id {
        query = query.filter(Column::ProductId.eq(product_id));
    }
    if let Some(search) = &filter.search {
        query = query.filter(Column::Comment.contains(search));
    }
    if filter.min_price.is_some() || filter.max_price.is_some() {
        query = query.join(JoinType::InnerJoin, Relation::Product.def());
        if let Some(min_price) = filter.min_price {
            query = query.filter(product::Column::Price.gte(min_price));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(product::Column::Price.lte(max_price));
        }
    }
    query
}

pub async fn list_paginated<C: ConnectionTrait>(
    conn: &C,
    filter: &ReviewFilter,
) -> anyhow::Result<(Vec<Model>, u64)> {
    let query = listing_query(filter);
    let total = query.clone().count(conn).await?;
    let items = query
        .order_by_desc(Column::Id)
        .limit(filter.limit)
        .offset(filter.offset)
        .all(conn)
        .await?;
    Ok((items, total))
}

pub async fn find_active_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(conn)
        .await
}

pub async fn find_active_by_user_and_product<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    product_id: i64,
) -> Result<Option<Model>, DbErr> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::ProductId.eq(product_id))
        .filter(Column::IsActive.eq(true))
        .one(conn)
        .await
}

pub async fn count_active<C: ConnectionTrait>(conn: &C, product_id: i64) -> Result<u64, DbErr> {
    Entity::find()
        .filter(Column::ProductId.eq(product_id))
        .filter(Column::IsActive.eq(true))
        .count(conn)
        .await
}

/// `(count, average)` по активным отзывам товара одним агрегатным
/// запросом; читает состояние текущей транзакции.
pub async fn active_stats<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
) -> Result<(i64, Option<f64>), DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(id) AS cnt, AVG(grade) AS avg_grade
             FROM reviews WHERE product_id = ? AND is_active = 1",
            [product_id.into()],
        ))
        .await?
        .ok_or_else(|| DbErr::Custom("aggregate query returned no row".to_string()))?;

    let count: i64 = row.try_get("", "cnt")?;
    let average: Option<f64> = row.try_get("", "avg_grade")?;
    Ok((count, average))
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
    user_id: i64,
    grade: f64,
    comment: Option<&str>,
) -> Result<i64, DbErr> {
    let active = ActiveModel {
        user_id: Set(Some(user_id)),
        product_id: Set(product_id),
        comment: Set(comment.map(str::to_string)),
        comment_date: Set(Utc::now()),
        grade: Set(grade),
        is_active: Set(true),
        ..Default::default()
    };
    let res = Entity::insert(active).exec(conn).await?;
    Ok(res.last_insert_id)
}

/// Active → Inactive; переход терминальный, обратного нет.
pub async fn soft_delete<C: ConnectionTrait>(conn: &C, id: i64) -> Result<(), DbErr> {
    Entity::update_many()
        .col_expr(Column::IsActive, Expr::value(false))
        .filter(Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}
