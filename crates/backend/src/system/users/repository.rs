use std::collections::BTreeSet;

use contracts::system::auth::Role;
use contracts::system::users::User;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_supplier: bool,
    pub is_customer: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Role flags в хранилище, типизированный набор ролей наружу.
    pub fn roles(&self) -> BTreeSet<Role> {
        let mut roles = BTreeSet::new();
        if self.is_admin {
            roles.insert(Role::Admin);
        }
        if self.is_supplier {
            roles.insert(Role::Supplier);
        }
        if self.is_customer {
            roles.insert(Role::Customer);
        }
        roles
    }
}

impl From<Model> for User {
    fn from(m: Model) -> Self {
        let roles = m.roles();
        User {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            username: m.username,
            email: m.email,
            is_active: m.is_active,
            roles,
        }
    }
}

pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
    pub is_supplier: bool,
    pub is_customer: bool,
}

pub async fn insert<C: ConnectionTrait>(conn: &C, new: NewUser<'_>) -> anyhow::Result<i64> {
    let active = ActiveModel {
        first_name: Set(new.first_name.to_string()),
        last_name: Set(new.last_name.to_string()),
        username: Set(new.username.to_string()),
        email: Set(new.email.to_string()),
        hashed_password: Set(new.password_hash.to_string()),
        is_active: Set(true),
        is_admin: Set(new.is_admin),
        is_supplier: Set(new.is_supplier),
        is_customer: Set(new.is_customer),
        ..Default::default()
    };
    let res = Entity::insert(active).exec(conn).await?;
    Ok(res.last_insert_id)
}

pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i64) -> anyhow::Result<Option<Model>> {
    let user = Entity::find_by_id(id).one(conn).await?;
    Ok(user)
}

pub async fn find_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> anyhow::Result<Option<Model>> {
    let user = Entity::find()
        .filter(Column::Username.eq(username))
        .one(conn)
        .await?;
    Ok(user)
}

pub async fn any_admin_exists<C: ConnectionTrait>(conn: &C) -> anyhow::Result<bool> {
    let count = Entity::find()
        .filter(Column::IsAdmin.eq(true))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Переключает роль поставщика; supplier и customer взаимоисключающи.
pub async fn set_supplier_role<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    is_supplier: bool,
) -> anyhow::Result<()> {
    Entity::update_many()
        .col_expr(Column::IsSupplier, Expr::value(is_supplier))
        .col_expr(Column::IsCustomer, Expr::value(!is_supplier))
        .filter(Column::Id.eq(id))
        .exec(conn)
        .await?;
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
