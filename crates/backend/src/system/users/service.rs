use anyhow::Result;
use contracts::system::users::{CreateUser, User};
use sea_orm::ConnectionTrait;

use super::repository;
use crate::system::auth::password;

/// Итог регистрации: занятое имя пользователя не считается ошибкой
/// инфраструктуры, handler переводит его в 409.
pub enum RegisterOutcome {
    Created(User),
    UsernameTaken,
}

/// Итог удаления пользователя администратором.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    IsAdmin,
}

pub async fn register<C: ConnectionTrait>(
    conn: &C,
    dto: CreateUser,
) -> Result<RegisterOutcome> {
    if dto.username.trim().is_empty() {
        anyhow::bail!("Username cannot be empty");
    }
    if !dto.email.trim().is_empty() && !dto.email.contains('@') {
        anyhow::bail!("Invalid email format");
    }
    if repository::find_by_username(conn, &dto.username)
        .await?
        .is_some()
    {
        return Ok(RegisterOutcome::UsernameTaken);
    }

    password::validate_password_strength(&dto.password)?;
    let password_hash = password::hash_password(&dto.password)?;

    let user_id = repository::insert(
        conn,
        repository::NewUser {
            first_name: &dto.first_name,
            last_name: &dto.last_name,
            username: &dto.username,
            email: &dto.email,
            password_hash: &password_hash,
            is_admin: false,
            is_supplier: false,
            is_customer: true,
        },
    )
    .await?;

    let user = repository::find_by_id(conn, user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User vanished right after insert"))?;
    tracing::info!("User '{}' registered with id {}", user.username, user_id);
    Ok(RegisterOutcome::Created(user.into()))
}

/// Verify user credentials (for login)
pub async fn verify_credentials<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    password: &str,
) -> Result<Option<User>> {
    let user = match repository::find_by_username(conn, username).await? {
        Some(u) => u,
        None => return Ok(None),
    };

    if !user.is_active {
        return Ok(None);
    }

    if !password::verify_password(password, &user.hashed_password)? {
        return Ok(None);
    }

    Ok(Some(user.into()))
}

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<User>> {
    let user = repository::find_by_id(conn, id).await?;
    Ok(user.map(Into::into))
}

/// Переключает роль поставщика. `None` — пользователь не найден или
/// неактивен; `Some(true)` — теперь поставщик.
pub async fn toggle_supplier<C: ConnectionTrait>(conn: &C, user_id: i64) -> Result<Option<bool>> {
    let Some(user) = repository::find_by_id(conn, user_id).await? else {
        return Ok(None);
    };
    if !user.is_active {
        return Ok(None);
    }
    let now_supplier = !user.is_supplier;
    repository::set_supplier_role(conn, user_id, now_supplier).await?;
    Ok(Some(now_supplier))
}

/// Soft-delete пользователя; администратора удалить нельзя.
pub async fn delete<C: ConnectionTrait>(conn: &C, user_id: i64) -> Result<DeleteOutcome> {
    let Some(user) = repository::find_by_id(conn, user_id).await? else {
        return Ok(DeleteOutcome::NotFound);
    };
    if user.is_admin {
        return Ok(DeleteOutcome::IsAdmin);
    }
    repository::soft_delete(conn, user_id).await?;
    Ok(DeleteOutcome::Deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn create_dto(username: &str) -> CreateUser {
        CreateUser {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            username: username.to_string(),
            email: "john@example.com".to_string(),
            password: "s3cret-pass".to_string(),
        }
    }

    #[tokio::test]
    async fn register_login_roundtrip() {
        let db = test_db().await;
        let outcome = register(&db, create_dto("johndoe")).await.unwrap();
        let user = match outcome {
            RegisterOutcome::Created(user) => user,
            RegisterOutcome::UsernameTaken => panic!("username unexpectedly taken"),
        };
        assert!(!user.is_admin());

        let verified = verify_credentials(&db, "johndoe", "s3cret-pass")
            .await
            .unwrap();
        assert!(verified.is_some());
        let rejected = verify_credentials(&db, "johndoe", "wrong-pass")
            .await
            .unwrap();
        assert!(rejected.is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_reported() {
        let db = test_db().await;
        register(&db, create_dto("johndoe")).await.unwrap();
        let outcome = register(&db, create_dto("johndoe")).await.unwrap();
        assert!(matches!(outcome, RegisterOutcome::UsernameTaken));
    }

    #[tokio::test]
    async fn supplier_toggle_flips_roles() {
        let db = test_db().await;
        let RegisterOutcome::Created(user) = register(&db, create_dto("johndoe")).await.unwrap()
        else {
            panic!("registration failed");
        };

        assert_eq!(toggle_supplier(&db, user.id).await.unwrap(), Some(true));
        let reloaded = repository::find_by_id(&db, user.id).await.unwrap().unwrap();
        assert!(reloaded.is_supplier && !reloaded.is_customer);

        assert_eq!(toggle_supplier(&db, user.id).await.unwrap(), Some(false));
        let reloaded = repository::find_by_id(&db, user.id).await.unwrap().unwrap();
        assert!(!reloaded.is_supplier && reloaded.is_customer);

        assert_eq!(toggle_supplier(&db, 999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn admin_cannot_be_deleted() {
        let db = test_db().await;
        let admin_id = repository::insert(
            &db,
            repository::NewUser {
                first_name: "Admin",
                last_name: "",
                username: "admin",
                email: "",
                password_hash: "hash",
                is_admin: true,
                is_supplier: false,
                is_customer: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(delete(&db, admin_id).await.unwrap(), DeleteOutcome::IsAdmin);
        assert_eq!(delete(&db, 999).await.unwrap(), DeleteOutcome::NotFound);
    }
}
