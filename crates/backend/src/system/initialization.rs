use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::shared::config::AdminConfig;

/// Схема базы. Частичный уникальный индекс по (user_id, product_id)
/// среди активных отзывов закрывает гонку check-then-insert на уровне
/// хранилища.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    parent_id INTEGER REFERENCES categories(id),
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL DEFAULT '',
    hashed_password TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_admin INTEGER NOT NULL DEFAULT 0,
    is_supplier INTEGER NOT NULL DEFAULT 0,
    is_customer INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    image_url TEXT NOT NULL DEFAULT '',
    price INTEGER NOT NULL DEFAULT 0,
    stock INTEGER NOT NULL DEFAULT 0,
    supplier_id INTEGER REFERENCES users(id),
    category_id INTEGER NOT NULL REFERENCES categories(id),
    rating REAL NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER REFERENCES users(id),
    product_id INTEGER NOT NULL REFERENCES products(id),
    comment TEXT,
    comment_date TEXT NOT NULL,
    grade REAL NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_reviews_active_user_product
    ON reviews (user_id, product_id) WHERE is_active = 1;

CREATE TABLE IF NOT EXISTS sys_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    description TEXT,
    created_at TEXT,
    updated_at TEXT
);

CREATE TABLE IF NOT EXISTS sys_refresh_tokens (
    id TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id),
    token_hash TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    created_at TEXT NOT NULL,
    revoked_at TEXT
);
"#;

/// Apply the embedded schema. SQLite cannot execute a batch in one go,
/// so each statement runs separately.
pub async fn apply_schema<C: ConnectionTrait>(conn: &C) -> Result<()> {
    for (idx, statement) in SCHEMA_SQL.split(';').enumerate() {
        let trimmed = statement.trim();
        if trimmed.is_empty() {
            continue;
        }
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("{};", trimmed),
        ))
        .await
        .with_context(|| format!("Failed to execute schema statement #{}", idx))?;
    }
    tracing::info!("Database schema is up to date");
    Ok(())
}

/// Создаёт администратора из конфигурации, если его ещё нет.
pub async fn ensure_admin_user_exists(
    conn: &DatabaseConnection,
    admin: &AdminConfig,
) -> Result<()> {
    use crate::system::users::repository;

    if repository::any_admin_exists(conn).await? {
        return Ok(());
    }

    tracing::info!("No admin user found. Creating '{}'...", admin.username);
    let password_hash = crate::system::auth::password::hash_password(&admin.password)?;
    let admin_id = repository::insert(
        conn,
        repository::NewUser {
            first_name: "Admin",
            last_name: "",
            username: &admin.username,
            email: "",
            password_hash: &password_hash,
            is_admin: true,
            is_supplier: false,
            is_customer: false,
        },
    )
    .await?;
    tracing::warn!(
        "Default admin user '{}' created (id {}). Change the password immediately!",
        admin.username,
        admin_id
    );
    Ok(())
}
