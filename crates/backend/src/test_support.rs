//! Общие помощники для тестов: in-memory база и сидирование данных.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::domain::{a001_category, a002_product};
use crate::shared::slug::slugify;
use crate::system::initialization::apply_schema;
use crate::system::users;

/// In-memory SQLite со схемой проекта. Пул из одного соединения,
/// чтобы конкурирующие транзакции сериализовались на нём, как на
/// одном файле базы.
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory database");
    apply_schema(&db).await.expect("failed to apply schema");
    db
}

/// File-backed SQLite with a real pool: транзакции из разных задач
/// действительно чередуются, проигравший писатель получает конфликт,
/// как в production. Для тестов сериализации и пути повтора.
pub async fn test_db_pooled() -> DatabaseConnection {
    let path = std::env::temp_dir().join(format!("reviews-test-{}.db", uuid::Uuid::new_v4()));
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options.max_connections(4).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open file-backed database");
    apply_schema(&db).await.expect("failed to apply schema");
    db
}

pub async fn seed_user(conn: &DatabaseConnection, username: &str) -> i64 {
    users::repository::insert(
        conn,
        users::repository::NewUser {
            first_name: "Test",
            last_name: "User",
            username,
            email: &format!("{}@example.com", username),
            password_hash: "$argon2id$stub",
            is_admin: false,
            is_supplier: false,
            is_customer: true,
        },
    )
    .await
    .expect("failed to seed user")
}

pub async fn seed_product(conn: &DatabaseConnection, name: &str, price: i64) -> i64 {
    let slug = slugify(name);
    let category_id =
        a001_category::repository::insert(conn, &format!("{} category", name), &slug, None)
            .await
            .expect("failed to seed category");
    a002_product::repository::insert(
        conn,
        a002_product::repository::NewProduct {
            name,
            slug: &slug,
            description: "seeded product",
            image_url: "https://example.com/image.png",
            price,
            stock: 10,
            category_id,
            supplier_id: None,
        },
    )
    .await
    .expect("failed to seed product")
}

pub async fn product_rating(conn: &DatabaseConnection, product_id: i64) -> f64 {
    a002_product::repository::find_active_by_id(conn, product_id)
        .await
        .expect("failed to load product")
        .expect("product not found")
        .rating
}
