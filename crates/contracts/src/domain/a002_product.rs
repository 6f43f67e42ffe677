use serde::{Deserialize, Serialize};

/// Товар каталога. `rating` — денормализованное среднее активных отзывов,
/// поддерживается исключительно агрегатором отзывов.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRead {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image_url: String,
    pub stock: i64,
    pub category: i64,
}
