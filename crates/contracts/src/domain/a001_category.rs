use serde::{Deserialize, Serialize};

/// Категория каталога. Слаг генерируется сервером из названия.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRead {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}
