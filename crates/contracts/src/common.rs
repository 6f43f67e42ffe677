use serde::{Deserialize, Serialize};

/// Транзакционное сообщение, возвращаемое мутирующими операциями
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status_code: u16,
    pub transaction: String,
}

impl MessageResponse {
    pub fn new(status_code: u16, transaction: impl Into<String>) -> Self {
        Self {
            status_code,
            transaction: transaction.into(),
        }
    }
}

/// Страница выборки с метаинформацией для пагинации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl<T> PageResponse<T> {
    pub fn empty(limit: u64, offset: u64) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            limit,
            offset,
        }
    }
}

/// Общие query-параметры списков: пагинация, текстовый поиск,
/// диапазон цен. Значения вне допустимых границ отклоняет handler.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 100;

impl ListQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    /// Checks pagination bounds and the price range before any query is built.
    pub fn validate(&self) -> Result<(), String> {
        let limit = self.limit();
        if limit < 1 || limit > MAX_PAGE_LIMIT {
            return Err(format!("limit must be between 1 and {}", MAX_PAGE_LIMIT));
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err("min_price must be less than or equal to max_price".to_string());
            }
        }
        if self.min_price.map_or(false, |v| v < 0) || self.max_price.map_or(false, |v| v < 0) {
            return Err("price bounds must be non-negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_is_valid() {
        let q = ListQuery::default();
        assert!(q.validate().is_ok());
        assert_eq!(q.limit(), DEFAULT_PAGE_LIMIT);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let q = ListQuery {
            min_price: Some(100),
            max_price: Some(10),
            ..Default::default()
        };
        assert!(q.validate().is_err());
    }

    #[test]
    fn oversized_limit_is_rejected() {
        let q = ListQuery {
            limit: Some(101),
            ..Default::default()
        };
        assert!(q.validate().is_err());
    }
}
