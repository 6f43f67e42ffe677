use sea_orm::DbErr;
use thiserror::Error;

/// Ошибки подсистемы отзывов и поддержания рейтинга.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Review or product not found!")]
    NotFound,

    #[error("You have already posted a review for this product.")]
    DuplicateReview,

    #[error("The rating must be between 1 and 5.")]
    InvalidGrade,

    #[error("You have not enough permission for this")]
    Forbidden,

    /// Lock/serialization failure; retried by the service layer a bounded
    /// number of times before reaching the caller.
    #[error("The operation conflicted with a concurrent transaction")]
    TransactionConflict,

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Переводит низкоуровневые ошибки БД в доменные: нарушение
/// уникальности — повторный отзыв, busy/serialization — конфликт
/// транзакций.
pub fn classify_db_err(err: DbErr) -> ReviewError {
    let message = err.to_string();
    if message.contains("UNIQUE constraint failed") {
        ReviewError::DuplicateReview
    } else if message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("could not serialize")
    {
        ReviewError::TransactionConflict
    } else {
        ReviewError::Db(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_duplicate() {
        let err = DbErr::Custom(
            "error returned from database: UNIQUE constraint failed: reviews.user_id".to_string(),
        );
        assert!(matches!(
            classify_db_err(err),
            ReviewError::DuplicateReview
        ));
    }

    #[test]
    fn busy_maps_to_transaction_conflict() {
        let err = DbErr::Custom("error returned from database: database is locked".to_string());
        assert!(matches!(
            classify_db_err(err),
            ReviewError::TransactionConflict
        ));
    }

    #[test]
    fn other_errors_pass_through() {
        let err = DbErr::Custom("no such table: reviews".to_string());
        assert!(matches!(classify_db_err(err), ReviewError::Db(_)));
    }
}
