//! Поддержание денормализованного рейтинга товара.
//!
//! Добавление отзыва обновляет средний рейтинг инкрементально, без
//! перечитывания всех оценок; удаление пересчитывает агрегат заново по
//! активным отзывам и тем самым устраняет накопленный дрейф округления.
//! Обе операции выполняются в одной транзакции: строка товара
//! блокируется на всё время read-modify-write, частичные записи
//! невозможны.

use contracts::domain::a003_review::grade_in_range;
use sea_orm::{DatabaseConnection, TransactionTrait};

use super::error::{classify_db_err, ReviewError};
use super::repository;
use crate::domain::a002_product::repository as products;

/// Рейтинг хранится с точностью до двух знаков. Ровно посередине
/// округляем от нуля (`4.125 -> 4.13`); оба пути, инкрементальный и
/// точный пересчёт, используют одно и то же округление.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Добавляет активный отзыв и инкрементально обновляет рейтинг товара.
///
/// Формула ветвится по числу активных отзывов `n`, не по значению
/// хранимого рейтинга: при `n == 0` рейтинг равен новой оценке, иначе
/// `round((r_old * n + grade) / (n + 1), 2)`. Возвращает id отзыва.
pub async fn add_review(
    db: &DatabaseConnection,
    product_id: i64,
    user_id: i64,
    grade: f64,
    comment: Option<&str>,
) -> Result<i64, ReviewError> {
    // Валидируется ещё на входе в HTTP-слой; здесь повторно, так как
    // оценка после создания не меняется.
    if !grade_in_range(grade) {
        return Err(ReviewError::InvalidGrade);
    }

    let txn = db.begin().await.map_err(classify_db_err)?;

    // Блокируем строку товара: два конкурентных добавления к одному
    // товару не должны прочитать одинаковые n/r_old (lost update).
    let product = products::find_active_for_update_txn(&txn, product_id)
        .await
        .map_err(classify_db_err)?
        .ok_or(ReviewError::NotFound)?;

    // Проверка уникальности выполняется под той же блокировкой; гонку
    // check-then-insert дополнительно закрывает частичный уникальный
    // индекс по (user_id, product_id, is_active = 1).
    if repository::find_active_by_user_and_product(&txn, user_id, product_id)
        .await
        .map_err(classify_db_err)?
        .is_some()
    {
        return Err(ReviewError::DuplicateReview);
    }

    let review_count = repository::count_active(&txn, product_id)
        .await
        .map_err(classify_db_err)?;
    let current_rating = if review_count == 0 { 0.0 } else { product.rating };

    let review_id = repository::insert(&txn, product_id, user_id, grade, comment)
        .await
        .map_err(classify_db_err)?;

    let new_rating = if review_count == 0 {
        grade
    } else {
        round2((current_rating * review_count as f64 + grade) / (review_count as f64 + 1.0))
    };

    products::set_rating_txn(&txn, product_id, new_rating)
        .await
        .map_err(classify_db_err)?;

    txn.commit().await.map_err(classify_db_err)?;

    tracing::debug!(
        "Review {} added for product {}: rating {} -> {}",
        review_id,
        product_id,
        current_rating,
        new_rating
    );
    Ok(review_id)
}

/// Гасит отзыв (Active → Inactive, терминально) и пересчитывает рейтинг
/// товара точным агрегатом по оставшимся активным отзывам; пустое
/// множество даёт ровно `0.0`.
pub async fn delete_review(db: &DatabaseConnection, review_id: i64) -> Result<(), ReviewError> {
    let txn = db.begin().await.map_err(classify_db_err)?;

    let review = repository::find_active_by_id(&txn, review_id)
        .await
        .map_err(classify_db_err)?
        .ok_or(ReviewError::NotFound)?;

    // Та же блокировка строки товара, что и при добавлении: удаление
    // сериализуется с конкурентными add по этому товару.
    products::find_for_update_txn(&txn, review.product_id)
        .await
        .map_err(classify_db_err)?
        .ok_or(ReviewError::NotFound)?;

    repository::soft_delete(&txn, review_id)
        .await
        .map_err(classify_db_err)?;

    // Агрегат по состоянию после soft-delete внутри этой же транзакции.
    let (count, average) = repository::active_stats(&txn, review.product_id)
        .await
        .map_err(classify_db_err)?;
    let new_rating = if count > 0 {
        round2(average.unwrap_or(0.0))
    } else {
        0.0
    };

    products::set_rating_txn(&txn, review.product_id, new_rating)
        .await
        .map_err(classify_db_err)?;

    txn.commit().await.map_err(classify_db_err)?;

    tracing::debug!(
        "Review {} deleted, product {} rating recomputed to {}",
        review_id,
        review.product_id,
        new_rating
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product_rating, seed_product, seed_user, test_db};

    #[tokio::test]
    async fn first_review_sets_rating_to_its_grade() {
        let db = test_db().await;
        let user = seed_user(&db, "johndoe").await;
        let product = seed_product(&db, "Smartphone", 100).await;

        add_review(&db, product, user, 5.0, Some("Great!")).await.unwrap();
        assert_eq!(product_rating(&db, product).await, 5.0);
    }

    #[tokio::test]
    async fn incremental_add_matches_exact_average() {
        let db = test_db().await;
        let user_1 = seed_user(&db, "johndoe").await;
        let user_2 = seed_user(&db, "janedoe").await;
        let product = seed_product(&db, "Smartphone", 100).await;

        add_review(&db, product, user_1, 5.0, None).await.unwrap();
        add_review(&db, product, user_2, 3.0, None).await.unwrap();
        // round((5.0 * 1 + 3.0) / 2, 2)
        assert_eq!(product_rating(&db, product).await, 4.0);
    }

    #[tokio::test]
    async fn rating_tracks_exact_average_across_a_sequence_of_adds() {
        let db = test_db().await;
        let product = seed_product(&db, "Laptop", 500).await;

        // Оценки подобраны так, что среднее на каждом шаге точно
        // представимо двумя знаками.
        let grades = [5.0, 3.0, 4.0, 4.0];
        let mut sum = 0.0;
        for (i, grade) in grades.iter().enumerate() {
            let user = seed_user(&db, &format!("user{}", i)).await;
            add_review(&db, product, user, *grade, None).await.unwrap();
            sum += grade;
            let exact = round2(sum / (i as f64 + 1.0));
            assert_eq!(product_rating(&db, product).await, exact);
        }
    }

    #[tokio::test]
    async fn second_active_review_from_same_user_is_rejected() {
        let db = test_db().await;
        let user = seed_user(&db, "johndoe").await;
        let product = seed_product(&db, "Smartphone", 100).await;

        add_review(&db, product, user, 5.0, None).await.unwrap();
        let err = add_review(&db, product, user, 4.0, None).await.unwrap_err();
        assert!(matches!(err, ReviewError::DuplicateReview));
        // Рейтинг не изменился, отзыв не вставлен.
        assert_eq!(product_rating(&db, product).await, 5.0);
        let count = repository::count_active(&db, product).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn delete_recomputes_exactly_and_empty_set_resets_to_zero() {
        let db = test_db().await;
        let user_1 = seed_user(&db, "alice").await;
        let user_2 = seed_user(&db, "bob").await;
        let product = seed_product(&db, "Book", 20).await;

        let review_1 = add_review(&db, product, user_1, 5.0, None).await.unwrap();
        let review_2 = add_review(&db, product, user_2, 3.0, None).await.unwrap();
        assert_eq!(product_rating(&db, product).await, 4.0);

        delete_review(&db, review_1).await.unwrap();
        assert_eq!(product_rating(&db, product).await, 3.0);

        delete_review(&db, review_2).await.unwrap();
        assert_eq!(product_rating(&db, product).await, 0.0);
    }

    #[tokio::test]
    async fn deleting_missing_or_inactive_review_is_not_found() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;
        let product = seed_product(&db, "Book", 20).await;

        let err = delete_review(&db, 777).await.unwrap_err();
        assert!(matches!(err, ReviewError::NotFound));

        let review = add_review(&db, product, user, 4.0, None).await.unwrap();
        delete_review(&db, review).await.unwrap();
        // Повторное удаление того же отзыва: переход терминальный.
        let err = delete_review(&db, review).await.unwrap_err();
        assert!(matches!(err, ReviewError::NotFound));
    }

    #[tokio::test]
    async fn out_of_range_grade_is_rejected_before_any_write() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;
        let product = seed_product(&db, "Book", 20).await;

        for grade in [0.0, 0.99, 5.01, f64::NAN] {
            let err = add_review(&db, product, user, grade, None).await.unwrap_err();
            assert!(matches!(err, ReviewError::InvalidGrade));
        }
        assert_eq!(product_rating(&db, product).await, 0.0);
    }

    #[tokio::test]
    async fn review_for_missing_product_is_not_found() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;

        let err = add_review(&db, 999, user, 4.0, None).await.unwrap_err();
        assert!(matches!(err, ReviewError::NotFound));
    }

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(3.9975), 4.0);
        assert_eq!(round2(4.333333), 4.33);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(4.125), 4.13);
    }
}
