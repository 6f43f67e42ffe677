use contracts::common::{ListQuery, PageResponse};
use contracts::domain::a003_review::{CreateReview, ReviewRead};
use sea_orm::{ConnectionTrait, DatabaseConnection};

use super::error::ReviewError;
use super::repository::{self, ReviewFilter};
use super::aggregator;
use crate::domain::a002_product;

/// Сколько раз повторяем операцию при конфликте транзакций, прежде чем
/// вернуть ошибку вызывающему.
const TXN_RETRY_LIMIT: u32 = 5;

async fn with_retry<F, Fut, T>(operation: F) -> Result<T, ReviewError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, ReviewError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Err(ReviewError::TransactionConflict) if attempt + 1 < TXN_RETRY_LIMIT => {
                attempt += 1;
                tracing::warn!("Transaction conflict, retrying (attempt {})", attempt + 1);
                // Короткая пауза разводит конкурентов по времени.
                tokio::time::sleep(std::time::Duration::from_millis(10 * attempt as u64)).await;
            }
            other => return other,
        }
    }
}

pub async fn add_review(
    db: &DatabaseConnection,
    user_id: i64,
    dto: &CreateReview,
) -> Result<i64, ReviewError> {
    dto.validate().map_err(|_| ReviewError::InvalidGrade)?;
    with_retry(|| {
        aggregator::add_review(db, dto.product_id, user_id, dto.grade, dto.comment.as_deref())
    })
    .await
}

pub async fn delete_review(db: &DatabaseConnection, review_id: i64) -> Result<(), ReviewError> {
    with_retry(|| aggregator::delete_review(db, review_id)).await
}

fn filter_from_query(query: &ListQuery, product_id: Option<i64>) -> ReviewFilter {
    ReviewFilter {
        product_id,
        search: query.search.clone(),
        min_price: query.min_price,
        max_price: query.max_price,
        limit: query.limit(),
        offset: query.offset(),
    }
}

pub async fn list<C: ConnectionTrait>(
    conn: &C,
    query: &ListQuery,
) -> anyhow::Result<PageResponse<ReviewRead>> {
    let filter = filter_from_query(query, None);
    let (items, total) = repository::list_paginated(conn, &filter).await?;
    Ok(PageResponse {
        items: items.into_iter().map(Into::into).collect(),
        total,
        limit: filter.limit,
        offset: filter.offset,
    })
}

/// Отзывы одного товара по его слагу; `None` — товар не найден.
pub async fn list_by_product_slug<C: ConnectionTrait>(
    conn: &C,
    product_slug: &str,
    query: &ListQuery,
) -> anyhow::Result<Option<PageResponse<ReviewRead>>> {
    let Some(product) = a002_product::repository::find_by_slug(conn, product_slug).await? else {
        return Ok(None);
    };

    // Быстрый выход: цена товара вне фильтра — отзывов не будет.
    if query.min_price.map_or(false, |min| product.price < min)
        || query.max_price.map_or(false, |max| product.price > max)
    {
        return Ok(Some(PageResponse::empty(query.limit(), query.offset())));
    }

    let mut filter = filter_from_query(query, Some(product.id));
    // Цена уже проверена по самому товару, join не нужен.
    filter.min_price = None;
    filter.max_price = None;

    let (items, total) = repository::list_paginated(conn, &filter).await?;
    Ok(Some(PageResponse {
        items: items.into_iter().map(Into::into).collect(),
        total,
        limit: filter.limit,
        offset: filter.offset,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product_rating, seed_product, seed_user, test_db, test_db_pooled};

    fn query() -> ListQuery {
        ListQuery::default()
    }

    #[tokio::test]
    async fn listing_shows_only_active_reviews_newest_first() {
        let db = test_db().await;
        let user_1 = seed_user(&db, "alice").await;
        let user_2 = seed_user(&db, "bob").await;
        let product = seed_product(&db, "Smartphone", 100).await;

        let dto = CreateReview {
            product_id: product,
            comment: Some("Great!".to_string()),
            grade: 5.0,
        };
        let first = add_review(&db, user_1, &dto).await.unwrap();
        let dto = CreateReview {
            product_id: product,
            comment: Some("Not bad".to_string()),
            grade: 3.0,
        };
        add_review(&db, user_2, &dto).await.unwrap();

        delete_review(&db, first).await.unwrap();

        let page = list(&db, &query()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].comment.as_deref(), Some("Not bad"));
    }

    #[tokio::test]
    async fn listing_filters_by_comment_text_and_product_price() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;
        let cheap = seed_product(&db, "Pen", 2).await;
        let pricey = seed_product(&db, "Laptop", 900).await;

        let dto = CreateReview {
            product_id: cheap,
            comment: Some("writes well".to_string()),
            grade: 4.0,
        };
        add_review(&db, user, &dto).await.unwrap();
        let dto = CreateReview {
            product_id: pricey,
            comment: Some("fast machine".to_string()),
            grade: 5.0,
        };
        add_review(&db, user, &dto).await.unwrap();

        let q = ListQuery {
            search: Some("machine".to_string()),
            ..Default::default()
        };
        let page = list(&db, &q).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].product_id, pricey);

        let q = ListQuery {
            min_price: Some(100),
            ..Default::default()
        };
        let page = list(&db, &q).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].product_id, pricey);
    }

    #[tokio::test]
    async fn by_product_slug_handles_missing_product_and_price_fast_path() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;
        let product = seed_product(&db, "Smartphone", 100).await;

        let dto = CreateReview {
            product_id: product,
            comment: None,
            grade: 4.0,
        };
        add_review(&db, user, &dto).await.unwrap();

        assert!(list_by_product_slug(&db, "no-such-product", &query())
            .await
            .unwrap()
            .is_none());

        // Цена товара (100) ниже min_price — пустая страница без запроса
        // по отзывам.
        let q = ListQuery {
            min_price: Some(500),
            ..Default::default()
        };
        let page = list_by_product_slug(&db, "smartphone", &q)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.total, 0);

        let page = list_by_product_slug(&db, "smartphone", &query())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn rating_reads_are_stable_between_mutations() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;
        let product = seed_product(&db, "Smartphone", 100).await;

        let dto = CreateReview {
            product_id: product,
            comment: None,
            grade: 4.0,
        };
        add_review(&db, user, &dto).await.unwrap();

        let first = product_rating(&db, product).await;
        let second = product_rating(&db, product).await;
        assert_eq!(first, second);
        assert_eq!(first, 4.0);
    }

    #[tokio::test]
    async fn retry_recovers_from_transient_conflicts() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let attempts = AtomicU32::new(0);
        let result = with_retry(|| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ReviewError::TransactionConflict)
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);

        // Не сдавшийся конфликт всплывает после исчерпания лимита.
        let err = with_retry(|| async { Err::<(), _>(ReviewError::TransactionConflict) }).await;
        assert!(matches!(err, Err(ReviewError::TransactionConflict)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn two_concurrent_adds_never_lose_an_update() {
        let db = test_db_pooled().await;
        let user_1 = seed_user(&db, "alice").await;
        let user_2 = seed_user(&db, "bob").await;
        let product = seed_product(&db, "Fresh", 50).await;

        let db_1 = db.clone();
        let db_2 = db.clone();
        let dto_1 = CreateReview {
            product_id: product,
            comment: None,
            grade: 5.0,
        };
        let dto_2 = CreateReview {
            product_id: product,
            comment: None,
            grade: 3.0,
        };
        let t1 = tokio::spawn(async move { add_review(&db_1, user_1, &dto_1).await });
        let t2 = tokio::spawn(async move { add_review(&db_2, user_2, &dto_2).await });
        t1.await.unwrap().unwrap();
        t2.await.unwrap().unwrap();

        // Пул из нескольких соединений: транзакции реально чередуются,
        // проигравший писатель получает конфликт и повторяет попытку.
        // В любом порядке итог 4.0, никогда 5.0 или 3.0.
        assert_eq!(product_rating(&db, product).await, 4.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_concurrent_adds_converge_to_exact_average() {
        let db = test_db_pooled().await;
        let product = seed_product(&db, "Popular", 75).await;

        let grades = [5.0, 3.0, 5.0, 3.0, 5.0, 3.0, 5.0, 3.0];
        let mut users = Vec::new();
        for i in 0..grades.len() {
            users.push(seed_user(&db, &format!("reviewer{}", i)).await);
        }

        let mut tasks = Vec::new();
        for (user, grade) in users.into_iter().zip(grades) {
            let db = db.clone();
            tasks.push(tokio::spawn(async move {
                let dto = CreateReview {
                    product_id: product,
                    comment: None,
                    grade,
                };
                add_review(&db, user, &dto).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let expected = aggregator::round2(grades.iter().sum::<f64>() / grades.len() as f64);
        let actual = product_rating(&db, product).await;
        // Инкрементальное округление допускает дрейф меньше кванта
        // хранения; потерянное обновление сместило бы среднее на ~1.0.
        assert!(
            (actual - expected).abs() < 0.01,
            "rating {} diverged from exact average {}",
            actual,
            expected
        );
        let count = repository::count_active(&db, product).await.unwrap();
        assert_eq!(count, grades.len() as u64);
    }
}
