//! Customer Repository

use super::{RepoError, RepoResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use sqlx::SqlitePool;

const CUSTOMER_SELECT: &str =
    "SELECT id, name, email, phone, created_at, updated_at FROM customer";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} ORDER BY id");
    let rows = sqlx::query_as::<_, Customer>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Check whether an email is already used by another customer.
pub async fn email_taken(
    pool: &SqlitePool,
    email: &str,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let row: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM customer WHERE email = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1",
    )
    .bind(email)
    .bind(exclude_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn create(pool: &SqlitePool, data: CustomerCreate) -> RepoResult<Customer> {
    if let Some(ref email) = data.email
        && email_taken(pool, email, None).await?
    {
        return Err(RepoError::Duplicate(format!(
            "Customer with email {email} already exists"
        )));
    }

    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO customer (name, email, phone, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CustomerUpdate) -> RepoResult<Customer> {
    if let Some(ref email) = data.email
        && email_taken(pool, email, Some(id)).await?
    {
        return Err(RepoError::Duplicate(format!(
            "Customer with email {email} already exists"
        )));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE customer SET name = COALESCE(?1, name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), updated_at = ?4 WHERE id = ?5",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}

/// Delete a customer together with its orders and their lines.
///
/// The customer owns its orders, so removal is one transaction: no orphan
/// order or line may survive a partial failure.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM customer WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_none() {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }

    sqlx::query(
        "DELETE FROM order_item WHERE order_id IN (SELECT id FROM orders WHERE customer_id = ?)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM orders WHERE customer_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM customer WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn sample(name: &str, email: Option<&str>) -> CustomerCreate {
        CustomerCreate {
            name: name.into(),
            email: email.map(Into::into),
            phone: "555-0100".into(),
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let pool = test_pool().await;
        let created = create(&pool, sample("Alice", Some("alice@example.com")))
            .await
            .unwrap();

        let found = find_by_id(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Alice");
        assert_eq!(found.email.as_deref(), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let pool = test_pool().await;
        create(&pool, sample("Alice", Some("a@example.com")))
            .await
            .unwrap();

        let err = create(&pool, sample("Bob", Some("a@example.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // Missing emails never collide
        create(&pool, sample("Carol", None)).await.unwrap();
        create(&pool, sample("Dave", None)).await.unwrap();
    }

    #[tokio::test]
    async fn update_patches_only_supplied_fields() {
        let pool = test_pool().await;
        let created = create(&pool, sample("Alice", Some("a@example.com")))
            .await
            .unwrap();

        let updated = update(
            &pool,
            created.id,
            CustomerUpdate {
                id: None,
                name: Some("Alice B".into()),
                email: None,
                phone: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Alice B");
        assert_eq!(updated.email.as_deref(), Some("a@example.com"));
        assert_eq!(updated.phone, "555-0100");
    }

    #[tokio::test]
    async fn update_missing_customer_is_not_found() {
        let pool = test_pool().await;
        let err = update(
            &pool,
            999,
            CustomerUpdate {
                id: None,
                name: Some("Ghost".into()),
                email: None,
                phone: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_cascades_orders_and_lines() {
        let pool = test_pool().await;
        let customer = create(&pool, sample("Alice", None)).await.unwrap();
        let now = shared::util::now_millis();

        let menu_id: i64 = sqlx::query_scalar(
            "INSERT INTO menu_item (name, price, created_at, updated_at) VALUES ('Soup', 4.5, ?1, ?1) RETURNING id",
        )
        .bind(now)
        .fetch_one(&pool)
        .await
        .unwrap();

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (order_date, customer_id, created_at, updated_at) VALUES ('2025-02-08', ?1, ?2, ?2) RETURNING id",
        )
        .bind(customer.id)
        .bind(now)
        .fetch_one(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO order_item (order_id, menu_item_id, quantity, unit_price, total_price, created_at, updated_at) VALUES (?1, ?2, 2, 4.5, 9.0, ?3, ?3)",
        )
        .bind(order_id)
        .bind(menu_id)
        .bind(now)
        .execute(&pool)
        .await
        .unwrap();

        delete(&pool, customer.id).await.unwrap();

        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&pool)
            .await
            .unwrap();
        let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_item")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orders, 0);
        assert_eq!(lines, 0);

        let err = delete(&pool, customer.id).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
