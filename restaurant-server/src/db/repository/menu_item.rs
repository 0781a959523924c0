//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::SqlitePool;

const MENU_ITEM_SELECT: &str =
    "SELECT id, name, description, price, created_at, updated_at FROM menu_item";

fn validate_price(price: f64) -> RepoResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(RepoError::Validation(format!(
            "Price cannot be negative: {price}"
        )));
    }
    Ok(())
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let sql = format!("{MENU_ITEM_SELECT} ORDER BY id");
    let rows = sqlx::query_as::<_, MenuItem>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let sql = format!("{MENU_ITEM_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: MenuItemCreate) -> RepoResult<MenuItem> {
    validate_price(data.price)?;

    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO menu_item (name, description, price, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
    if let Some(price) = data.price {
        validate_price(price)?;
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE menu_item SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), updated_at = ?4 WHERE id = ?5",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

/// Delete a menu item. Lines referencing it are removed by the schema's
/// cascade; past orders are never repriced.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM menu_item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
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

    #[tokio::test]
    async fn create_update_delete_roundtrip() {
        let pool = test_pool().await;
        let created = create(
            &pool,
            MenuItemCreate {
                name: "Margherita".into(),
                description: Some("Tomato, mozzarella, basil".into()),
                price: 8.5,
            },
        )
        .await
        .unwrap();
        assert_eq!(created.price, 8.5);

        let updated = update(
            &pool,
            created.id,
            MenuItemUpdate {
                name: None,
                description: None,
                price: Some(9.0),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, 9.0);
        assert_eq!(updated.name, "Margherita");

        delete(&pool, created.id).await.unwrap();
        assert!(find_by_id(&pool, created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let pool = test_pool().await;
        let err = create(
            &pool,
            MenuItemCreate {
                name: "Broken".into(),
                description: None,
                price: -1.0,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let pool = test_pool().await;
        let err = delete(&pool, 42).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
