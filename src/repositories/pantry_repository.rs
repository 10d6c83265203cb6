use crate::models::{PantryItem, Shelf, ShelfWithItems};
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait PantryRepository: Send + Sync {
    /// Shelves newest-first, each with its items; `query` filters shelves by
    /// name, case-insensitively.
    async fn list_shelves(
        &self,
        user_id: i64,
        query: Option<&str>,
    ) -> RepositoryResult<Vec<ShelfWithItems>>;
    async fn get_shelf(&self, id: i64) -> RepositoryResult<Option<Shelf>>;
    async fn find_shelf_by_name(
        &self,
        user_id: i64,
        name: &str,
    ) -> RepositoryResult<Option<Shelf>>;
    async fn create_shelf(&self, user_id: i64, name: &str) -> RepositoryResult<Shelf>;
    async fn rename_shelf(&self, id: i64, name: &str) -> RepositoryResult<()>;
    async fn delete_shelf(&self, id: i64) -> RepositoryResult<()>;

    async fn get_item(&self, id: i64) -> RepositoryResult<Option<PantryItem>>;
    async fn list_items(&self, user_id: i64) -> RepositoryResult<Vec<PantryItem>>;
    async fn create_item(
        &self,
        user_id: i64,
        shelf_id: i64,
        name: &str,
    ) -> RepositoryResult<PantryItem>;
    async fn delete_item(&self, id: i64) -> RepositoryResult<()>;
}

pub struct SqlitePantryRepository {
    pool: SqlitePool,
}

impl SqlitePantryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PantryRepository for SqlitePantryRepository {
    async fn list_shelves(
        &self,
        user_id: i64,
        query: Option<&str>,
    ) -> RepositoryResult<Vec<ShelfWithItems>> {
        let pattern = format!("%{}%", query.unwrap_or(""));
        let shelves = sqlx::query_as::<_, Shelf>(
            r#"
            SELECT id, user_id, name, created_at
            FROM pantry_shelves
            WHERE user_id = ? AND name LIKE ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(shelves.len());
        for shelf in shelves {
            let items = sqlx::query_as::<_, PantryItem>(
                r#"
                SELECT id, user_id, shelf_id, name, created_at
                FROM pantry_items
                WHERE shelf_id = ?
                ORDER BY id ASC
                "#,
            )
            .bind(shelf.id)
            .fetch_all(&self.pool)
            .await?;

            result.push(ShelfWithItems { shelf, items });
        }

        Ok(result)
    }

    async fn get_shelf(&self, id: i64) -> RepositoryResult<Option<Shelf>> {
        let shelf = sqlx::query_as::<_, Shelf>(
            "SELECT id, user_id, name, created_at FROM pantry_shelves WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shelf)
    }

    async fn find_shelf_by_name(
        &self,
        user_id: i64,
        name: &str,
    ) -> RepositoryResult<Option<Shelf>> {
        let shelf = sqlx::query_as::<_, Shelf>(
            "SELECT id, user_id, name, created_at FROM pantry_shelves WHERE user_id = ? AND name = ?",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shelf)
    }

    async fn create_shelf(&self, user_id: i64, name: &str) -> RepositoryResult<Shelf> {
        let result = sqlx::query("INSERT INTO pantry_shelves (user_id, name) VALUES (?, ?)")
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        self.get_shelf(result.last_insert_rowid())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn rename_shelf(&self, id: i64, name: &str) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE pantry_shelves SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_shelf(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM pantry_shelves WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn get_item(&self, id: i64) -> RepositoryResult<Option<PantryItem>> {
        let item = sqlx::query_as::<_, PantryItem>(
            "SELECT id, user_id, shelf_id, name, created_at FROM pantry_items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn list_items(&self, user_id: i64) -> RepositoryResult<Vec<PantryItem>> {
        let items = sqlx::query_as::<_, PantryItem>(
            "SELECT id, user_id, shelf_id, name, created_at FROM pantry_items WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn create_item(
        &self,
        user_id: i64,
        shelf_id: i64,
        name: &str,
    ) -> RepositoryResult<PantryItem> {
        let result =
            sqlx::query("INSERT INTO pantry_items (user_id, shelf_id, name) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(shelf_id)
                .bind(name)
                .execute(&self.pool)
                .await?;

        self.get_item(result.last_insert_rowid())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_item(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM pantry_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
