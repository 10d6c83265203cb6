pub mod test_helpers {
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use std::sync::Arc;
    use tempfile::NamedTempFile;
    use tower_sessions::{MemoryStore, Session};

    /// In-memory SQLite database with migrations applied.
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Temporary file-backed database, for tests that outlive a single
    /// connection.
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Detached session over an in-memory store, for exercising the login
    /// flow without an HTTP request.
    pub fn create_test_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO users (email, first_name, last_name) VALUES (?, ?, ?)")
                .bind(email)
                .bind(first_name)
                .bind(last_name)
                .execute(pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_test_shelf(
        pool: &SqlitePool,
        user_id: i64,
        name: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO pantry_shelves (user_id, name) VALUES (?, ?)")
            .bind(user_id)
            .bind(name)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_test_item(
        pool: &SqlitePool,
        user_id: i64,
        shelf_id: i64,
        name: &str,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO pantry_items (user_id, shelf_id, name) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(shelf_id)
                .bind(name)
                .execute(pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_test_recipe(
        pool: &SqlitePool,
        user_id: i64,
        name: &str,
        meal_plan_multiplier: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO recipes (user_id, name, total_time, instructions, meal_plan_multiplier)
            VALUES (?, ?, '30 minutes', 'Cook it.', ?)
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(meal_plan_multiplier)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_test_ingredient(
        pool: &SqlitePool,
        recipe_id: i64,
        name: &str,
        amount: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO ingredients (recipe_id, name, amount) VALUES (?, ?, ?)")
                .bind(recipe_id)
                .bind(name)
                .bind(amount)
                .execute(pool)
                .await?;

        Ok(result.last_insert_rowid())
    }
}
