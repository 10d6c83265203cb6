use crate::models::{DiscoverRecipe, Ingredient, MealPlanIngredient, Recipe, RecipeSummary};
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{RepositoryError, RepositoryResult};

pub struct RecipeDefaults<'a> {
    pub name: &'a str,
    pub total_time: &'a str,
    pub image_url: &'a str,
}

pub struct RecipeUpdate {
    pub name: String,
    pub total_time: String,
    pub instructions: String,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn list(
        &self,
        user_id: i64,
        query: Option<&str>,
        meal_plan_only: bool,
    ) -> RepositoryResult<Vec<RecipeSummary>>;
    async fn get(&self, id: i64) -> RepositoryResult<Option<Recipe>>;
    async fn create(&self, user_id: i64, defaults: RecipeDefaults<'_>) -> RepositoryResult<Recipe>;
    async fn update(&self, id: i64, update: RecipeUpdate) -> RepositoryResult<()>;
    async fn set_name(&self, id: i64, name: &str) -> RepositoryResult<()>;
    async fn set_total_time(&self, id: i64, total_time: &str) -> RepositoryResult<()>;
    async fn set_instructions(&self, id: i64, instructions: &str) -> RepositoryResult<()>;
    async fn set_image_url(&self, id: i64, image_url: &str) -> RepositoryResult<()>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;

    async fn set_meal_plan_multiplier(
        &self,
        id: i64,
        multiplier: Option<i64>,
    ) -> RepositoryResult<()>;
    async fn clear_meal_plan(&self, user_id: i64) -> RepositoryResult<()>;

    async fn list_ingredients(&self, recipe_id: i64) -> RepositoryResult<Vec<Ingredient>>;
    async fn get_ingredient(&self, id: i64) -> RepositoryResult<Option<Ingredient>>;
    async fn create_ingredient(
        &self,
        recipe_id: i64,
        name: &str,
        amount: Option<&str>,
    ) -> RepositoryResult<Ingredient>;
    async fn update_ingredient(
        &self,
        id: i64,
        name: &str,
        amount: Option<&str>,
    ) -> RepositoryResult<()>;
    /// Write scoped to the parent recipe; an id belonging to a different
    /// recipe matches no row and is silently skipped.
    async fn update_ingredient_in_recipe(
        &self,
        recipe_id: i64,
        id: i64,
        name: &str,
        amount: Option<&str>,
    ) -> RepositoryResult<()>;
    async fn delete_ingredient(&self, id: i64) -> RepositoryResult<()>;

    /// Ingredients belonging to the user's meal-planned recipes, joined with
    /// recipe name and multiplier.
    async fn meal_plan_ingredients(
        &self,
        user_id: i64,
    ) -> RepositoryResult<Vec<MealPlanIngredient>>;

    /// Most recently updated recipes across all users, for the public feed.
    async fn discover(&self, limit: i64) -> RepositoryResult<Vec<DiscoverRecipe>>;
}

pub struct SqliteRecipeRepository {
    pool: SqlitePool,
}

impl SqliteRecipeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn touch(&self, id: i64) -> RepositoryResult<()> {
        sqlx::query("UPDATE recipes SET updated_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecipeRepository for SqliteRecipeRepository {
    async fn list(
        &self,
        user_id: i64,
        query: Option<&str>,
        meal_plan_only: bool,
    ) -> RepositoryResult<Vec<RecipeSummary>> {
        let pattern = format!("%{}%", query.unwrap_or(""));
        let sql = if meal_plan_only {
            r#"
            SELECT id, name, total_time, image_url, meal_plan_multiplier
            FROM recipes
            WHERE user_id = ? AND name LIKE ? AND meal_plan_multiplier IS NOT NULL
            ORDER BY created_at DESC, id DESC
            "#
        } else {
            r#"
            SELECT id, name, total_time, image_url, meal_plan_multiplier
            FROM recipes
            WHERE user_id = ? AND name LIKE ?
            ORDER BY created_at DESC, id DESC
            "#
        };

        let recipes = sqlx::query_as::<_, RecipeSummary>(sql)
            .bind(user_id)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(recipes)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, user_id, name, instructions, total_time, image_url,
                   meal_plan_multiplier, created_at, updated_at
            FROM recipes
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(recipe)
    }

    async fn create(&self, user_id: i64, defaults: RecipeDefaults<'_>) -> RepositoryResult<Recipe> {
        let result = sqlx::query(
            "INSERT INTO recipes (user_id, name, total_time, image_url) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(defaults.name)
        .bind(defaults.total_time)
        .bind(defaults.image_url)
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, id: i64, update: RecipeUpdate) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE recipes
            SET name = ?, total_time = ?, instructions = ?,
                image_url = COALESCE(?, image_url),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.total_time)
        .bind(&update.instructions)
        .bind(&update.image_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn set_name(&self, id: i64, name: &str) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE recipes SET name = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(name)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn set_total_time(&self, id: i64, total_time: &str) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE recipes SET total_time = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(total_time)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn set_instructions(&self, id: i64, instructions: &str) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE recipes SET instructions = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(instructions)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn set_image_url(&self, id: i64, image_url: &str) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE recipes SET image_url = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(image_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn set_meal_plan_multiplier(
        &self,
        id: i64,
        multiplier: Option<i64>,
    ) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE recipes SET meal_plan_multiplier = ? WHERE id = ?")
            .bind(multiplier)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn clear_meal_plan(&self, user_id: i64) -> RepositoryResult<()> {
        sqlx::query("UPDATE recipes SET meal_plan_multiplier = NULL WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_ingredients(&self, recipe_id: i64) -> RepositoryResult<Vec<Ingredient>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, recipe_id, name, amount, created_at
            FROM ingredients
            WHERE recipe_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ingredients)
    }

    async fn get_ingredient(&self, id: i64) -> RepositoryResult<Option<Ingredient>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT id, recipe_id, name, amount, created_at FROM ingredients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ingredient)
    }

    async fn create_ingredient(
        &self,
        recipe_id: i64,
        name: &str,
        amount: Option<&str>,
    ) -> RepositoryResult<Ingredient> {
        let result =
            sqlx::query("INSERT INTO ingredients (recipe_id, name, amount) VALUES (?, ?, ?)")
                .bind(recipe_id)
                .bind(name)
                .bind(amount)
                .execute(&self.pool)
                .await?;

        self.touch(recipe_id).await?;

        self.get_ingredient(result.last_insert_rowid())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_ingredient(
        &self,
        id: i64,
        name: &str,
        amount: Option<&str>,
    ) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE ingredients SET name = ?, amount = ? WHERE id = ?")
            .bind(name)
            .bind(amount)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn update_ingredient_in_recipe(
        &self,
        recipe_id: i64,
        id: i64,
        name: &str,
        amount: Option<&str>,
    ) -> RepositoryResult<()> {
        sqlx::query("UPDATE ingredients SET name = ?, amount = ? WHERE id = ? AND recipe_id = ?")
            .bind(name)
            .bind(amount)
            .bind(id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_ingredient(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn meal_plan_ingredients(
        &self,
        user_id: i64,
    ) -> RepositoryResult<Vec<MealPlanIngredient>> {
        let ingredients = sqlx::query_as::<_, MealPlanIngredient>(
            r#"
            SELECT i.id, i.recipe_id, i.name, i.amount,
                   r.name AS recipe_name, r.meal_plan_multiplier
            FROM ingredients i
            JOIN recipes r ON r.id = i.recipe_id
            WHERE r.user_id = ? AND r.meal_plan_multiplier IS NOT NULL
            ORDER BY i.name ASC, i.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ingredients)
    }

    async fn discover(&self, limit: i64) -> RepositoryResult<Vec<DiscoverRecipe>> {
        let recipes = sqlx::query_as::<_, DiscoverRecipe>(
            r#"
            SELECT r.id, r.name, r.total_time, r.image_url, u.first_name, u.last_name
            FROM recipes r
            JOIN users u ON u.id = r.user_id
            ORDER BY r.updated_at DESC, r.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(recipes)
    }
}
