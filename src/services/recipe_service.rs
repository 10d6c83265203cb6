use crate::error::{AppError, Result};
use crate::models::{DiscoverRecipe, Ingredient, Recipe, RecipeSummary};
use crate::repositories::{RecipeDefaults, RecipeRepository, RecipeUpdate};
use std::sync::Arc;

const DISCOVER_LIMIT: i64 = 25;

/// Whole-form save: top-level fields plus parallel ingredient arrays.
pub struct SaveRecipe {
    pub name: String,
    pub total_time: String,
    pub instructions: String,
    pub image_url: Option<String>,
    pub ingredient_ids: Vec<i64>,
    pub ingredient_names: Vec<String>,
    pub ingredient_amounts: Vec<Option<String>>,
}

pub struct RecipeService {
    repository: Arc<dyn RecipeRepository>,
}

impl RecipeService {
    pub fn new(repository: Arc<dyn RecipeRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(
        &self,
        user_id: i64,
        query: Option<&str>,
        meal_plan_only: bool,
    ) -> Result<Vec<RecipeSummary>> {
        Ok(self.repository.list(user_id, query, meal_plan_only).await?)
    }

    pub async fn create(&self, user_id: i64) -> Result<Recipe> {
        let recipe = self
            .repository
            .create(
                user_id,
                RecipeDefaults {
                    name: "New Recipe",
                    total_time: "0 minutes",
                    image_url: "https://picsum.photos/400/300?random=1",
                },
            )
            .await?;
        Ok(recipe)
    }

    /// Fetches an owned recipe: 404 for unknown ids, 401 for foreign ones.
    pub async fn get_owned(&self, user_id: i64, recipe_id: i64) -> Result<Recipe> {
        let recipe = self
            .repository
            .get(recipe_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipe doesn't exist".to_string()))?;

        if recipe.user_id != user_id {
            return Err(AppError::Forbidden(
                "You are not authorized to view this recipe".to_string(),
            ));
        }

        Ok(recipe)
    }

    pub async fn get_public(&self, recipe_id: i64) -> Result<Recipe> {
        self.repository
            .get(recipe_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipe doesn't exist".to_string()))
    }

    pub async fn ingredients(&self, recipe_id: i64) -> Result<Vec<Ingredient>> {
        Ok(self.repository.list_ingredients(recipe_id).await?)
    }

    pub async fn save(&self, user_id: i64, recipe_id: i64, form: SaveRecipe) -> Result<()> {
        self.get_owned(user_id, recipe_id).await?;

        if form.name.trim().is_empty() {
            return Err(AppError::Validation("Name can't be blank".to_string()));
        }
        if form.total_time.trim().is_empty() {
            return Err(AppError::Validation("Time can't be blank".to_string()));
        }
        if form.instructions.trim().is_empty() {
            return Err(AppError::Validation(
                "Instructions can't be blank".to_string(),
            ));
        }
        if form.ingredient_ids.len() != form.ingredient_names.len()
            || form.ingredient_ids.len() != form.ingredient_amounts.len()
        {
            return Err(AppError::Validation(
                "Ingredient arrays must all be same length".to_string(),
            ));
        }
        if form.ingredient_names.iter().any(|n| n.trim().is_empty()) {
            return Err(AppError::Validation("Name can't be blank".to_string()));
        }

        self.repository
            .update(
                recipe_id,
                RecipeUpdate {
                    name: form.name,
                    total_time: form.total_time,
                    instructions: form.instructions,
                    image_url: form.image_url,
                },
            )
            .await?;

        // Each write is scoped to the owned recipe; a form-supplied id
        // pointing at someone else's ingredient matches nothing.
        for ((id, name), amount) in form
            .ingredient_ids
            .iter()
            .zip(form.ingredient_names.iter())
            .zip(form.ingredient_amounts.iter())
        {
            self.repository
                .update_ingredient_in_recipe(recipe_id, *id, name, amount.as_deref())
                .await?;
        }

        Ok(())
    }

    pub async fn set_name(&self, user_id: i64, recipe_id: i64, name: &str) -> Result<()> {
        self.get_owned(user_id, recipe_id).await?;
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name can't be blank".to_string()));
        }
        self.repository.set_name(recipe_id, name.trim()).await?;
        Ok(())
    }

    pub async fn set_total_time(&self, user_id: i64, recipe_id: i64, total_time: &str) -> Result<()> {
        self.get_owned(user_id, recipe_id).await?;
        if total_time.trim().is_empty() {
            return Err(AppError::Validation("Time can't be blank".to_string()));
        }
        self.repository
            .set_total_time(recipe_id, total_time.trim())
            .await?;
        Ok(())
    }

    pub async fn set_instructions(
        &self,
        user_id: i64,
        recipe_id: i64,
        instructions: &str,
    ) -> Result<()> {
        self.get_owned(user_id, recipe_id).await?;
        if instructions.trim().is_empty() {
            return Err(AppError::Validation(
                "Instructions can't be blank".to_string(),
            ));
        }
        self.repository
            .set_instructions(recipe_id, instructions.trim())
            .await?;
        Ok(())
    }

    pub async fn set_image_url(&self, user_id: i64, recipe_id: i64, image_url: &str) -> Result<()> {
        self.get_owned(user_id, recipe_id).await?;
        if image_url.trim().is_empty() {
            return Err(AppError::Validation("Image can't be blank".to_string()));
        }
        self.repository
            .set_image_url(recipe_id, image_url.trim())
            .await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: i64, recipe_id: i64) -> Result<()> {
        self.get_owned(user_id, recipe_id).await?;
        self.repository.delete(recipe_id).await?;
        Ok(())
    }

    pub async fn create_ingredient(
        &self,
        user_id: i64,
        recipe_id: i64,
        name: &str,
        amount: Option<&str>,
    ) -> Result<Ingredient> {
        self.get_owned(user_id, recipe_id).await?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Ingredient can't be blank".to_string(),
            ));
        }

        let amount = amount.map(str::trim).filter(|a| !a.is_empty());
        Ok(self
            .repository
            .create_ingredient(recipe_id, name, amount)
            .await?)
    }

    pub async fn update_ingredient_name(
        &self,
        user_id: i64,
        ingredient_id: i64,
        name: &str,
    ) -> Result<()> {
        let ingredient = self.owned_ingredient(user_id, ingredient_id).await?;
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name can't be blank".to_string()));
        }
        self.repository
            .update_ingredient(ingredient_id, name.trim(), ingredient.amount.as_deref())
            .await?;
        Ok(())
    }

    pub async fn update_ingredient_amount(
        &self,
        user_id: i64,
        ingredient_id: i64,
        amount: Option<&str>,
    ) -> Result<()> {
        let ingredient = self.owned_ingredient(user_id, ingredient_id).await?;
        let amount = amount.map(str::trim).filter(|a| !a.is_empty());
        self.repository
            .update_ingredient(ingredient_id, &ingredient.name, amount)
            .await?;
        Ok(())
    }

    pub async fn delete_ingredient(&self, user_id: i64, ingredient_id: i64) -> Result<()> {
        self.owned_ingredient(user_id, ingredient_id).await?;
        self.repository.delete_ingredient(ingredient_id).await?;
        Ok(())
    }

    pub async fn set_meal_plan_multiplier(
        &self,
        user_id: i64,
        recipe_id: i64,
        multiplier: i64,
    ) -> Result<()> {
        self.get_owned(user_id, recipe_id).await?;
        if multiplier < 1 {
            return Err(AppError::Validation(
                "Multiplier must be at least 1".to_string(),
            ));
        }
        self.repository
            .set_meal_plan_multiplier(recipe_id, Some(multiplier))
            .await?;
        Ok(())
    }

    pub async fn remove_from_meal_plan(&self, user_id: i64, recipe_id: i64) -> Result<()> {
        self.get_owned(user_id, recipe_id).await?;
        self.repository
            .set_meal_plan_multiplier(recipe_id, None)
            .await?;
        Ok(())
    }

    pub async fn clear_meal_plan(&self, user_id: i64) -> Result<()> {
        self.repository.clear_meal_plan(user_id).await?;
        Ok(())
    }

    pub async fn discover(&self) -> Result<Vec<DiscoverRecipe>> {
        Ok(self.repository.discover(DISCOVER_LIMIT).await?)
    }

    async fn owned_ingredient(&self, user_id: i64, ingredient_id: i64) -> Result<Ingredient> {
        let ingredient = self
            .repository
            .get_ingredient(ingredient_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ingredient not found".to_string()))?;

        // Ownership rides on the parent recipe.
        self.get_owned(user_id, ingredient.recipe_id).await?;
        Ok(ingredient)
    }
}
