use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub instructions: String,
    pub total_time: String,
    pub image_url: Option<String>,
    pub meal_plan_multiplier: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub amount: Option<String>,
    pub created_at: Option<String>,
}

/// Listing-page projection of a recipe.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub total_time: String,
    pub image_url: Option<String>,
    pub meal_plan_multiplier: Option<i64>,
}

/// Discovery-feed row: recipe plus its author's name.
#[derive(Debug, Clone, FromRow)]
pub struct DiscoverRecipe {
    pub id: i64,
    pub name: String,
    pub total_time: String,
    pub image_url: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

/// An ingredient joined with the meal-planned recipe that uses it.
#[derive(Debug, Clone, FromRow)]
pub struct MealPlanIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub amount: Option<String>,
    pub recipe_name: String,
    pub meal_plan_multiplier: i64,
}
