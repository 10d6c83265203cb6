use crate::error::AppError;
use crate::models::{DiscoverRecipe, Ingredient, Recipe};
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};

#[derive(Template, WebTemplate)]
#[template(path = "discover/list.html")]
struct DiscoverTemplate {
    recipes: Vec<DiscoverRecipe>,
}

#[derive(Template, WebTemplate)]
#[template(path = "discover/detail.html")]
struct DiscoverDetailTemplate {
    recipe: Recipe,
    ingredients: Vec<Ingredient>,
}

pub async fn discover_page(State(state): State<AppState>) -> Result<Response, AppError> {
    let recipes = state.recipes.discover().await?;
    Ok(DiscoverTemplate { recipes }.into_response())
}

pub async fn discover_detail(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> Result<Response, AppError> {
    let recipe = state.recipes.get_public(recipe_id).await?;
    let ingredients = state.recipes.ingredients(recipe.id).await?;
    Ok(DiscoverDetailTemplate {
        recipe,
        ingredients,
    }
    .into_response())
}
