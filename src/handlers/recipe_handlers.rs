use crate::error::AppError;
use crate::models::{Recipe, RecipeSummary};
use crate::optimistic::{DisplayItem, ListOrder, OptimisticList};
use crate::services::SaveRecipe;
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    body::Bytes,
    extract::{FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tower_sessions::Session;

use super::get_user_id;

/// Form extractor backed by serde_qs, for forms carrying indexed arrays
/// (`ingredientNames[0]`, `ingredientNames[1]`, ...).
pub struct QsForm<T>(pub T);

impl<T, S> FromRequest<S> for QsForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read body: {}", e),
            )
        })?;

        let body_str = std::str::from_utf8(&bytes)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid UTF-8: {}", e)))?;

        let config = serde_qs::Config::new(10, false);
        let value = config.deserialize_str(body_str).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to parse form: {}", e),
            )
        })?;

        Ok(QsForm(value))
    }
}

// Templates

#[derive(Template, WebTemplate)]
#[template(path = "recipes/list.html")]
struct RecipeListTemplate {
    recipes: Vec<RecipeSummary>,
    query: String,
    meal_plan_only: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "recipes/detail.html")]
struct RecipeDetailTemplate {
    recipe: Recipe,
    ingredients: Vec<DisplayItem>,
}

#[derive(Deserialize)]
pub struct RecipeListQuery {
    q: Option<String>,
    filter: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecipeForm {
    name: String,
    total_time: String,
    instructions: String,
    image_url: Option<String>,
    #[serde(default)]
    ingredient_ids: Vec<i64>,
    #[serde(default)]
    ingredient_names: Vec<String>,
    #[serde(default)]
    ingredient_amounts: Vec<String>,
}

#[derive(Deserialize)]
pub struct FieldForm {
    value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIngredientForm {
    name: String,
    amount: Option<String>,
}

#[derive(Deserialize)]
pub struct MealPlanForm {
    multiplier: i64,
}

pub async fn recipe_list(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RecipeListQuery>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    let q = query.q.unwrap_or_default();
    let meal_plan_only = query.filter.as_deref() == Some("mealPlanOnly");

    let recipes = state
        .recipes
        .list(user_id, (!q.is_empty()).then_some(q.as_str()), meal_plan_only)
        .await?;

    Ok(RecipeListTemplate {
        recipes,
        query: q,
        meal_plan_only,
    }
    .into_response())
}

pub async fn create_recipe(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    let recipe = state.recipes.create(user_id).await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe.id)).into_response())
}

pub async fn recipe_detail(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<i64>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    let recipe = state.recipes.get_owned(user_id, recipe_id).await?;

    let authoritative = state
        .recipes
        .ingredients(recipe.id)
        .await?
        .into_iter()
        .map(|i| DisplayItem::confirmed(i.id, i.name, i.amount))
        .collect();
    let ingredients =
        OptimisticList::with_authoritative(ListOrder::Insertion, authoritative).merged();

    Ok(RecipeDetailTemplate {
        recipe,
        ingredients,
    }
    .into_response())
}

pub async fn save_recipe(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<i64>,
    QsForm(form): QsForm<SaveRecipeForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;

    state
        .recipes
        .save(
            user_id,
            recipe_id,
            SaveRecipe {
                name: form.name,
                total_time: form.total_time,
                instructions: form.instructions,
                image_url: form.image_url.filter(|u| !u.trim().is_empty()),
                ingredient_ids: form.ingredient_ids,
                ingredient_names: form.ingredient_names,
                ingredient_amounts: form
                    .ingredient_amounts
                    .into_iter()
                    .map(|a| (!a.trim().is_empty()).then(|| a.trim().to_string()))
                    .collect(),
            },
        )
        .await?;

    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn save_name(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<i64>,
    Form(form): Form<FieldForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.recipes.set_name(user_id, recipe_id, &form.value).await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn save_total_time(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<i64>,
    Form(form): Form<FieldForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state
        .recipes
        .set_total_time(user_id, recipe_id, &form.value)
        .await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn save_instructions(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<i64>,
    Form(form): Form<FieldForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state
        .recipes
        .set_instructions(user_id, recipe_id, &form.value)
        .await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn save_image_url(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<i64>,
    Form(form): Form<FieldForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state
        .recipes
        .set_image_url(user_id, recipe_id, &form.value)
        .await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn save_ingredient_name(
    State(state): State<AppState>,
    session: Session,
    Path((recipe_id, ingredient_id)): Path<(i64, i64)>,
    Form(form): Form<FieldForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state
        .recipes
        .update_ingredient_name(user_id, ingredient_id, &form.value)
        .await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn save_ingredient_amount(
    State(state): State<AppState>,
    session: Session,
    Path((recipe_id, ingredient_id)): Path<(i64, i64)>,
    Form(form): Form<FieldForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state
        .recipes
        .update_ingredient_amount(user_id, ingredient_id, Some(&form.value))
        .await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<i64>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.recipes.delete(user_id, recipe_id).await?;
    Ok(Redirect::to("/app/recipes").into_response())
}

pub async fn create_ingredient(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<i64>,
    Form(form): Form<NewIngredientForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state
        .recipes
        .create_ingredient(user_id, recipe_id, &form.name, form.amount.as_deref())
        .await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn delete_ingredient(
    State(state): State<AppState>,
    session: Session,
    Path((recipe_id, ingredient_id)): Path<(i64, i64)>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.recipes.delete_ingredient(user_id, ingredient_id).await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn add_to_meal_plan(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<i64>,
    Form(form): Form<MealPlanForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state
        .recipes
        .set_meal_plan_multiplier(user_id, recipe_id, form.multiplier)
        .await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn remove_from_meal_plan(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<i64>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.recipes.remove_from_meal_plan(user_id, recipe_id).await?;
    Ok(Redirect::to(&format!("/app/recipes/{}", recipe_id)).into_response())
}

pub async fn clear_meal_plan(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.recipes.clear_meal_plan(user_id).await?;
    Ok(Redirect::to("/app/recipes?filter=mealPlanOnly").into_response())
}
