use crate::error::AppError;
use crate::services::GroceryEntry;
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use super::get_user_id;

#[derive(Template, WebTemplate)]
#[template(path = "grocery.html")]
struct GroceryTemplate {
    entries: Vec<GroceryEntry>,
}

#[derive(Deserialize)]
pub struct CheckOffForm {
    name: String,
}

pub async fn grocery_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    let entries = state.grocery.list(user_id).await?;
    Ok(GroceryTemplate { entries }.into_response())
}

pub async fn check_off(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckOffForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.grocery.check_off(user_id, &form.name).await?;
    Ok(Redirect::to("/app/grocery").into_response())
}
