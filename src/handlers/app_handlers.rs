use crate::error::AppError;
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::get_user_id;

#[derive(Template, WebTemplate)]
#[template(path = "app.html")]
struct AppHomeTemplate {
    full_name: String,
}

pub async fn app_home(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(AppHomeTemplate {
        full_name: user.full_name(),
    }
    .into_response())
}
