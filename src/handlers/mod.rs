pub mod app_handlers;
pub mod auth_handlers;
pub mod discover_handlers;
pub mod grocery_handlers;
pub mod pantry_handlers;
pub mod recipe_handlers;

use crate::auth::SESSION_USER_ID;
use crate::error::AppError;
use tower_sessions::Session;

/// The auth middleware guarantees the id is present on /app routes; a miss
/// here means the session expired mid-request.
pub(crate) async fn get_user_id(session: &Session) -> Result<i64, AppError> {
    session
        .get::<i64>(SESSION_USER_ID)
        .await
        .map_err(|_| AppError::InternalError)?
        .ok_or_else(|| AppError::Forbidden("Not logged in".to_string()))
}
