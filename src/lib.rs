pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod optimistic;
pub mod repositories;
pub mod services;
pub mod validate;

// Shared between unit tests and the tests/ directory
pub mod test_utils;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub magic_link: Arc<auth::MagicLinkService>,
    pub users: Arc<dyn repositories::UserRepository>,
    pub pantry: Arc<services::PantryService>,
    pub recipes: Arc<services::RecipeService>,
    pub grocery: Arc<services::GroceryService>,
    pub pool: sqlx::SqlitePool,
}
