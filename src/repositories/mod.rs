pub mod pantry_repository;
pub mod recipe_repository;
pub mod user_repository;

pub use pantry_repository::{PantryRepository, SqlitePantryRepository};
pub use recipe_repository::{
    RecipeDefaults, RecipeRepository, RecipeUpdate, SqliteRecipeRepository,
};
pub use user_repository::{
    RepositoryError, RepositoryResult, SqliteUserRepository, UserRepository,
};
