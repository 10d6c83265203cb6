pub mod pantry;
pub mod recipe;
pub mod user;

pub use pantry::{PantryItem, Shelf, ShelfWithItems};
pub use recipe::{DiscoverRecipe, Ingredient, MealPlanIngredient, Recipe, RecipeSummary};
pub use user::User;
