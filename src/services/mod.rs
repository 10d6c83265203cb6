pub mod email_service;
pub mod grocery_service;
pub mod pantry_service;
pub mod recipe_service;

pub use email_service::{create_email_service, ConsoleEmailService, EmailError, EmailService};
pub use grocery_service::{GroceryEntry, GroceryService, GroceryUse};
pub use pantry_service::PantryService;
pub use recipe_service::{RecipeService, SaveRecipe};
