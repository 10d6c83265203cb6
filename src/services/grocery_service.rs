use crate::error::{AppError, Result};
use crate::models::{PantryItem, Shelf};
use crate::repositories::{PantryRepository, RecipeRepository};
use chrono::Local;
use std::collections::HashSet;
use std::sync::Arc;

/// One occurrence of a grocery item in a meal-planned recipe.
#[derive(Debug, Clone)]
pub struct GroceryUse {
    pub recipe_name: String,
    pub amount: Option<String>,
    pub multiplier: i64,
}

/// A grocery line: every use of the same ingredient name, grouped together.
#[derive(Debug, Clone)]
pub struct GroceryEntry {
    pub name: String,
    pub uses: Vec<GroceryUse>,
}

pub struct GroceryService {
    recipes: Arc<dyn RecipeRepository>,
    pantry: Arc<dyn PantryRepository>,
}

impl GroceryService {
    pub fn new(recipes: Arc<dyn RecipeRepository>, pantry: Arc<dyn PantryRepository>) -> Self {
        Self { recipes, pantry }
    }

    /// Derives the grocery list: ingredients of meal-planned recipes, minus
    /// anything already in the pantry, matched case-insensitively by name.
    pub async fn list(&self, user_id: i64) -> Result<Vec<GroceryEntry>> {
        let ingredients = self.recipes.meal_plan_ingredients(user_id).await?;
        let stocked: HashSet<String> = self
            .pantry
            .list_items(user_id)
            .await?
            .iter()
            .map(|item: &PantryItem| item.name.trim().to_lowercase())
            .collect();

        let mut entries: Vec<GroceryEntry> = Vec::new();
        for ingredient in ingredients {
            let key = ingredient.name.trim().to_lowercase();
            if stocked.contains(&key) {
                continue;
            }

            let grocery_use = GroceryUse {
                recipe_name: ingredient.recipe_name,
                amount: ingredient.amount,
                multiplier: ingredient.meal_plan_multiplier,
            };

            match entries
                .iter_mut()
                .find(|e| e.name.trim().to_lowercase() == key)
            {
                Some(entry) => entry.uses.push(grocery_use),
                None => entries.push(GroceryEntry {
                    name: ingredient.name,
                    uses: vec![grocery_use],
                }),
            }
        }

        Ok(entries)
    }

    /// Checks an item off the list by stocking it on the dated trip shelf,
    /// which removes it from future derivations.
    pub async fn check_off(&self, user_id: i64, name: &str) -> Result<PantryItem> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Item name cannot be blank.".to_string()));
        }

        let shelf = self.trip_shelf(user_id).await?;
        Ok(self.pantry.create_item(user_id, shelf.id, name).await?)
    }

    /// Finds or creates today's "Grocery Trip - <Mon D>" shelf.
    async fn trip_shelf(&self, user_id: i64) -> Result<Shelf> {
        let shelf_name = format!("Grocery Trip - {}", Local::now().format("%b %-d"));

        if let Some(shelf) = self.pantry.find_shelf_by_name(user_id, &shelf_name).await? {
            return Ok(shelf);
        }

        Ok(self.pantry.create_shelf(user_id, &shelf_name).await?)
    }
}
