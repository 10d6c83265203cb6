use crate::error::{AppError, Result};
use crate::models::{PantryItem, Shelf, ShelfWithItems};
use crate::repositories::PantryRepository;
use std::sync::Arc;

pub struct PantryService {
    repository: Arc<dyn PantryRepository>,
}

impl PantryService {
    pub fn new(repository: Arc<dyn PantryRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_shelves(
        &self,
        user_id: i64,
        query: Option<&str>,
    ) -> Result<Vec<ShelfWithItems>> {
        Ok(self.repository.list_shelves(user_id, query).await?)
    }

    pub async fn create_shelf(&self, user_id: i64) -> Result<Shelf> {
        Ok(self.repository.create_shelf(user_id, "New Shelf").await?)
    }

    pub async fn rename_shelf(&self, user_id: i64, shelf_id: i64, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Shelf name cannot be blank.".to_string(),
            ));
        }

        self.owned_shelf(user_id, shelf_id, "You can't change another user's shelf name")
            .await?;
        self.repository.rename_shelf(shelf_id, name).await?;
        Ok(())
    }

    pub async fn delete_shelf(&self, user_id: i64, shelf_id: i64) -> Result<()> {
        self.owned_shelf(user_id, shelf_id, "You can't delete another user's shelf")
            .await?;
        self.repository.delete_shelf(shelf_id).await?;
        Ok(())
    }

    pub async fn create_item(
        &self,
        user_id: i64,
        shelf_id: i64,
        name: &str,
    ) -> Result<PantryItem> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Item name cannot be blank.".to_string(),
            ));
        }

        self.owned_shelf(user_id, shelf_id, "You can't add to another user's shelf")
            .await?;
        Ok(self.repository.create_item(user_id, shelf_id, name).await?)
    }

    pub async fn delete_item(&self, user_id: i64, item_id: i64) -> Result<()> {
        let item = self
            .repository
            .get_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

        if item.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can't delete another user's shelf item".to_string(),
            ));
        }

        self.repository.delete_item(item_id).await?;
        Ok(())
    }

    async fn owned_shelf(&self, user_id: i64, shelf_id: i64, denial: &str) -> Result<Shelf> {
        let shelf = self
            .repository
            .get_shelf(shelf_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shelf not found".to_string()))?;

        if shelf.user_id != user_id {
            return Err(AppError::Forbidden(denial.to_string()));
        }

        Ok(shelf)
    }
}
