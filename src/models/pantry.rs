use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Shelf {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PantryItem {
    pub id: i64,
    pub user_id: i64,
    pub shelf_id: i64,
    pub name: String,
    pub created_at: Option<String>,
}

/// A shelf with its items, as the pantry page displays it.
#[derive(Debug, Clone)]
pub struct ShelfWithItems {
    pub shelf: Shelf,
    pub items: Vec<PantryItem>,
}
