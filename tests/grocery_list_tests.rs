use chrono::Local;
use larder::{
    repositories::{SqlitePantryRepository, SqliteRecipeRepository},
    services::GroceryService,
    test_utils::test_helpers,
};
use sqlx::SqlitePool;
use std::sync::Arc;

async fn setup() -> (GroceryService, SqlitePool, i64) {
    let pool = test_helpers::create_test_db().await.unwrap();
    let user_id = test_helpers::insert_test_user(&pool, "cook@example.com", "Cook", "One")
        .await
        .unwrap();
    let service = GroceryService::new(
        Arc::new(SqliteRecipeRepository::new(pool.clone())),
        Arc::new(SqlitePantryRepository::new(pool.clone())),
    );
    (service, pool, user_id)
}

#[tokio::test]
async fn only_meal_planned_recipes_contribute() {
    let (service, pool, user_id) = setup().await;

    let planned = test_helpers::insert_test_recipe(&pool, user_id, "Stew", Some(1))
        .await
        .unwrap();
    test_helpers::insert_test_ingredient(&pool, planned, "Carrot", Some("3"))
        .await
        .unwrap();

    let unplanned = test_helpers::insert_test_recipe(&pool, user_id, "Pancakes", None)
        .await
        .unwrap();
    test_helpers::insert_test_ingredient(&pool, unplanned, "Flour", None)
        .await
        .unwrap();

    let entries = service.list(user_id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Carrot");
    assert_eq!(entries[0].uses[0].recipe_name, "Stew");
}

#[tokio::test]
async fn pantry_items_are_subtracted_case_insensitively() {
    let (service, pool, user_id) = setup().await;

    let recipe = test_helpers::insert_test_recipe(&pool, user_id, "Stew", Some(1))
        .await
        .unwrap();
    test_helpers::insert_test_ingredient(&pool, recipe, "Carrot", Some("3"))
        .await
        .unwrap();
    test_helpers::insert_test_ingredient(&pool, recipe, "Beef", Some("500g"))
        .await
        .unwrap();

    let shelf = test_helpers::insert_test_shelf(&pool, user_id, "Veg")
        .await
        .unwrap();
    test_helpers::insert_test_item(&pool, user_id, shelf, "CARROT")
        .await
        .unwrap();

    let entries = service.list(user_id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Beef");
}

#[tokio::test]
async fn same_ingredient_across_recipes_groups_into_one_entry() {
    let (service, pool, user_id) = setup().await;

    let stew = test_helpers::insert_test_recipe(&pool, user_id, "Stew", Some(2))
        .await
        .unwrap();
    test_helpers::insert_test_ingredient(&pool, stew, "Garlic", Some("2 cloves"))
        .await
        .unwrap();

    let pasta = test_helpers::insert_test_recipe(&pool, user_id, "Pasta", Some(1))
        .await
        .unwrap();
    test_helpers::insert_test_ingredient(&pool, pasta, "garlic", Some("1 clove"))
        .await
        .unwrap();

    let entries = service.list(user_id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].uses.len(), 2);

    let recipes: Vec<&str> = entries[0]
        .uses
        .iter()
        .map(|u| u.recipe_name.as_str())
        .collect();
    assert!(recipes.contains(&"Stew"));
    assert!(recipes.contains(&"Pasta"));

    let stew_use = entries[0]
        .uses
        .iter()
        .find(|u| u.recipe_name == "Stew")
        .unwrap();
    assert_eq!(stew_use.multiplier, 2);
}

#[tokio::test]
async fn check_off_stocks_item_on_dated_trip_shelf() {
    let (service, pool, user_id) = setup().await;

    let recipe = test_helpers::insert_test_recipe(&pool, user_id, "Stew", Some(1))
        .await
        .unwrap();
    test_helpers::insert_test_ingredient(&pool, recipe, "Carrot", None)
        .await
        .unwrap();

    let item = service.check_off(user_id, "Carrot").await.unwrap();
    assert_eq!(item.name, "Carrot");

    let expected_shelf = format!("Grocery Trip - {}", Local::now().format("%b %-d"));
    let shelf_name: String = sqlx::query_scalar("SELECT name FROM pantry_shelves WHERE id = ?")
        .bind(item.shelf_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(shelf_name, expected_shelf);

    // The checked-off ingredient no longer appears on the list.
    let entries = service.list(user_id).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn repeated_check_offs_reuse_the_trip_shelf() {
    let (service, pool, user_id) = setup().await;

    service.check_off(user_id, "Carrot").await.unwrap();
    service.check_off(user_id, "Beef").await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pantry_shelves")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
