use larder::{
    error::AppError,
    repositories::SqlitePantryRepository,
    services::PantryService,
    test_utils::test_helpers,
};
use sqlx::SqlitePool;
use std::sync::Arc;

async fn setup() -> (PantryService, SqlitePool, i64) {
    let pool = test_helpers::create_test_db().await.unwrap();
    let user_id = test_helpers::insert_test_user(&pool, "owner@example.com", "Owner", "One")
        .await
        .unwrap();
    let service = PantryService::new(Arc::new(SqlitePantryRepository::new(pool.clone())));
    (service, pool, user_id)
}

#[tokio::test]
async fn new_shelf_gets_default_name() {
    let (service, _pool, user_id) = setup().await;

    let shelf = service.create_shelf(user_id).await.unwrap();
    assert_eq!(shelf.name, "New Shelf");
}

#[tokio::test]
async fn shelves_list_newest_first_with_items() {
    let (service, pool, user_id) = setup().await;

    let dairy = test_helpers::insert_test_shelf(&pool, user_id, "Dairy")
        .await
        .unwrap();
    test_helpers::insert_test_item(&pool, user_id, dairy, "Milk")
        .await
        .unwrap();
    test_helpers::insert_test_shelf(&pool, user_id, "Fruits")
        .await
        .unwrap();

    let shelves = service.list_shelves(user_id, None).await.unwrap();
    assert_eq!(shelves.len(), 2);
    assert_eq!(shelves[0].shelf.name, "Fruits");
    assert_eq!(shelves[1].shelf.name, "Dairy");
    assert_eq!(shelves[1].items.len(), 1);
    assert_eq!(shelves[1].items[0].name, "Milk");
}

#[tokio::test]
async fn shelf_search_is_case_insensitive() {
    let (service, pool, user_id) = setup().await;

    test_helpers::insert_test_shelf(&pool, user_id, "Dairy")
        .await
        .unwrap();
    test_helpers::insert_test_shelf(&pool, user_id, "Fruits")
        .await
        .unwrap();

    let shelves = service.list_shelves(user_id, Some("dai")).await.unwrap();
    assert_eq!(shelves.len(), 1);
    assert_eq!(shelves[0].shelf.name, "Dairy");
}

#[tokio::test]
async fn blank_shelf_rename_is_rejected() {
    let (service, pool, user_id) = setup().await;
    let shelf = test_helpers::insert_test_shelf(&pool, user_id, "Dairy")
        .await
        .unwrap();

    let result = service.rename_shelf(user_id, shelf, "   ").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn foreign_shelf_mutations_are_unauthorized() {
    let (service, pool, owner_id) = setup().await;
    let intruder_id =
        test_helpers::insert_test_user(&pool, "intruder@example.com", "Intruder", "Two")
            .await
            .unwrap();
    let shelf = test_helpers::insert_test_shelf(&pool, owner_id, "Dairy")
        .await
        .unwrap();
    let item = test_helpers::insert_test_item(&pool, owner_id, shelf, "Milk")
        .await
        .unwrap();

    let result = service.rename_shelf(intruder_id, shelf, "Mine now").await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let result = service.delete_shelf(intruder_id, shelf).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let result = service.create_item(intruder_id, shelf, "Soda").await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let result = service.delete_item(intruder_id, item).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    // Nothing changed for the owner.
    let shelves = service.list_shelves(owner_id, None).await.unwrap();
    assert_eq!(shelves[0].shelf.name, "Dairy");
    assert_eq!(shelves[0].items.len(), 1);
}

#[tokio::test]
async fn deleting_a_shelf_removes_its_items() {
    let (service, pool, user_id) = setup().await;
    let shelf = test_helpers::insert_test_shelf(&pool, user_id, "Dairy")
        .await
        .unwrap();
    test_helpers::insert_test_item(&pool, user_id, shelf, "Milk")
        .await
        .unwrap();

    service.delete_shelf(user_id, shelf).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pantry_items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn blank_item_name_is_rejected() {
    let (service, pool, user_id) = setup().await;
    let shelf = test_helpers::insert_test_shelf(&pool, user_id, "Dairy")
        .await
        .unwrap();

    let result = service.create_item(user_id, shelf, "").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}
