use crate::error::AppError;
use crate::models::Shelf;
use crate::optimistic::{DisplayItem, ListOrder, OptimisticList};
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use super::get_user_id;

/// A shelf with its items in display order.
struct ShelfView {
    shelf: Shelf,
    items: Vec<DisplayItem>,
}

#[derive(Template, WebTemplate)]
#[template(path = "pantry.html")]
struct PantryTemplate {
    shelves: Vec<ShelfView>,
    query: String,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
pub struct RenameShelfForm {
    name: String,
}

#[derive(Deserialize)]
pub struct NewItemForm {
    name: String,
}

pub async fn pantry_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    let q = query.q.unwrap_or_default();

    let shelves = state
        .pantry
        .list_shelves(user_id, (!q.is_empty()).then_some(q.as_str()))
        .await?;

    let shelves = shelves
        .into_iter()
        .map(|s| {
            let authoritative = s
                .items
                .into_iter()
                .map(|item| DisplayItem::confirmed(item.id, item.name, None))
                .collect();
            ShelfView {
                shelf: s.shelf,
                items: OptimisticList::with_authoritative(ListOrder::ByName, authoritative)
                    .merged(),
            }
        })
        .collect();

    Ok(PantryTemplate { shelves, query: q }.into_response())
}

pub async fn create_shelf(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.pantry.create_shelf(user_id).await?;
    Ok(Redirect::to("/app/pantry").into_response())
}

pub async fn rename_shelf(
    State(state): State<AppState>,
    session: Session,
    Path(shelf_id): Path<i64>,
    Form(form): Form<RenameShelfForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.pantry.rename_shelf(user_id, shelf_id, &form.name).await?;
    Ok(Redirect::to("/app/pantry").into_response())
}

pub async fn delete_shelf(
    State(state): State<AppState>,
    session: Session,
    Path(shelf_id): Path<i64>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.pantry.delete_shelf(user_id, shelf_id).await?;
    Ok(Redirect::to("/app/pantry").into_response())
}

pub async fn create_item(
    State(state): State<AppState>,
    session: Session,
    Path(shelf_id): Path<i64>,
    Form(form): Form<NewItemForm>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.pantry.create_item(user_id, shelf_id, &form.name).await?;
    Ok(Redirect::to("/app/pantry").into_response())
}

pub async fn delete_item(
    State(state): State<AppState>,
    session: Session,
    Path(item_id): Path<i64>,
) -> Result<Response, AppError> {
    let user_id = get_user_id(&session).await?;
    state.pantry.delete_item(user_id, item_id).await?;
    Ok(Redirect::to("/app/pantry").into_response())
}
