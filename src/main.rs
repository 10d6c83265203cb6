use larder::{
    auth, config::{AppConfig, SessionConfig},
    db, handlers,
    repositories::{SqlitePantryRepository, SqliteRecipeRepository, SqliteUserRepository},
    services::{self, GroceryService, PantryService, RecipeService},
    AppState,
};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "larder=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let pantry_repository = Arc::new(SqlitePantryRepository::new(pool.clone()));
    let recipe_repository = Arc::new(SqliteRecipeRepository::new(pool.clone()));

    let email_service = services::create_email_service();
    let magic_link = Arc::new(auth::MagicLinkService::new(
        &config,
        user_repository.clone(),
        email_service,
    ));
    let pantry = Arc::new(PantryService::new(pantry_repository.clone()));
    let recipes = Arc::new(RecipeService::new(recipe_repository.clone()));
    let grocery = Arc::new(GroceryService::new(
        recipe_repository.clone(),
        pantry_repository.clone(),
    ));

    let app_state = AppState {
        magic_link,
        users: user_repository,
        pantry,
        recipes,
        grocery,
        pool: pool.clone(),
    };

    let session_store = SqliteStore::new(pool.clone())
        .with_table_name("sessions")
        .expect("Invalid session table name");
    session_store.migrate().await?;
    let session_layer = SessionConfig::for_environment(config.environment)
        .create_layer(session_store);

    let protected_routes = Router::new()
        .route("/app", get(handlers::app_handlers::app_home))
        // Pantry
        .route("/app/pantry", get(handlers::pantry_handlers::pantry_page))
        .route(
            "/app/pantry/shelves",
            post(handlers::pantry_handlers::create_shelf),
        )
        .route(
            "/app/pantry/shelves/{id}/rename",
            post(handlers::pantry_handlers::rename_shelf),
        )
        .route(
            "/app/pantry/shelves/{id}/delete",
            post(handlers::pantry_handlers::delete_shelf),
        )
        .route(
            "/app/pantry/shelves/{id}/items",
            post(handlers::pantry_handlers::create_item),
        )
        .route(
            "/app/pantry/items/{id}/delete",
            post(handlers::pantry_handlers::delete_item),
        )
        // Recipes
        .route(
            "/app/recipes",
            get(handlers::recipe_handlers::recipe_list)
                .post(handlers::recipe_handlers::create_recipe),
        )
        .route(
            "/app/recipes/{id}",
            get(handlers::recipe_handlers::recipe_detail)
                .post(handlers::recipe_handlers::save_recipe),
        )
        .route(
            "/app/recipes/{id}/name",
            post(handlers::recipe_handlers::save_name),
        )
        .route(
            "/app/recipes/{id}/total-time",
            post(handlers::recipe_handlers::save_total_time),
        )
        .route(
            "/app/recipes/{id}/instructions",
            post(handlers::recipe_handlers::save_instructions),
        )
        .route(
            "/app/recipes/{id}/image-url",
            post(handlers::recipe_handlers::save_image_url),
        )
        .route(
            "/app/recipes/{id}/delete",
            post(handlers::recipe_handlers::delete_recipe),
        )
        .route(
            "/app/recipes/{id}/ingredients",
            post(handlers::recipe_handlers::create_ingredient),
        )
        .route(
            "/app/recipes/{id}/ingredients/{ingredient_id}/name",
            post(handlers::recipe_handlers::save_ingredient_name),
        )
        .route(
            "/app/recipes/{id}/ingredients/{ingredient_id}/amount",
            post(handlers::recipe_handlers::save_ingredient_amount),
        )
        .route(
            "/app/recipes/{id}/ingredients/{ingredient_id}/delete",
            post(handlers::recipe_handlers::delete_ingredient),
        )
        // Meal plan
        .route(
            "/app/recipes/{id}/meal-plan",
            post(handlers::recipe_handlers::add_to_meal_plan),
        )
        .route(
            "/app/recipes/{id}/meal-plan/remove",
            post(handlers::recipe_handlers::remove_from_meal_plan),
        )
        .route(
            "/app/meal-plan/clear",
            post(handlers::recipe_handlers::clear_meal_plan),
        )
        // Grocery list
        .route("/app/grocery", get(handlers::grocery_handlers::grocery_page))
        .route(
            "/app/grocery/check-off",
            post(handlers::grocery_handlers::check_off),
        )
        .layer(middleware::from_fn(auth::middleware::require_auth));

    let login_routes = Router::new()
        .route(
            "/login",
            get(handlers::auth_handlers::login_page).post(handlers::auth_handlers::submit_login),
        )
        .layer(middleware::from_fn(
            auth::middleware::redirect_if_authenticated,
        ));

    let app = Router::new()
        .route("/", get(handlers::auth_handlers::index))
        .merge(login_routes)
        .route(
            "/validate-magic-link",
            get(handlers::auth_handlers::validate_magic_link)
                .post(handlers::auth_handlers::complete_signup),
        )
        .route("/logout", post(handlers::auth_handlers::logout))
        .route("/discover", get(handlers::discover_handlers::discover_page))
        .route(
            "/discover/{id}",
            get(handlers::discover_handlers::discover_detail),
        )
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new("static"))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()?;

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));
    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
