use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use larder::{
    db,
    repositories::{
        SqlitePantryRepository, SqliteRecipeRepository, SqliteUserRepository, PantryRepository,
        RecipeDefaults, RecipeRepository, UserRepository,
    },
};
use rand::RngCore;

#[derive(Parser)]
#[command(name = "larder-cli")]
#[command(about = "CLI tool for managing a larder instance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database with a demo account, pantry, and recipes
    Seed,

    /// Generate a random base64 secret suitable for SESSION_SECRET or
    /// MAGIC_LINK_SECRET
    GenerateKey,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed => seed().await,
        Commands::GenerateKey => {
            let mut bytes = [0u8; 64];
            rand::thread_rng().fill_bytes(&mut bytes);
            println!("{}", STANDARD.encode(bytes));
            Ok(())
        }
    }
}

async fn seed() -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let users = SqliteUserRepository::new(pool.clone());
    let pantry = SqlitePantryRepository::new(pool.clone());
    let recipes = SqliteRecipeRepository::new(pool.clone());

    let email = "me@example.com";
    if users.find_by_email(email).await?.is_some() {
        println!("Demo account {} already exists, nothing to do", email);
        return Ok(());
    }

    let user = users.create(email, "Mr.", "Alex").await?;
    println!("Created demo account {} (id {})", user.email, user.id);

    let dairy = pantry.create_shelf(user.id, "Dairy").await?;
    for item in ["Milk", "Butter", "Cheddar"] {
        pantry.create_item(user.id, dairy.id, item).await?;
    }

    let fruits = pantry.create_shelf(user.id, "Fruits").await?;
    for item in ["Apples", "Bananas"] {
        pantry.create_item(user.id, fruits.id, item).await?;
    }

    let spaghetti = recipes
        .create(
            user.id,
            RecipeDefaults {
                name: "Spaghetti Bolognese",
                total_time: "45 minutes",
                image_url: "https://picsum.photos/400/300?random=1",
            },
        )
        .await?;
    for (name, amount) in [
        ("Spaghetti", Some("400g")),
        ("Ground beef", Some("500g")),
        ("Tomato sauce", Some("1 jar")),
        ("Garlic", Some("2 cloves")),
    ] {
        recipes.create_ingredient(spaghetti.id, name, amount).await?;
    }

    let pancakes = recipes
        .create(
            user.id,
            RecipeDefaults {
                name: "Pancakes",
                total_time: "20 minutes",
                image_url: "https://picsum.photos/400/300?random=2",
            },
        )
        .await?;
    for (name, amount) in [
        ("Flour", Some("2 cups")),
        ("Milk", Some("1.5 cups")),
        ("Eggs", Some("2")),
    ] {
        recipes.create_ingredient(pancakes.id, name, amount).await?;
    }

    println!("Seeded 2 shelves and 2 recipes");
    Ok(())
}
