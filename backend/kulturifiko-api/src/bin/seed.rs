//! Creates or promotes the initial admin account
//! Run with: cargo run --bin seed

use kulturifiko_api::db::Database;
use kulturifiko_api::repository::{PgStore, UserRepository};
use kulturifiko_api::services::hash_password;
use kulturifiko_api::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    println!("Connecting to database...");
    let db = Database::connect(&config).await?;
    db.run_migrations().await?;
    println!("Connected successfully!");

    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Admin@123".to_string());

    println!("Hashing password...");
    let password_hash = hash_password(&password)?;

    let store = PgStore::new(db.pg.clone());
    if store.find_by_username(&username).await?.is_some() {
        println!("Updating existing admin...");
        sqlx::query("UPDATE users SET password_hash = $1, is_admin = TRUE WHERE username = $2")
            .bind(&password_hash)
            .bind(&username)
            .execute(&db.pg)
            .await?;
    } else {
        println!("Creating new admin...");
        store.create_user(&username, &password_hash, true).await?;
    }

    println!("\n========================================");
    println!("Admin Account Ready!");
    println!("========================================");
    println!("Username: {}", username);
    println!("Password: {}", password);
    println!("========================================");

    Ok(())
}
