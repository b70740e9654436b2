//! # Seed Data Generator
//!
//! Populates an empty database with a starter shop for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by INSPIRE_DB_PATH (default ./inspire.db)
//! cargo run -p inspire-db --bin seed
//!
//! # Specify database path
//! cargo run -p inspire-db --bin seed -- --db ./data/inspire.db
//! ```
//!
//! ## Generated Data
//! - Users `admin` (admin) and `staff` (staff)
//! - A "Walk-in Customer"
//! - One shoe product per brand and size, with opening stock

use std::env;

use inspire_core::{NewCustomer, NewProduct, NewUser, Role};
use inspire_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Brand, model, and base price in cents.
const MODELS: &[(&str, &str, i64)] = &[
    ("Nike", "Air Runner", 1_250_000),
    ("Adidas", "Street Classic", 1_100_000),
    ("Bata", "Office Oxford", 650_000),
    ("Servis", "Daily Comfort", 450_000),
    ("Puma", "Court Sprint", 980_000),
    ("Stylo", "Evening Heel", 720_000),
];

const SIZES: &[&str] = &["39", "40", "41", "42", "43", "44"];

const COLORS: &[&str] = &["Black", "White", "Brown", "Navy"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,inspire_db=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = DbConfig::from_env()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Inspire Billing Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $INSPIRE_DB_PATH or ./inspire.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), "Seeding database");
    let db = Database::new(config).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    for (username, full_name, role) in [
        ("admin", "Shop Owner", Role::Admin),
        ("staff", "Counter Staff", Role::Staff),
    ] {
        let id = db
            .users()
            .insert(&NewUser {
                username: username.to_string(),
                full_name: Some(full_name.to_string()),
                role,
            })
            .await?;
        info!(id, username, %role, "User created");
    }

    let customer_id = db
        .customers()
        .insert(&NewCustomer {
            full_name: "Walk-in Customer".to_string(),
            ..Default::default()
        })
        .await?;
    info!(id = customer_id, "Customer created");

    let start = std::time::Instant::now();
    let mut generated = 0usize;

    for (model_idx, (brand, model, base_price)) in MODELS.iter().enumerate() {
        for (size_idx, size) in SIZES.iter().enumerate() {
            let product = generate_product(brand, model, *base_price, size, model_idx * 10 + size_idx);

            if let Err(e) = db.products().insert(&product).await {
                warn!(name = %product.name, error = %e, "Failed to insert product");
                continue;
            }
            generated += 1;
        }
    }

    info!(generated, elapsed = ?start.elapsed(), "Seed complete");
    db.close().await;

    Ok(())
}

/// Builds one catalogue row. `seed` varies color, cost, and stock.
fn generate_product(brand: &str, model: &str, base_price: i64, size: &str, seed: usize) -> NewProduct {
    // Larger sizes carry a small premium
    let size_addon = (seed % 10) as i64 * 10_000;
    let price_cents = base_price + size_addon;

    // Cost is 55-75% of price
    let cost_pct = 55 + (seed * 7 % 21) as i64;

    NewProduct {
        name: format!("{brand} {model}"),
        description: Some(format!("{brand} {model}, size {size}")),
        brand: Some(brand.to_string()),
        size: Some(size.to_string()),
        color: Some(COLORS[seed % COLORS.len()].to_string()),
        price_cents,
        purchase_price_cents: Some(price_cents * cost_pct / 100),
        stock_qty: (seed * 13 % 25) as i64,
        supplier_name: Some(format!("{brand} Distributors")),
        supplier_phone: None,
        image_path: None,
    }
}
