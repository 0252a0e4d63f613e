//! # Seed Data Generator
//!
//! Writes a demo catalog into a till database for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./till_dev.db
//! cargo run -p till-db --bin seed
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//!
//! # Replace an existing catalog
//! cargo run -p till-db --bin seed -- --force
//! ```
//!
//! Each product gets a slug id `{category}-{name}`, a whole-unit price,
//! a starting stock level and a reorder threshold.

use std::env;
use std::sync::Arc;
use till_core::{BusinessSnapshot, Category, Money, Product};
use till_db::{Database, DbConfig, PersistenceGateway, SqliteSnapshotStore};

/// Demo catalog: (category id, category name, [(product name, price, stock)])
const CATALOG: &[(&str, &str, &[(&str, i64, i64)])] = &[
    (
        "bakery",
        "Bakery",
        &[
            ("White Bread", 2_500, 40),
            ("Brown Bread", 2_800, 30),
            ("Chapati", 500, 120),
            ("Mandazi", 300, 200),
            ("Cake Slice", 1_500, 25),
        ],
    ),
    (
        "dairy",
        "Dairy",
        &[
            ("Fresh Milk 500ml", 1_200, 60),
            ("Yoghurt 250ml", 1_000, 45),
            ("Butter 250g", 6_500, 12),
            ("Eggs (tray)", 12_000, 10),
        ],
    ),
    (
        "drinks",
        "Drinks",
        &[
            ("Water 500ml", 500, 240),
            ("Soda 350ml", 1_000, 180),
            ("Juice 1L", 3_500, 36),
            ("Tea Leaves 100g", 2_000, 50),
        ],
    ),
    (
        "household",
        "Household",
        &[
            ("Bar Soap", 1_500, 80),
            ("Washing Powder 1kg", 5_500, 20),
            ("Matches", 100, 500),
            ("Candles (6)", 2_400, 30),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./till_dev.db");
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("Till Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -f, --force        Replace an existing catalog");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let gateway = PersistenceGateway::new(Arc::new(SqliteSnapshotStore::new(db.clone())));
    let restored = gateway.restore().await?;

    if !restored.business.products.is_empty() && !force {
        println!(
            "⚠ Database already has {} products",
            restored.business.products.len()
        );
        println!("  Pass --force to replace the catalog.");
        return Ok(());
    }

    let business = BusinessSnapshot {
        products: demo_products(),
        categories: demo_categories(),
        ..restored.business
    };
    gateway.save_business(&business).await?;

    println!(
        "✓ Wrote {} products in {} categories",
        business.products.len(),
        business.categories.len()
    );

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn demo_categories() -> Vec<Category> {
    CATALOG
        .iter()
        .map(|(id, name, _)| Category {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect()
}

fn demo_products() -> Vec<Product> {
    CATALOG
        .iter()
        .flat_map(|(category_id, _, items)| {
            items.iter().map(move |(name, price, stock)| {
                let mut product = Product::new(
                    product_id(category_id, name),
                    *name,
                    Money::from_units(*price),
                    *stock,
                );
                product.cost = Money::from_units(price * 7 / 10);
                product.min_stock = (stock / 5).max(2);
                product.category_id = Some(category_id.to_string());
                product
            })
        })
        .collect()
}

/// `bakery` + `White Bread` → `bakery-white-bread`
fn product_id(category_id: &str, name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("{}-{}", category_id, slug)
}
