//! # Seed Data Generator
//!
//! Populates a database with a demo catalog and one account per role.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p tally-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p tally-db --bin seed -- --count 1000 --db ./data/tally.db
//! ```
//!
//! ## Generated Data
//! - Categories and suppliers from the table below
//! - Products `{CATEGORY}-{NAME}-{NNN}` with prices 0.99 to 12.99
//! - Users `admin`, `manager`, `cashier` (password = username) if the
//!   database has no users yet

use std::env;
use tally_core::{Money, NewProduct, Role};
use tally_db::{Database, DbConfig, DbResult};

/// (category code, category name, supplier, product names)
const CATALOG: &[(&str, &str, &str, &[&str])] = &[
    (
        "BEV",
        "Beverages",
        "Northwind Drinks",
        &["Cola", "Lemon Soda", "Sparkling Water", "Orange Juice", "Iced Tea", "Cold Brew"],
    ),
    (
        "SNK",
        "Snacks",
        "Crunch Co",
        &["Salted Chips", "Pretzels", "Trail Mix", "Granola Bar", "Popcorn", "Rice Crackers"],
    ),
    (
        "DRY",
        "Dairy",
        "Green Pastures",
        &["Whole Milk", "Greek Yogurt", "Cheddar", "Butter", "Cream Cheese", "Eggs Dozen"],
    ),
    (
        "HOM",
        "Household",
        "Acme Supply",
        &["Dish Soap", "Paper Towels", "Sponges", "Trash Bags", "Light Bulb", "Batteries AA"],
    ),
];

/// Size variants and their price add-on in cents.
const SIZES: &[(&str, i64)] = &[("Small", 0), ("Regular", 75), ("Large", 150), ("Family", 300)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tally POS Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    seed_users(&db).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalog to avoid duplicates.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let generated = seed_catalog(&db, count).await?;
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    let hits = db.products().search("cola").await?;
    println!("  Search 'cola': {} results", hits.len());
    let valuation = db.reports().inventory_valuation().await?;
    println!("  Inventory value: {}", valuation.total);

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

async fn seed_users(db: &Database) -> DbResult<()> {
    if db.users().count().await? > 0 {
        println!("  Users already present, leaving them alone");
        return Ok(());
    }

    for role in [Role::Admin, Role::Manager, Role::Cashier] {
        db.users().create(role.as_str(), role.as_str(), role).await?;
        println!("✓ User '{}' created", role);
    }
    Ok(())
}

async fn seed_catalog(db: &Database, count: usize) -> DbResult<usize> {
    let mut generated = 0;

    for (category_idx, (code, category, supplier, names)) in CATALOG.iter().enumerate() {
        let category = db.categories().get_or_create(category).await?;
        let supplier = db.suppliers().get_or_create(supplier).await?;

        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    return Ok(generated);
                }

                let seed = category_idx * 1000 + name_idx * 10 + size_idx;
                let mut product = generate_product(code, name, size, *addon, seed);
                product.category_id = Some(category.id.clone());
                product.supplier_id = Some(supplier.id.clone());

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.sku, e);
                    continue;
                }
                generated += 1;
            }
        }
    }

    Ok(generated)
}

/// Builds one product with deterministic pseudo-random figures.
fn generate_product(code: &str, name: &str, size: &str, addon: i64, seed: usize) -> NewProduct {
    let short: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let sku = format!("{}-{}-{:03}", code, short, seed % 1000);

    // 0.99 - 9.99 base plus size add-on
    let selling_cents = 99 + ((seed * 37) % 900) as i64 + addon;
    // Cost 55-75% of the price
    let cost_cents = selling_cents * (55 + (seed % 21) as i64) / 100;

    NewProduct::new(
        format!("{} {}", name, size),
        sku,
        Money::from_cents(cost_cents),
        Money::from_cents(selling_cents),
    )
    .with_stock((seed % 60) as i64)
}
