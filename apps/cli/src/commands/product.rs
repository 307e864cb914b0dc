//! `tally product ...`: catalog maintenance.

use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

use super::Session;
use crate::error::{CliError, CliResult};
use tally_core::{Capability, Money, NewProduct, Product, ProductUpdate};
use tally_db::{export_products, import_products, ProductListing};

#[derive(Debug, Args)]
pub(crate) struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    /// Add a product
    Add(AddProductArgs),
    /// Change product details; stock goes through adjust-stock
    Update(UpdateProductArgs),
    /// Delete a product that has never been sold or restocked
    Delete(SkuArg),
    /// List the catalog
    List(ListArgs),
    /// Search by name or SKU
    Search(SearchArgs),
    /// Restock (+N) or write off (-N)
    AdjustStock(AdjustStockArgs),
    /// Show stock history
    History(SkuArg),
    /// Import products from CSV
    Import(PathArg),
    /// Export products to CSV
    Export(PathArg),
}

#[derive(Debug, Args)]
struct AddProductArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    sku: String,

    #[arg(long)]
    purchase_price: Money,

    #[arg(long)]
    selling_price: Money,

    #[arg(long, default_value_t = 0)]
    stock: i64,

    #[arg(long, default_value_t = 0)]
    min_stock: i64,

    /// Category name; created if missing
    #[arg(long)]
    category: Option<String>,

    /// Supplier name; created if missing
    #[arg(long)]
    supplier: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    image_path: Option<String>,
}

#[derive(Debug, Args)]
struct UpdateProductArgs {
    sku: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    new_sku: Option<String>,

    #[arg(long)]
    purchase_price: Option<Money>,

    #[arg(long)]
    selling_price: Option<Money>,

    #[arg(long)]
    min_stock: Option<i64>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    description: Option<String>,
}

#[derive(Debug, Args)]
struct SkuArg {
    sku: String,
}

#[derive(Debug, Args)]
struct PathArg {
    path: PathBuf,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Only products at or below their reorder threshold
    #[arg(long)]
    low: bool,
}

#[derive(Debug, Args)]
struct SearchArgs {
    query: String,
}

#[derive(Debug, Args)]
struct AdjustStockArgs {
    sku: String,

    #[arg(allow_hyphen_values = true)]
    delta: i64,

    #[arg(long, default_value = "adjustment")]
    reason: String,
}

pub(crate) async fn run(session: &Session, command: ProductCommand) -> CliResult<()> {
    let db = &session.db;

    match command.command {
        ProductSubcommand::Add(args) => {
            session.login(Capability::ManageProducts).await?;
            let mut new = NewProduct::new(args.name, args.sku, args.purchase_price, args.selling_price)
                .with_stock(args.stock);
            new.min_stock = args.min_stock;
            new.description = args.description;
            new.image_path = args.image_path;
            if let Some(name) = args.category {
                new.category_id = Some(db.categories().get_or_create(&name).await?.id);
            }
            if let Some(name) = args.supplier {
                new.supplier_id = Some(db.suppliers().get_or_create(&name).await?.id);
            }

            let product = db.products().insert(&new).await?;
            println!("Added {} ({})", product.name, product.sku);
        }
        ProductSubcommand::Update(args) => {
            session.login(Capability::ManageProducts).await?;
            let product = find(session, &args.sku).await?;
            let category_id = match args.category {
                Some(name) => Some(db.categories().get_or_create(&name).await?.id),
                None => None,
            };
            let changes = ProductUpdate {
                name: args.name,
                sku: args.new_sku,
                purchase_price: args.purchase_price,
                selling_price: args.selling_price,
                min_stock: args.min_stock,
                category_id,
                description: args.description,
                ..ProductUpdate::default()
            };
            if changes.is_empty() {
                return Err(CliError::InvalidArgument("Nothing to update".to_string()));
            }

            let product = db.products().update(&product.id, &changes).await?;
            println!("Updated {} ({})", product.name, product.sku);
        }
        ProductSubcommand::Delete(args) => {
            session.login(Capability::ManageProducts).await?;
            let product = find(session, &args.sku).await?;
            db.products().delete(&product.id).await?;
            println!("Deleted {}", product.sku);
        }
        ProductSubcommand::List(args) => {
            if args.low {
                for product in db.products().low_stock().await? {
                    println!(
                        "{:<16} {:<32} stock {:>5} (min {})",
                        product.sku, product.name, product.stock, product.min_stock
                    );
                }
            } else {
                print_listings(&db.products().list_all().await?);
            }
        }
        ProductSubcommand::Search(args) => {
            let hits = db.products().search(&args.query).await?;
            if hits.is_empty() {
                println!("No products match '{}'", args.query);
            }
            print_listings(&hits);
        }
        ProductSubcommand::AdjustStock(args) => {
            let operator = session.login(Capability::ManageProducts).await?;
            let product = find(session, &args.sku).await?;
            let stock = db
                .products()
                .adjust_stock(&product.id, args.delta, &args.reason)
                .await?;
            info!(by = %operator.username, sku = %product.sku, delta = args.delta, "Stock adjusted");
            println!("{}: stock {} -> {}", product.sku, product.stock, stock);
        }
        ProductSubcommand::History(args) => {
            let product = find(session, &args.sku).await?;
            for entry in db.inventory().history_for_product(&product.id).await? {
                println!(
                    "{}  {:>+6}  {}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.change,
                    entry.reason
                );
            }
        }
        ProductSubcommand::Import(args) => {
            session.login(Capability::ManageProducts).await?;
            let report = import_products(db, &args.path).await?;
            println!("Imported {} products, skipped {}", report.added, report.skipped);
        }
        ProductSubcommand::Export(args) => {
            let rows = export_products(db, &args.path).await?;
            println!("Exported {} products to {}", rows, args.path.display());
        }
    }

    Ok(())
}

pub(crate) async fn find(session: &Session, sku: &str) -> CliResult<Product> {
    session
        .db
        .products()
        .get_by_sku(sku)
        .await?
        .ok_or_else(|| CliError::UnknownSku(sku.to_string()))
}

fn print_listings(listings: &[ProductListing]) {
    for listing in listings {
        let p = &listing.product;
        println!(
            "{:<16} {:<32} {:>10} {:>6}  {}",
            p.sku,
            p.name,
            p.selling_price,
            p.stock,
            listing.category.as_deref().unwrap_or("-")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{session_as, store};
    use clap::Parser;

    /// Wraps the subcommand so tests can parse real argument lists.
    #[derive(Debug, Parser)]
    struct Harness {
        #[command(subcommand)]
        command: ProductSubcommand,
    }

    fn parse(args: &[&str]) -> ProductCommand {
        let harness = Harness::try_parse_from(std::iter::once("product").chain(args.iter().copied()))
            .unwrap();
        ProductCommand {
            command: harness.command,
        }
    }

    #[tokio::test]
    async fn test_add_with_category_and_supplier() {
        let session = session_as(store().await, "manager");
        run(
            &session,
            parse(&[
                "add", "--name", "Bolt", "--sku", "B-1", "--purchase-price", "0.10",
                "--selling-price", "0.25", "--stock", "100", "--category", "Hardware",
                "--supplier", "Acme",
            ]),
        )
        .await
        .unwrap();

        let bolt = session.db.products().get_by_sku("B-1").await.unwrap().unwrap();
        assert_eq!(bolt.selling_price, Money::from_cents(25));
        assert_eq!(bolt.stock, 100);
        assert!(bolt.category_id.is_some());
        assert!(bolt.supplier_id.is_some());
    }

    #[tokio::test]
    async fn test_adjust_stock_accepts_negative_delta() {
        let session = session_as(store().await, "manager");
        run(&session, parse(&["adjust-stock", "W-1", "-3", "--reason", "damaged"]))
            .await
            .unwrap();

        let widget = session.db.products().get_by_sku("W-1").await.unwrap().unwrap();
        assert_eq!(widget.stock, 7);

        let history = session
            .db
            .inventory()
            .history_for_product(&widget.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].change, -3);
        assert_eq!(history[0].reason, "damaged");
    }

    #[tokio::test]
    async fn test_update_changes_price_only() {
        let session = session_as(store().await, "manager");
        run(&session, parse(&["update", "G-1", "--selling-price", "5.50"]))
            .await
            .unwrap();

        let gadget = session.db.products().get_by_sku("G-1").await.unwrap().unwrap();
        assert_eq!(gadget.selling_price, Money::from_cents(550));
        assert_eq!(gadget.name, "Gadget");

        assert!(matches!(
            run(&session, parse(&["update", "G-1"])).await,
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_sku() {
        let session = session_as(store().await, "manager");
        assert!(matches!(
            run(&session, parse(&["delete", "NOPE"])).await,
            Err(CliError::UnknownSku(sku)) if sku == "NOPE"
        ));
    }

    #[tokio::test]
    async fn test_cashier_can_search_but_not_edit() {
        let session = session_as(store().await, "cashier");
        run(&session, parse(&["search", "widg"])).await.unwrap();
        assert!(run(&session, parse(&["delete", "W-1"])).await.is_err());
        assert!(session.db.products().get_by_sku("W-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_export_then_import_via_commands() {
        let session = session_as(store().await, "manager");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        let path_arg = path.to_str().unwrap();

        run(&session, parse(&["export", path_arg])).await.unwrap();
        // Both SKUs already exist, so every row is skipped.
        run(&session, parse(&["import", path_arg])).await.unwrap();
        assert_eq!(session.db.products().count().await.unwrap(), 2);
    }
}
