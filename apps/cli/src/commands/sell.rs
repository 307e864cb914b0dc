//! `tally sell`: ring up one sale.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login (Sell)                                                           │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  for each --item SKU[:QTY]:  get_by_sku ──► cart.add_item               │
//! │     │                        (repeated SKUs merge into one line)        │
//! │     ▼                                                                   │
//! │  cart.set_discount(amount | percent)                                    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  Checkout::finalize ──► sale id ──► print receipt                       │
//! │  (nothing is written or printed if any step fails)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::Args;
use rust_decimal::Decimal;
use std::fmt;

use super::Session;
use crate::error::{CliError, CliResult};
use tally_core::{Capability, Cart, Money, PaymentMethod};

#[derive(Debug, Args)]
pub(crate) struct SellArgs {
    /// Product to sell as SKU or SKU:QTY; repeat for more lines
    #[arg(long = "item", short = 'i', required = true)]
    items: Vec<String>,

    /// Flat discount off the subtotal
    #[arg(long, conflicts_with = "discount_percent")]
    discount_amount: Option<Money>,

    /// Percentage discount off the subtotal (10 = 10%)
    #[arg(long)]
    discount_percent: Option<Decimal>,

    /// cash, card or mobile
    #[arg(long, default_value = "cash")]
    payment: PaymentMethod,

    /// Save the sale without taking stock
    #[arg(long)]
    hold: bool,
}

pub(crate) async fn run(session: &Session, args: SellArgs) -> CliResult<()> {
    let operator = session.login(Capability::Sell).await?;
    let mut cart = session.config.new_cart();

    for raw in &args.items {
        let (sku, quantity) = parse_item(raw)?;
        let product = super::product::find(session, sku).await?;
        cart.add_item(&product.id, &product.name, product.selling_price, quantity)?;
    }

    cart.set_discount(
        args.discount_amount.unwrap_or(Money::ZERO),
        args.discount_percent.unwrap_or(Decimal::ZERO),
    )?;

    // finalize clears the cart on commit
    let sold = cart.clone();
    let sale_id = session
        .db
        .checkout()
        .finalize(&mut cart, args.payment, Some(&operator.user_id), args.hold)
        .await?;

    print!(
        "{}",
        Receipt {
            store_name: &session.config.store_name,
            sale_id: &sale_id,
            cart: &sold,
            payment: args.payment,
            held: args.hold,
        }
    );
    Ok(())
}

/// Splits `SKU[:QTY]`. The quantity defaults to 1.
fn parse_item(raw: &str) -> CliResult<(&str, i64)> {
    let (sku, quantity) = match raw.rsplit_once(':') {
        Some((sku, qty)) => {
            let qty = qty.trim().parse::<i64>().map_err(|_| {
                CliError::InvalidArgument(format!("Bad quantity in '{raw}', expected SKU:QTY"))
            })?;
            (sku.trim(), qty)
        }
        None => (raw.trim(), 1),
    };

    if sku.is_empty() {
        return Err(CliError::InvalidArgument(format!("Missing SKU in '{raw}'")));
    }
    Ok((sku, quantity))
}

/// A committed sale as printed for the customer.
struct Receipt<'a> {
    store_name: &'a str,
    sale_id: &'a str,
    cart: &'a Cart,
    payment: PaymentMethod,
    held: bool,
}

impl fmt::Display for Receipt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = self.cart.totals();
        let rule = "-".repeat(56);

        writeln!(f, "{}", self.store_name)?;
        writeln!(f, "Sale {}", self.sale_id)?;
        writeln!(f, "{rule}")?;
        for line in self.cart.lines() {
            writeln!(
                f,
                "{:<28} {:>4} x {:>8} {:>10}",
                line.name,
                line.quantity,
                line.unit_price,
                line.line_total()
            )?;
        }
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<42} {:>13}",
            format!("Subtotal ({} items)", self.cart.total_quantity()),
            totals.subtotal
        )?;
        if !totals.discount.is_zero() {
            writeln!(f, "{:<42} {:>13}", "Discount", -totals.discount)?;
        }
        writeln!(
            f,
            "{:<42} {:>13}",
            format!("Tax ({})", self.cart.tax_rate()),
            totals.tax
        )?;
        writeln!(f, "{:<42} {:>13}", "Total", totals.total)?;

        if self.held {
            writeln!(f, "HELD, not paid")
        } else {
            writeln!(f, "Paid by {}", self.payment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{session_as, store};
    use tally_core::CoreError;

    fn sell(items: &[&str]) -> SellArgs {
        SellArgs {
            items: items.iter().map(|s| s.to_string()).collect(),
            discount_amount: None,
            discount_percent: None,
            payment: PaymentMethod::Cash,
            hold: false,
        }
    }

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("W-1").unwrap(), ("W-1", 1));
        assert_eq!(parse_item("W-1:3").unwrap(), ("W-1", 3));
        assert_eq!(parse_item(" W-1 : 2 ").unwrap(), ("W-1", 2));
        assert!(matches!(parse_item("W-1:two"), Err(CliError::InvalidArgument(_))));
        assert!(matches!(parse_item(":2"), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_receipt_names_committed_sale() {
        let mut cart = crate::commands::tests::test_config().new_cart();
        cart.add_item("w", "Widget", Money::from_cents(1999), 2).unwrap();
        cart.add_item("g", "Gadget", Money::from_cents(500), 1).unwrap();

        let mut receipt = Receipt {
            store_name: "Test Store",
            sale_id: "sale-1",
            cart: &cart,
            payment: PaymentMethod::Card,
            held: false,
        };
        let text = receipt.to_string();
        assert!(text.starts_with("Test Store\nSale sale-1\n"));
        assert!(text.contains("Subtotal (3 items)"));
        assert!(text.lines().any(|l| l.starts_with("Total") && l.ends_with("48.13")));
        assert!(text.ends_with("Paid by card\n"));
        assert!(!text.contains("Discount"));

        receipt.held = true;
        assert!(receipt.to_string().ends_with("HELD, not paid\n"));
    }

    #[tokio::test]
    async fn test_oversized_price_cannot_reach_a_sale() {
        let session = session_as(store().await, "manager");
        let huge: Money = "79228162514264337593543950335".parse().unwrap();
        let err = session
            .db
            .products()
            .insert(&tally_core::NewProduct::new("Big", "BIG-1", Money::ZERO, huge))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            tally_db::DbError::Core(CoreError::Validation(
                tally_core::ValidationError::OutOfRange { .. }
            ))
        ));

        let err = run(&session, sell(&["BIG-1"])).await.unwrap_err();
        assert!(matches!(err, CliError::UnknownSku(_)));
    }

    #[tokio::test]
    async fn test_sell_records_sale_and_takes_stock() {
        let session = session_as(store().await, "cashier");
        run(&session, sell(&["W-1", "G-1", "W-1"])).await.unwrap();

        let recent = session.db.sales().list_recent(1).await.unwrap();
        let sale = &recent[0];
        assert_eq!(sale.subtotal, Money::from_cents(4498));
        assert_eq!(sale.tax, Money::from_cents(315));
        assert_eq!(sale.total, Money::from_cents(4813));
        assert!(sale.user_id.is_some());

        let items = session.db.sales().get_items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 2);

        let widget = session.db.products().get_by_sku("W-1").await.unwrap().unwrap();
        assert_eq!(widget.stock, 8);
    }

    #[tokio::test]
    async fn test_percent_discount_and_hold() {
        let session = session_as(store().await, "cashier");
        let mut args = sell(&["G-1:2"]);
        args.discount_percent = Some(Decimal::TEN);
        args.hold = true;
        run(&session, args).await.unwrap();

        let held = session.db.reports().held_sales().await.unwrap();
        assert_eq!(held.len(), 1);
        // 10.00 - 1.00 = 9.00, tax 0.63
        assert_eq!(held[0].discount, Money::from_cents(100));
        assert_eq!(held[0].total, Money::from_cents(963));

        let gadget = session.db.products().get_by_sku("G-1").await.unwrap().unwrap();
        assert_eq!(gadget.stock, 10);
    }

    #[tokio::test]
    async fn test_unknown_sku_writes_nothing() {
        let session = session_as(store().await, "cashier");
        let err = run(&session, sell(&["W-1", "NOPE"])).await.unwrap_err();
        assert!(matches!(err, CliError::UnknownSku(_)));
        assert_eq!(session.db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_quantity_limit_is_enforced() {
        let session = session_as(store().await, "cashier");
        let err = run(&session, sell(&["W-1:999", "W-1"])).await.unwrap_err();
        assert!(matches!(err, CliError::Core(CoreError::QuantityTooLarge { .. })));

        let err = run(&session, sell(&["W-1:0"])).await.unwrap_err();
        assert!(matches!(err, CliError::Core(CoreError::Validation(_))));
        assert_eq!(session.db.sales().count().await.unwrap(), 0);
    }
}
