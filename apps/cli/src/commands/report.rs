//! `tally report ...`: read-only sales and inventory reports.
//!
//! Date ranges are inclusive UTC days and default to today.

use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};

use super::Session;
use crate::error::{CliError, CliResult};
use tally_core::{Capability, Sale};

#[derive(Debug, Args)]
pub(crate) struct ReportCommand {
    #[command(subcommand)]
    command: ReportSubcommand,
}

#[derive(Debug, Subcommand)]
enum ReportSubcommand {
    /// Transactions, revenue, tax, discount and items sold
    Summary(RangeArgs),
    /// Products by quantity sold
    BestSellers(BestSellersArgs),
    /// Stock valued at purchase price
    Valuation,
    /// Held sales
    Held,
    /// Latest sales, newest first
    Recent(RecentArgs),
}

#[derive(Debug, Args)]
struct RangeArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl RangeArgs {
    fn resolve(&self) -> CliResult<(NaiveDate, NaiveDate)> {
        let today = Utc::now().date_naive();
        let from = self.from.unwrap_or(today);
        let to = self.to.unwrap_or(today.max(from));
        if to < from {
            return Err(CliError::InvalidArgument(format!(
                "--to {to} is before --from {from}"
            )));
        }
        Ok((from, to))
    }
}

#[derive(Debug, Args)]
struct BestSellersArgs {
    #[command(flatten)]
    range: RangeArgs,

    #[arg(long, default_value_t = 10)]
    limit: u32,
}

#[derive(Debug, Args)]
struct RecentArgs {
    #[arg(long, default_value_t = 20)]
    limit: u32,
}

pub(crate) async fn run(session: &Session, command: ReportCommand) -> CliResult<()> {
    session.login(Capability::ViewReports).await?;
    let reports = session.db.reports();

    match command.command {
        ReportSubcommand::Summary(range) => {
            let (from, to) = range.resolve()?;
            let summary = reports.sales_summary(from, to).await?;
            println!("Sales {from} to {to}");
            println!("  Transactions  {:>12}", summary.transactions);
            println!("  Items sold    {:>12}", summary.items_sold);
            println!("  Discounts     {:>12}", summary.discount);
            println!("  Tax           {:>12}", summary.tax);
            println!("  Revenue       {:>12}", summary.revenue);
        }
        ReportSubcommand::BestSellers(args) => {
            let (from, to) = args.range.resolve()?;
            let best = reports.best_selling_products(from, to, args.limit).await?;
            if best.is_empty() {
                println!("No sales {from} to {to}");
            }
            for (rank, row) in best.iter().enumerate() {
                println!("{:>3}. {:<32} {:>6}", rank + 1, row.name, row.quantity_sold);
            }
        }
        ReportSubcommand::Valuation => {
            let valuation = reports.inventory_valuation().await?;
            println!(
                "{} products, {} units, valued at {}",
                valuation.products, valuation.units, valuation.total
            );
        }
        ReportSubcommand::Held => print_sales(&reports.held_sales().await?),
        ReportSubcommand::Recent(args) => {
            print_sales(&session.db.sales().list_recent(args.limit).await?)
        }
    }

    Ok(())
}

fn print_sales(sales: &[Sale]) {
    for sale in sales {
        println!(
            "{}  {}  {:<6} {:>10}{}",
            sale.created_at.format("%Y-%m-%d %H:%M"),
            sale.id,
            sale.payment_method,
            sale.total,
            if sale.held { "  (held)" } else { "" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{session_as, store};
    use tally_core::CoreError;

    #[test]
    fn test_range_defaults_and_order() {
        let today = Utc::now().date_naive();
        let range = RangeArgs { from: None, to: None };
        assert_eq!(range.resolve().unwrap(), (today, today));

        let day = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let range = RangeArgs {
            from: Some(day),
            to: Some(earlier),
        };
        assert!(matches!(range.resolve(), Err(CliError::InvalidArgument(_))));

        let range = RangeArgs {
            from: Some(earlier),
            to: Some(day),
        };
        assert_eq!(range.resolve().unwrap(), (earlier, day));
    }

    #[tokio::test]
    async fn test_reports_require_view_reports() {
        let cashier = session_as(store().await, "cashier");
        let err = run(&cashier, ReportCommand { command: ReportSubcommand::Valuation })
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Core(CoreError::InsufficientPermission { .. })));

        let manager = session_as(store().await, "manager");
        run(&manager, ReportCommand { command: ReportSubcommand::Valuation })
            .await
            .unwrap();
        run(
            &manager,
            ReportCommand {
                command: ReportSubcommand::Summary(RangeArgs { from: None, to: None }),
            },
        )
        .await
        .unwrap();
    }
}
