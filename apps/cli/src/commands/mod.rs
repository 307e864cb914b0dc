//! # Commands
//!
//! ```text
//! tally [--db PATH] [--user NAME --password PW] <command>
//!
//! init                                   create schema + default admin
//! user      add | list | delete          ManageUsers
//! product   add | update | delete |
//!           adjust-stock | import        ManageProducts
//! product   list | search | history | export
//! category  add                          ManageProducts
//! category  list
//! sell      --item SKU[:QTY] ...         Sell
//! report    summary | best-sellers |
//!           valuation | held | recent    ViewReports
//! ```
//!
//! Commands that mutate state or show reports log the operator in first and
//! check the capability. Catalog reads need no login.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::PosConfig;
use crate::error::{CliError, CliResult};
use tally_core::{Capability, Operator, Role};
use tally_db::{Database, DbConfig};

mod category;
mod product;
mod report;
mod sell;
mod user;

/// Created by `init` when the store has no users.
const DEFAULT_ADMIN: &str = "admin";

#[derive(Debug, Parser)]
#[command(name = "tally", about = "Tally POS", version, long_about = None)]
pub(crate) struct Cli {
    /// SQLite database file (overrides TALLY_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Operator username
    #[arg(long = "user", short = 'u', global = true, env = "TALLY_USER")]
    user: Option<String>,

    /// Operator password
    #[arg(long, global = true, env = "TALLY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the database and a default admin account
    Init,
    User(user::UserCommand),
    Product(product::ProductCommand),
    Category(category::CategoryCommand),
    Sell(sell::SellArgs),
    Report(report::ReportCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> CliResult<()> {
        let config = PosConfig::load(self.db)?;
        let session = Session::open(config, self.user, self.password).await?;

        let result = match self.command {
            Commands::Init => init(&session).await,
            Commands::User(command) => user::run(&session, command).await,
            Commands::Product(command) => product::run(&session, command).await,
            Commands::Category(command) => category::run(&session, command).await,
            Commands::Sell(args) => sell::run(&session, args).await,
            Commands::Report(command) => report::run(&session, command).await,
        };

        session.db.close().await;
        result
    }
}

// =============================================================================
// Session
// =============================================================================

/// One command invocation: configuration, open store, and the credentials
/// given on the command line.
pub(crate) struct Session {
    pub(crate) config: PosConfig,
    pub(crate) db: Database,
    username: Option<String>,
    password: Option<String>,
}

impl Session {
    async fn open(
        config: PosConfig,
        username: Option<String>,
        password: Option<String>,
    ) -> CliResult<Self> {
        info!(path = %config.db_path.display(), "Opening database");
        let db = Database::new(DbConfig::new(config.db_path.clone())).await?;
        Ok(Session::new(config, db, username, password))
    }

    pub(crate) fn new(
        config: PosConfig,
        db: Database,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        Session {
            config,
            db,
            username,
            password,
        }
    }

    /// Authenticates the operator and checks one capability.
    pub(crate) async fn login(&self, capability: Capability) -> CliResult<Operator> {
        let (Some(username), Some(password)) = (self.username.as_deref(), self.password.as_deref())
        else {
            return Err(CliError::LoginRequired);
        };

        let operator = self
            .db
            .users()
            .authenticate(username, password)
            .await?
            .ok_or(CliError::LoginFailed)?;

        operator.require(capability)?;
        debug!(user = %operator.username, role = %operator.role, %capability, "Operator authorized");
        Ok(operator)
    }
}

/// Ensures the schema exists and seeds `admin/admin` into an empty store.
async fn init(session: &Session) -> CliResult<()> {
    if session.db.users().count().await? == 0 {
        session
            .db
            .users()
            .create(DEFAULT_ADMIN, DEFAULT_ADMIN, Role::Admin)
            .await?;
        info!("Default admin account created");
        println!("Created user '{DEFAULT_ADMIN}' with password '{DEFAULT_ADMIN}'. Change it.");
    }

    let schema = session.db.schema_status().await?;
    println!(
        "{} ready at {} (schema {}/{})",
        session.config.store_name,
        session.config.db_path.display(),
        schema.applied,
        schema.embedded
    );
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use clap::CommandFactory;
    use tally_core::{CoreError, Money, NewProduct, TaxRate};

    pub(crate) fn test_config() -> PosConfig {
        PosConfig {
            db_path: PathBuf::from(":memory:"),
            tax_rate: TaxRate::from_bps(700),
            clamp_discount: false,
            store_name: "Test Store".to_string(),
        }
    }

    /// A fresh store with one account per role (password = username) and two
    /// products: W-1 at 19.99 and G-1 at 5.00, ten of each.
    pub(crate) async fn store() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for role in [Role::Admin, Role::Manager, Role::Cashier] {
            db.users().create(role.as_str(), role.as_str(), role).await.unwrap();
        }
        db.products()
            .insert(&NewProduct::new("Widget", "W-1", Money::from_cents(1200), Money::from_cents(1999)).with_stock(10))
            .await
            .unwrap();
        db.products()
            .insert(&NewProduct::new("Gadget", "G-1", Money::from_cents(200), Money::from_cents(500)).with_stock(10))
            .await
            .unwrap();
        db
    }

    pub(crate) fn session_as(db: Database, username: &str) -> Session {
        Session::new(
            test_config(),
            db,
            Some(username.to_string()),
            Some(username.to_string()),
        )
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tally", "report", "held", "--user", "boss", "--password", "pw", "--db", "x.db",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("boss"));
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
    }

    #[tokio::test]
    async fn test_login_checks_capability() {
        let session = session_as(store().await, "cashier");
        let operator = session.login(Capability::Sell).await.unwrap();
        assert_eq!(operator.role, Role::Cashier);

        let err = session.login(Capability::ViewReports).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(CoreError::InsufficientPermission { .. })
        ));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let db = store().await;
        let anonymous = Session::new(test_config(), db.clone(), None, None);
        assert!(matches!(
            anonymous.login(Capability::Sell).await,
            Err(CliError::LoginRequired)
        ));

        let wrong = Session::new(
            test_config(),
            db,
            Some("admin".to_string()),
            Some("nope".to_string()),
        );
        assert!(matches!(
            wrong.login(Capability::Sell).await,
            Err(CliError::LoginFailed)
        ));
    }

    #[tokio::test]
    async fn test_init_seeds_admin_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let session = Session::new(test_config(), db, None, None);

        init(&session).await.unwrap();
        init(&session).await.unwrap();

        assert_eq!(session.db.users().count().await.unwrap(), 1);
        let admin = session
            .db
            .users()
            .authenticate("admin", "admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
