//! `tally category ...`

use clap::{Args, Subcommand};

use super::Session;
use crate::error::CliResult;
use tally_core::Capability;

#[derive(Debug, Args)]
pub(crate) struct CategoryCommand {
    #[command(subcommand)]
    command: CategorySubcommand,
}

#[derive(Debug, Subcommand)]
enum CategorySubcommand {
    /// Create a category
    Add(AddCategoryArgs),
    /// List categories by name
    List,
}

#[derive(Debug, Args)]
struct AddCategoryArgs {
    name: String,

    #[arg(long)]
    description: Option<String>,
}

pub(crate) async fn run(session: &Session, command: CategoryCommand) -> CliResult<()> {
    match command.command {
        CategorySubcommand::Add(args) => {
            session.login(Capability::ManageProducts).await?;
            let category = session
                .db
                .categories()
                .insert(&args.name, args.description.as_deref())
                .await?;
            println!("Created category '{}'", category.name);
        }
        CategorySubcommand::List => {
            for category in session.db.categories().list().await? {
                match category.description {
                    Some(description) => println!("{:<24} {}", category.name, description),
                    None => println!("{}", category.name),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{session_as, store};
    use crate::error::CliError;
    use tally_db::DbError;

    fn add(name: &str) -> CategoryCommand {
        CategoryCommand {
            command: CategorySubcommand::Add(AddCategoryArgs {
                name: name.to_string(),
                description: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_add_category_rejects_duplicates() {
        let session = session_as(store().await, "manager");
        run(&session, add("Hardware")).await.unwrap();

        let err = run(&session, add("Hardware")).await.unwrap_err();
        assert!(matches!(err, CliError::Db(DbError::UniqueViolation { .. })));
        assert_eq!(session.db.categories().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cashier_cannot_add_category() {
        let session = session_as(store().await, "cashier");
        assert!(run(&session, add("Hardware")).await.is_err());
        assert!(session.db.categories().list().await.unwrap().is_empty());
    }
}
