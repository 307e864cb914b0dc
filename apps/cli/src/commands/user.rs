//! `tally user ...`: account management, admin only.

use clap::{Args, Subcommand};
use tracing::info;

use super::Session;
use crate::error::{CliError, CliResult};
use tally_core::{Capability, Role};

#[derive(Debug, Args)]
pub(crate) struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    /// Create an account
    Add(AddUserArgs),
    /// List accounts
    List,
    /// Delete an account; its past sales keep no operator
    Delete(DeleteUserArgs),
}

#[derive(Debug, Args)]
struct AddUserArgs {
    username: String,

    /// Password for the new account
    new_password: String,

    /// admin, manager or cashier
    #[arg(long, default_value = "cashier")]
    role: Role,
}

#[derive(Debug, Args)]
struct DeleteUserArgs {
    username: String,
}

pub(crate) async fn run(session: &Session, command: UserCommand) -> CliResult<()> {
    let operator = session.login(Capability::ManageUsers).await?;
    let users = session.db.users();

    match command.command {
        UserSubcommand::Add(args) => {
            let user = users.create(&args.username, &args.new_password, args.role).await?;
            println!("Created {} '{}'", user.role, user.username);
        }
        UserSubcommand::List => {
            for user in users.list().await? {
                println!(
                    "{:<20} {:<8} {}",
                    user.username,
                    user.role,
                    user.created_at.format("%Y-%m-%d")
                );
            }
        }
        UserSubcommand::Delete(args) => {
            let user = users
                .get_by_username(&args.username)
                .await?
                .ok_or_else(|| CliError::UnknownUser(args.username.clone()))?;
            if user.id == operator.user_id {
                return Err(CliError::InvalidArgument(
                    "Cannot delete the logged-in account".to_string(),
                ));
            }
            users.delete(&user.id).await?;
            info!(by = %operator.username, username = %user.username, "User deleted");
            println!("Deleted '{}'", user.username);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{session_as, store};
    use tally_core::CoreError;

    fn delete(username: &str) -> UserCommand {
        UserCommand {
            command: UserSubcommand::Delete(DeleteUserArgs {
                username: username.to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn test_admin_adds_and_deletes_users() {
        let session = session_as(store().await, "admin");

        let add = UserCommand {
            command: UserSubcommand::Add(AddUserArgs {
                username: "dana".to_string(),
                new_password: "secret".to_string(),
                role: Role::Manager,
            }),
        };
        run(&session, add).await.unwrap();
        assert!(session.db.users().authenticate("dana", "secret").await.unwrap().is_some());

        run(&session, delete("dana")).await.unwrap();
        assert!(session.db.users().get_by_username("dana").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cannot_delete_self_or_unknown() {
        let session = session_as(store().await, "admin");
        assert!(matches!(
            run(&session, delete("admin")).await,
            Err(CliError::InvalidArgument(_))
        ));
        assert!(matches!(
            run(&session, delete("ghost")).await,
            Err(CliError::UnknownUser(_))
        ));
    }

    #[tokio::test]
    async fn test_manager_cannot_manage_users() {
        let session = session_as(store().await, "manager");
        let err = run(&session, UserCommand { command: UserSubcommand::List })
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Core(CoreError::InsufficientPermission { .. })));
    }
}
