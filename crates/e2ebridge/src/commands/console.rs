//! Legacy console command handlers.
//!
//! Every call runs on the console session; the library logs in on first use
//! and once more if the console reports the session expired.

use secrecy::SecretString;

use e2ebridge_api::ServiceAction;

use crate::cli::{
    ConsoleArgs, ConsoleCommand, GlobalOpts, GroupCommand, NodeServiceRef, ServiceRef, UserCommand,
};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util;

async fn change_status(
    target: &Target,
    service: &NodeServiceRef,
    action: ServiceAction,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let node = service.node.as_deref().unwrap_or(&target.node);
    let ServiceRef { kind, name } = &service.service;
    target
        .client
        .console_set_service_status(*kind, name, node, action)
        .await?;
    output::success(global, &format!("{action} sent to {kind} service '{name}' on {node}"));
    Ok(())
}

fn prompt_password(id: &str) -> Result<SecretString, CliError> {
    let password = rpassword::prompt_password(format!("Password for '{id}': "))?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

pub async fn handle(target: &Target, args: ConsoleArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = &target.client;

    match args.command {
        ConsoleCommand::Login => {
            client
                .login(None)
                .await
                .map_err(|e| CliError::from(e).for_profile(&target.profile))?;
            output::success(global, "Logged in to the admin console");
            Ok(())
        }

        ConsoleCommand::Start(service) => {
            change_status(target, &service, ServiceAction::Start, global).await
        }
        ConsoleCommand::Stop(service) => {
            change_status(target, &service, ServiceAction::Stop, global).await
        }
        ConsoleCommand::Kill(service) => {
            change_status(target, &service, ServiceAction::Kill, global).await
        }

        ConsoleCommand::Remove(service) => {
            let node = service.node.as_deref().unwrap_or(&target.node);
            let ServiceRef { kind, name } = &service.service;
            if !util::confirm(&format!("Remove {kind} service '{name}' from {node}?"), global)? {
                return Ok(());
            }
            client.console_remove_service(*kind, name, node).await?;
            output::success(global, &format!("Removed {kind} service '{name}' from {node}"));
            Ok(())
        }

        ConsoleCommand::Deploy(args) => {
            let options = util::deploy_options(&args);
            util::with_spinner(
                format!("Deploying {} via the console", args.path.display()),
                global,
                client.console_deploy_path(&args.path, &options),
            )
            .await?;
            output::success(global, &format!("Deployed {}", args.path.display()));
            Ok(())
        }

        ConsoleCommand::Group(group) => match group.command {
            GroupCommand::Create { id, name } => {
                client.create_group(&id, &name).await?;
                output::success(global, &format!("Created group '{id}'"));
                Ok(())
            }
            GroupCommand::Delete { id } => {
                if !util::confirm(&format!("Delete group '{id}'?"), global)? {
                    return Ok(());
                }
                client.delete_group(&id).await?;
                output::success(global, &format!("Deleted group '{id}'"));
                Ok(())
            }
        },

        ConsoleCommand::User(user) => match user.command {
            UserCommand::Create { id, name, group } => {
                let password = prompt_password(&id)?;
                client.create_user(&id, &name, &password, &group).await?;
                output::success(global, &format!("Created user '{id}' in group '{group}'"));
                Ok(())
            }
            UserCommand::Delete { id } => {
                if !util::confirm(&format!("Delete user '{id}'?"), global)? {
                    return Ok(());
                }
                client.delete_user(&id).await?;
                output::success(global, &format!("Deleted user '{id}'"));
                Ok(())
            }
        },
    }
}
