//! Service command handlers (REST).

use e2ebridge_api::ServiceAction;

use crate::cli::{GlobalOpts, ServiceRef, ServicesArgs, ServicesCommand};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util;

async fn change_status(
    target: &Target,
    service: &ServiceRef,
    action: ServiceAction,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    target
        .client
        .set_service_status(service.kind, &service.name, action)
        .await?;
    output::success(global, &format!("{action} sent to {} service '{}'", service.kind, service.name));
    Ok(())
}

pub async fn handle(target: &Target, args: ServicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = &target.client;
    let format = global.output();

    match args.command {
        ServicesCommand::List { kind } => {
            let services = client.list_services(kind).await?;
            output::print_output(&output::render_value(&format, &services)?, global.quiet);
            Ok(())
        }

        ServicesCommand::Status(service) => {
            let status = client.service_status(service.kind, &service.name).await?;
            output::print_output(&output::render_value(&format, &status)?, global.quiet);
            Ok(())
        }

        ServicesCommand::Info { name } => {
            let info = client.service_info(&name).await?;
            output::print_output(&output::render_value(&format, &info)?, global.quiet);
            Ok(())
        }

        ServicesCommand::Start(service) => {
            change_status(target, &service, ServiceAction::Start, global).await
        }
        ServicesCommand::Stop(service) => {
            change_status(target, &service, ServiceAction::Stop, global).await
        }
        ServicesCommand::Kill(service) => {
            change_status(target, &service, ServiceAction::Kill, global).await
        }

        ServicesCommand::Remove(service) => {
            let prompt = format!("Remove {} service '{}'?", service.kind, service.name);
            if !util::confirm(&prompt, global)? {
                return Ok(());
            }
            client.remove_service(service.kind, &service.name).await?;
            output::success(global, &format!("Removed {} service '{}'", service.kind, service.name));
            Ok(())
        }

        ServicesCommand::Deploy(args) => {
            let options = util::deploy_options(&args);
            util::with_spinner(
                format!("Deploying {}", args.path.display()),
                global,
                client.deploy_path(&args.path, &options),
            )
            .await?;
            output::success(global, &format!("Deployed {}", args.path.display()));
            Ok(())
        }

        ServicesCommand::Repository { service, out } => {
            let repository = util::with_spinner(
                format!("Downloading repository of '{}'", service.name),
                global,
                client.service_repository(service.kind, &service.name),
            )
            .await?;
            util::write_file(&out, &repository)?;
            output::success(
                global,
                &format!("Wrote {} bytes to {}", repository.len(), out.display()),
            );
            Ok(())
        }
    }
}

