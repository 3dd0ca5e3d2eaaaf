//! Resource catalogue command handlers.

use tabled::Tabled;

use e2ebridge_api::ResourceFile;

use crate::cli::{GlobalOpts, ResourcesArgs, ResourcesCommand};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Date")]
    date: String,
}

impl From<&ResourceFile> for ResourceRow {
    fn from(f: &ResourceFile) -> Self {
        Self {
            name: f.name.clone(),
            size: f.file_size.clone().unwrap_or_default(),
            date: f.date.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(target: &Target, args: ResourcesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = &target.client;

    match args.command {
        ResourcesCommand::List { kind } => {
            let listing = client.list_resources(kind).await?;
            let out = output::render_list(
                &global.output(),
                &listing.file,
                |f| ResourceRow::from(f),
                |f| f.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourcesCommand::Upload { kind, file } => {
            util::with_spinner(
                format!("Uploading {}", file.display()),
                global,
                client.upload_resource(kind, &file),
            )
            .await?;
            output::success(global, &format!("Uploaded {} as {kind} file", file.display()));
            Ok(())
        }

        ResourcesCommand::Download { kind, name, out } => {
            let contents = client.download_resource(kind, &name).await?;
            util::write_file(&out, &contents)?;
            output::success(
                global,
                &format!("Wrote {} bytes to {}", contents.len(), out.display()),
            );
            Ok(())
        }

        ResourcesCommand::Delete { kind, name } => {
            if !util::confirm(&format!("Delete {kind} file '{name}'?"), global)? {
                return Ok(());
            }
            client.delete_resource(kind, &name).await?;
            output::success(global, &format!("Deleted {kind} file '{name}'"));
            Ok(())
        }
    }
}
