//! Notes and sessions of xUML services.

use tabled::Tabled;

use e2ebridge_api::Note;

use crate::cli::{GlobalOpts, NotesArgs, NotesCommand, SessionsArgs, SessionsCommand};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct NoteRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "File")]
    file: String,
}

pub async fn handle_notes(target: &Target, args: NotesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = &target.client;

    match args.command {
        NotesCommand::Model { name, file: Some(file) } => {
            let text = client.model_note(&name, &file).await?;
            output::print_text(&text, global.quiet);
            Ok(())
        }

        NotesCommand::Model { name, file: None } => {
            let notes = client.model_notes_list(&name).await?;
            let out = output::render_list(
                &global.output(),
                &notes.notes,
                |n: &Note| NoteRow {
                    name: n.name.clone(),
                    file: n.file_name().to_owned(),
                },
                |n| n.file_name().to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NotesCommand::Custom { name } => {
            let text = client.custom_notes(&name).await?;
            output::print_text(&text, global.quiet);
            Ok(())
        }
    }
}

pub async fn handle_sessions(
    target: &Target,
    args: SessionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = &target.client;

    match args.command {
        SessionsCommand::List { name } => {
            let sessions = client.service_sessions(&name).await?;
            output::print_output(
                &output::render_value(&global.output(), &sessions)?,
                global.quiet,
            );
            Ok(())
        }

        SessionsCommand::Cancel { name, id } => {
            if !util::confirm(&format!("Cancel session {id} of '{name}'?"), global)? {
                return Ok(());
            }
            client.cancel_session(&name, &id).await?;
            output::success(global, &format!("Cancelled session {id} of '{name}'"));
            Ok(())
        }
    }
}
