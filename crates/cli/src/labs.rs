//! `labres labs ...` subcommands.

use clap::Subcommand;
use labres_client::HttpLabDirectory;
use labres_core::{LabsView, Outcome};
use labres_storage::Lab;
use serde_json::json;

use crate::config::Settings;
use crate::terminal::TerminalUi;
use crate::{outcome_to_result, print_json, CliError, OutputFormat};

#[derive(Subcommand)]
pub enum LabsCommands {
    /// List all laboratories
    List,

    /// Register a laboratory
    Create {
        #[arg(long)]
        key_name: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },

    /// Update a laboratory; omitted fields keep their current value
    Update {
        /// Laboratory ULID
        ulid: String,
        #[arg(long)]
        key_name: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a laboratory
    Delete {
        /// Laboratory id
        id: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

type View = LabsView<HttpLabDirectory, TerminalUi>;

async fn loaded_view(settings: &Settings, yes: bool, quiet: bool) -> Result<View, CliError> {
    let mut view = LabsView::new(
        HttpLabDirectory::new(&settings.api_url),
        TerminalUi::new(yes, quiet),
    );
    if view.load_labs().await == Outcome::Failed {
        return Err(view_error(&view));
    }
    Ok(view)
}

fn view_error(view: &View) -> CliError {
    CliError::Failed(
        view.error()
            .unwrap_or("Error al procesar el laboratorio")
            .to_string(),
    )
}

pub async fn run(
    command: LabsCommands,
    settings: &Settings,
    output: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    match command {
        LabsCommands::List => {
            let view = loaded_view(settings, false, quiet).await?;
            print_labs(view.labs(), output);
            Ok(())
        }
        LabsCommands::Create {
            key_name,
            name,
            description,
        } => {
            let mut view = loaded_view(settings, true, quiet).await?;
            view.open_create_form();
            let form = view.form_mut();
            form.key_name = key_name.trim().to_string();
            form.name = name.trim().to_string();
            form.description = description.trim().to_string();
            let key_name = form.key_name.clone();

            save(&mut view).await?;
            let created: Vec<Lab> = view
                .labs()
                .iter()
                .filter(|lab| lab.key_name == key_name)
                .cloned()
                .collect();
            print_labs(&created, output);
            Ok(())
        }
        LabsCommands::Update {
            ulid,
            key_name,
            name,
            description,
        } => {
            let mut view = loaded_view(settings, true, quiet).await?;
            let Some(lab) = view.labs().iter().find(|lab| lab.ulid == ulid).cloned() else {
                return Err(CliError::Failed(format!(
                    "Laboratorio {} no encontrado",
                    ulid
                )));
            };
            view.open_edit_form(lab);
            let form = view.form_mut();
            if let Some(key_name) = key_name {
                form.key_name = key_name.trim().to_string();
            }
            if let Some(name) = name {
                form.name = name.trim().to_string();
            }
            if let Some(description) = description {
                form.description = description.trim().to_string();
            }

            save(&mut view).await?;
            let updated: Vec<Lab> = view
                .labs()
                .iter()
                .filter(|lab| lab.ulid == ulid)
                .cloned()
                .collect();
            print_labs(&updated, output);
            Ok(())
        }
        LabsCommands::Delete { id, yes } => {
            let mut view = loaded_view(settings, yes, quiet).await?;
            let Some(lab) = view.labs().iter().find(|lab| lab.id == id).cloned() else {
                return Err(CliError::Failed(format!("Laboratorio {} no encontrado", id)));
            };
            match view.delete_lab(&lab).await {
                Outcome::Failed => Err(view_error(&view)),
                outcome => outcome_to_result(outcome),
            }
        }
    }
}

async fn save(view: &mut View) -> Result<(), CliError> {
    match view.save_lab().await {
        Outcome::Applied => Ok(()),
        Outcome::Rejected => Err(CliError::Failed(
            "La clave, el nombre y la descripción son obligatorios".to_string(),
        )),
        _ => Err(view_error(view)),
    }
}

fn print_labs(labs: &[Lab], output: OutputFormat) {
    match output {
        OutputFormat::Json => print_json(&json!(labs)),
        OutputFormat::Text => {
            if labs.is_empty() {
                println!("No hay laboratorios.");
                return;
            }
            println!(
                "{:>4}  {:<26}  {:<12}  {:<32}  DESCRIPCIÓN",
                "ID", "ULID", "CLAVE", "NOMBRE"
            );
            for lab in labs {
                println!(
                    "{:>4}  {:<26}  {:<12}  {:<32}  {}",
                    lab.id, lab.ulid, lab.key_name, lab.name, lab.description
                );
            }
        }
    }
}
