//! `labres results ...` subcommands.

use clap::Subcommand;
use labres_client::{HttpLabDirectory, HttpResultStore};
use labres_core::{
    format_date, label_for, status_badge_class, LabLabel, ResultsView, DEFAULT_STATUS,
};
use labres_storage::{Lab, LabDirectory, LabResult, ResultFilter, ResultStore};
use serde_json::json;

use crate::config::Settings;
use crate::terminal::TerminalUi;
use crate::{outcome_to_result, print_json, CliError, OutputFormat};

#[derive(Subcommand)]
pub enum ResultsCommands {
    /// List results one page at a time
    List {
        /// Page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Results per page (overrides config)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        page_size: Option<u64>,
    },

    /// Show a single result
    Show {
        /// Result id
        id: i64,
    },

    /// Find results matching every given criterion
    Find {
        #[arg(long)]
        lab_id: Option<i64>,
        #[arg(long)]
        nif: Option<String>,
        /// Case-insensitive substring of the patient name
        #[arg(long)]
        patient_name: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Earliest date, in milliseconds since the epoch
        #[arg(long)]
        from: Option<i64>,
        /// Latest date, in milliseconds since the epoch
        #[arg(long)]
        to: Option<i64>,
    },

    /// Create a result dated now
    Create {
        #[arg(long)]
        lab_id: String,
        #[arg(long)]
        nif: String,
        #[arg(long)]
        patient_name: String,
        #[arg(long)]
        data: String,
        #[arg(long, default_value = DEFAULT_STATUS)]
        status: String,
    },

    /// Change the status of a result
    Status {
        /// Result id
        id: i64,
        /// New status, e.g. "En Proceso"
        status: String,
    },

    /// Delete a result
    Delete {
        /// Result id
        id: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

type View = ResultsView<HttpResultStore, HttpLabDirectory, TerminalUi>;

fn view(settings: &Settings, page_size: usize, yes: bool, quiet: bool) -> View {
    ResultsView::new(
        HttpResultStore::new(&settings.api_url),
        HttpLabDirectory::new(&settings.api_url),
        TerminalUi::new(yes, quiet),
        page_size,
    )
}

pub async fn run(
    command: ResultsCommands,
    settings: &Settings,
    output: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    match command {
        ResultsCommands::List { page, page_size } => {
            let page_size = page_size.map_or(settings.page_size, |n| n as usize);
            cmd_list(settings, page, page_size, output, quiet).await
        }
        ResultsCommands::Show { id } => cmd_show(settings, id, output).await,
        ResultsCommands::Find {
            lab_id,
            nif,
            patient_name,
            status,
            from,
            to,
        } => {
            let filter = ResultFilter {
                lab_id,
                nif,
                patient_name,
                status,
                start_date: from,
                end_date: to,
            };
            cmd_find(settings, &filter, output).await
        }
        ResultsCommands::Create {
            lab_id,
            nif,
            patient_name,
            data,
            status,
        } => {
            let mut view = view(settings, settings.page_size, true, quiet);
            view.load_labs().await;
            view.show_create_form();
            let draft = view.draft_mut();
            draft.lab_id = lab_id;
            draft.nif = nif;
            draft.patient_name = patient_name;
            draft.data = data;
            draft.status = status;

            outcome_to_result(view.create_result().await)?;
            if let Some(created) = view.list().results().first() {
                print_one(created, view.labs(), output);
            }
            Ok(())
        }
        ResultsCommands::Status { id, status } => {
            let mut view = loaded_view(settings, true, quiet).await?;
            outcome_to_result(view.update_result_status(id, &status).await)?;
            if let Some(updated) = view.list().find(id) {
                print_one(updated, view.labs(), output);
            }
            Ok(())
        }
        ResultsCommands::Delete { id, yes } => {
            let mut view = loaded_view(settings, yes, quiet).await?;
            outcome_to_result(view.delete_result(id).await)
        }
    }
}

/// A view with results and labs loaded; a failed results load is an error.
async fn loaded_view(settings: &Settings, yes: bool, quiet: bool) -> Result<View, CliError> {
    let mut view = view(settings, settings.page_size, yes, quiet);
    view.init().await;
    match view.list().error() {
        Some(message) => Err(CliError::Failed(message.to_string())),
        None => Ok(view),
    }
}

async fn cmd_list(
    settings: &Settings,
    page: usize,
    page_size: usize,
    output: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    let mut view = view(settings, page_size, false, quiet);
    view.init().await;
    if let Some(message) = view.list().error() {
        return Err(CliError::Failed(message.to_string()));
    }

    if page != 1 && !view.change_page(page) && !quiet {
        eprintln!(
            "Aviso: la página {} no existe; se muestra la página {}",
            page,
            view.list().current_page()
        );
    }

    let list = view.list();
    match output {
        OutputFormat::Json => {
            let value = json!({
                "page": list.current_page(),
                "pageSize": list.page_size(),
                "totalPages": list.total_pages(),
                "total": list.len(),
                "results": view.page(),
            });
            print_json(&value);
        }
        OutputFormat::Text => {
            if list.is_empty() {
                println!("No hay resultados.");
                return Ok(());
            }
            print_table(view.page(), view.labs());
            println!();
            println!(
                "Página {} de {} ({} resultados)",
                list.current_page(),
                list.total_pages(),
                list.len()
            );
        }
    }
    Ok(())
}

async fn cmd_show(settings: &Settings, id: i64, output: OutputFormat) -> Result<(), CliError> {
    let mut view = loaded_view(settings, false, true).await?;
    view.show_result_detail(id);
    let Some(result) = view.selected() else {
        return Err(CliError::Failed(format!("Resultado {} no encontrado", id)));
    };

    match output {
        OutputFormat::Json => print_json(&json!(result)),
        OutputFormat::Text => {
            println!("Id:            {}", result.id);
            println!("ULID:          {}", result.ulid);
            println!(
                "Laboratorio:   {} ({})",
                view.lab_name(result.lab_id),
                view.lab_key_name(result.lab_id)
            );
            println!("NIF:           {}", result.nif);
            println!("Paciente:      {}", result.patient_name);
            println!("Fecha:         {}", view.format_date(result.date));
            println!(
                "Estado:        {} [{}]",
                result.status,
                view.status_badge_class(&result.status)
            );
            println!("Datos:         {}", result.data);
        }
    }
    Ok(())
}

async fn cmd_find(
    settings: &Settings,
    filter: &ResultFilter,
    output: OutputFormat,
) -> Result<(), CliError> {
    let store = HttpResultStore::new(&settings.api_url);
    let directory = HttpLabDirectory::new(&settings.api_url);

    let results = store.filter(filter).await.map_err(|e| {
        CliError::Failed(format!("Error al buscar resultados: {}", e.user_message()))
    })?;
    // Labels are cosmetic; an unreachable directory only degrades them.
    let labs = directory.list_all().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "error loading labs");
        Vec::new()
    });

    match output {
        OutputFormat::Json => print_json(&json!(results)),
        OutputFormat::Text if results.is_empty() => println!("No hay resultados."),
        OutputFormat::Text => print_table(&results, &labs),
    }
    Ok(())
}

fn print_table(results: &[LabResult], labs: &[Lab]) {
    println!(
        "{:>6}  {:<12}  {:<12}  {:<28}  {:<10}  ESTADO",
        "ID", "LAB", "NIF", "PACIENTE", "FECHA"
    );
    for r in results {
        println!(
            "{:>6}  {:<12}  {:<12}  {:<28}  {:<10}  {} [{}]",
            r.id,
            label_for(r.lab_id, labs, LabLabel::KeyName),
            r.nif,
            r.patient_name,
            format_date(r.date),
            r.status,
            status_badge_class(&r.status)
        );
    }
}

fn print_one(result: &LabResult, labs: &[Lab], output: OutputFormat) {
    match output {
        OutputFormat::Json => print_json(&json!(result)),
        OutputFormat::Text => print_table(std::slice::from_ref(result), labs),
    }
}
