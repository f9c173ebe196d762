//! `slr`: línea de comandos del pipeline de estrategia de búsqueda.
//!
//! Salida JSON en stdout; errores en stderr con código de salida:
//! 2 uso, 3 entrada inválida, 4 no encontrado / prerequisito, 5 persistencia
//! o interno.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use slrflow::slr_core::{ArtifactKind, PipelineError, StageResult};
use slrflow::slr_query::{get_builder, supported_dialects, QueryError, QueryPlan};
use slrflow::{build_controller, AppConfig, AppError, FileController};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const LOG_VAR: &str = "SLRFLOW_LOG";

#[derive(Parser, Debug)]
#[command(name = "slr", version, about = "Human-in-the-loop search strategy pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crea un proyecto y ejecuta project-setup.
    Start {
        #[arg(long)]
        idea: String,
    },
    /// Ejecuta un stage (o lo re-ejecuta).
    Run {
        #[arg(long)]
        project: String,
        #[arg(long)]
        stage: String,
        /// Objeto JSON con parámetros extra para el handler.
        #[arg(long)]
        params: Option<String>,
    },
    /// Aprueba un artifact, opcionalmente con ediciones.
    Approve {
        #[arg(long)]
        project: String,
        #[arg(long)]
        kind: ArtifactKind,
        /// Objeto JSON con los campos a reemplazar.
        #[arg(long)]
        edits: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    Status {
        #[arg(long)]
        project: String,
    },
    Show {
        #[arg(long)]
        project: String,
        #[arg(long)]
        kind: ArtifactKind,
    },
    Projects,
    /// Renderiza una consulta desde un fichero QueryPlan o desde los bloques
    /// aprobados de un proyecto.
    Query {
        #[arg(long)]
        dialect: String,
        #[arg(long, conflicts_with = "project", required_unless_present = "project")]
        plan: Option<PathBuf>,
        #[arg(long)]
        project: Option<String>,
    },
    Dialects,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    // Los registros de `log` de las librerías también pasan por aquí.
    let _ = tracing_subscriber::fmt().with_env_filter(filter)
                                     .with_writer(std::io::stderr)
                                     .try_init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_object(flag: &str, raw: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).with_context(|| format!("--{flag} is not valid JSON"))? {
        Value::Object(map) => Ok(map),
        _ => Err(InvalidInput(format!("--{flag} must be a JSON object")).into()),
    }
}

/// Entrada del usuario rechazada antes de llegar al pipeline.
#[derive(Debug, Error)]
#[error("{0}")]
struct InvalidInput(String);

/// Imprime el resultado; un stage sin drafts cuenta como entrada inválida.
fn report_stage(result: &StageResult) -> anyhow::Result<ExitCode> {
    print_json(result)?;
    Ok(if result.is_success() { ExitCode::SUCCESS } else { ExitCode::from(3) })
}

fn controller() -> anyhow::Result<FileController> {
    let config = AppConfig::from_env()?;
    Ok(build_controller(&config)?)
}

fn execute(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Start { idea } => {
            let start = controller()?.start_project(&idea)?;
            print_json(&start)?;
            Ok(if start.result.is_success() { ExitCode::SUCCESS } else { ExitCode::from(3) })
        }
        Command::Run { project, stage, params } => {
            let params = params.as_deref().map(|raw| parse_object("params", raw)).transpose()?.unwrap_or_default();
            report_stage(&controller()?.run_stage_with(&project, &stage, params)?)
        }
        Command::Approve { project, kind, edits, note } => {
            let edits = edits.as_deref().map(|raw| parse_object("edits", raw)).transpose()?.map(Value::Object);
            let artifact = controller()?.approve_artifact(&project, kind, edits.as_ref(), note.as_deref())?;
            print_json(&artifact)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Status { project } => {
            print_json(&controller()?.get_project_status(&project)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { project, kind } => {
            print_json(&controller()?.get_artifact(&project, kind)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Projects => {
            print_json(&controller()?.list_projects()?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Query { dialect, plan, project } => {
            let query = match (plan, project) {
                (Some(path), _) => {
                    let raw = std::fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))?;
                    let plan: QueryPlan = serde_json::from_str(&raw).with_context(|| format!("{} is not a QueryPlan", path.display()))?;
                    get_builder(&dialect)?.build(&plan)?
                }
                (None, Some(project)) => controller()?.build_project_query(&project, &dialect)?,
                (None, None) => return Err(InvalidInput("either --plan or --project is required".into()).into()),
            };
            print_json(&json!({"dialect": dialect.to_ascii_lowercase(), "query": query}))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Dialects => {
            print_json(&supported_dialects())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn pipeline_exit_code(e: &PipelineError) -> u8 {
    match e {
        PipelineError::ArtifactNotFound { .. }
        | PipelineError::ProjectNotFound { .. }
        | PipelineError::PrerequisiteNotMet { .. }
        | PipelineError::StageNotRegistered { .. } => 4,
        PipelineError::InvalidEdit { .. } | PipelineError::InvalidPayload { .. } | PipelineError::Query(_) => 3,
        PipelineError::Persistence(_)
        | PipelineError::StageAlreadyRegistered { .. }
        | PipelineError::DuplicateProducer { .. }
        | PipelineError::InvalidStageGraph(_) => 5,
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(e) = err.downcast_ref::<PipelineError>() {
        return pipeline_exit_code(e);
    }
    if let Some(e) = err.downcast_ref::<AppError>() {
        return match e {
            AppError::Config { .. } => 3,
            AppError::Pipeline(inner) => pipeline_exit_code(inner),
        };
    }
    let invalid_input = err.downcast_ref::<QueryError>().is_some()
                        || err.downcast_ref::<InvalidInput>().is_some()
                        || err.downcast_ref::<serde_json::Error>().is_some()
                        || err.downcast_ref::<std::io::Error>().is_some();
    if invalid_input {
        3
    } else {
        5
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    match execute(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
