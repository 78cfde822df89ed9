use clap::Parser;
use lakerelay::action::Invocation;
use lakerelay::backend::athena::AthenaBackend;
use lakerelay::cli::{self, Cli, Command};
use lakerelay::error::LakerelayError;
use lakerelay::handler::{AdapterOptions, QueryAdapter, QueryOutcome};
use lakerelay::verbose::{self, Timer};
use lakerelay::{config, output};
use std::process;

#[tokio::main]
async fn main() {
    // Load .env file (optional, ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Handle(ref args) => handle(args, cli.verbose, cli.config.as_ref()).await,
        Command::Query(ref args) => query(args, cli.verbose, cli.config.as_ref()).await,
    };

    if let Err(err) = result {
        output::print_error(&err);
        process::exit(1);
    }
}

async fn handle(
    args: &cli::HandleArgs,
    verbose: bool,
    config_path: Option<&std::path::PathBuf>,
) -> Result<(), LakerelayError> {
    let app_config = config::load_from_handle_args(args, verbose, config_path)?;
    let verbose = app_config.verbose;

    let raw = resolve_invocation(args)?;
    let invocation: Invocation =
        serde_json::from_str(&raw).map_err(|e| LakerelayError::Request {
            message: format!("invalid invocation envelope: {}", e),
        })?;
    verbose::emit(
        verbose,
        &format!(
            "handling invocation {}::{}",
            invocation.action_group, invocation.api_path
        ),
    );

    let backend = AthenaBackend::connect(&app_config.athena).await;
    let adapter = QueryAdapter::new(backend, AdapterOptions::from_config(&app_config));

    let timer = Timer::start();
    let result = adapter.handle(&invocation).await?;
    verbose::emit(
        verbose,
        &format!(
            "invocation handled ({}ms, status {})",
            timer.elapsed_ms(),
            result.response.http_status_code
        ),
    );

    let json = serde_json::to_string_pretty(&result).map_err(|e| LakerelayError::Format {
        message: e.to_string(),
    })?;
    emit_json(&app_config, &json)
}

async fn query(
    args: &cli::QueryArgs,
    verbose: bool,
    config_path: Option<&std::path::PathBuf>,
) -> Result<(), LakerelayError> {
    let app_config = config::load_from_query_args(args, verbose, config_path)?;
    let verbose = app_config.verbose;

    let sql = resolve_sql(args)?;

    let backend = AthenaBackend::connect(&app_config.athena).await;
    let adapter = QueryAdapter::new(backend, AdapterOptions::from_config(&app_config));

    verbose::emit(verbose, "executing query...");
    let timer = Timer::start();
    let rows = match adapter.run_query(&sql).await? {
        QueryOutcome::Rows(rows) => rows,
        QueryOutcome::Failed(status) => {
            return Err(LakerelayError::Query {
                message: format!("Query failed with status '{}'", status),
            });
        }
    };
    verbose::emit(
        verbose,
        &format!("query complete ({}ms, {} rows)", timer.elapsed_ms(), rows.len()),
    );

    let json = serde_json::to_string_pretty(&rows).map_err(|e| LakerelayError::Format {
        message: e.to_string(),
    })?;
    emit_json(&app_config, &json)
}

// --- Helpers ---

fn resolve_invocation(args: &cli::HandleArgs) -> Result<String, LakerelayError> {
    if let Some(ref invocation) = args.invocation {
        return Ok(invocation.clone());
    }
    if let Some(ref path) = args.invocation_file {
        let content = std::fs::read_to_string(path).map_err(|e| LakerelayError::Config {
            message: format!("cannot read invocation file {}: {}", path.display(), e),
        })?;
        return Ok(content);
    }
    Err(LakerelayError::Config {
        message: "no invocation provided — use positional argument or --file".to_string(),
    })
}

fn resolve_sql(args: &cli::QueryArgs) -> Result<String, LakerelayError> {
    if let Some(ref sql) = args.sql {
        return Ok(sql.clone());
    }
    if let Some(ref path) = args.sql_file {
        let content = std::fs::read_to_string(path).map_err(|e| LakerelayError::Config {
            message: format!("cannot read SQL file {}: {}", path.display(), e),
        })?;
        return Ok(content);
    }
    Err(LakerelayError::Config {
        message: "no SQL provided — use positional argument or --file".to_string(),
    })
}

fn emit_json(app_config: &config::AppConfig, json: &str) -> Result<(), LakerelayError> {
    if let Some(ref path) = app_config.output_file {
        verbose::emit(
            app_config.verbose,
            &format!("writing output to {}...", path.display()),
        );
        output::write_file(json, path)
    } else {
        output::print_result(json);
        Ok(())
    }
}
