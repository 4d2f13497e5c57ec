//! aql - run an AQL query from the command line.

mod cli;
mod output;

use aql_cursor::config::{Config, ConnectionConfig};
use aql_cursor::error::{AqlError, Result};
use aql_cursor::{logging, Database};
use cli::Cli;
use serde_json::Value;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let connection = resolve_connection(&cli, &config)?;
    info!("Connection: {}", connection.display_string());

    let db = Database::connect(&connection)?;
    let query = cli.to_query();

    if cli.check {
        let parsed = db.parse(&query).await?;
        info!(collections = ?parsed.collections, bind_vars = ?parsed.bind_vars, "query is valid");
        return Ok(());
    }

    let mut cursor = db.execute(&query).await?;
    let print = |row: &Value| println!("{}", row);
    let outcome = if cli.bulk {
        output::emit_batches(&mut cursor, print).await
    } else {
        output::emit_rows(&mut cursor, print).await
    };

    let stats = cursor.stats();
    info!(
        count = ?cursor.count(),
        full_count = ?cursor.full_count(),
        scanned_full = stats.scanned_full,
        scanned_index = stats.scanned_index,
        writes_executed = stats.writes_executed,
        "query finished"
    );
    for warning in cursor.warnings() {
        warn!(code = warning.code, "{}", warning.message);
    }

    output::release(&mut cursor).await;
    outcome.map(|rows| info!(rows, "rows printed"))
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    // Precedence: CLI arguments, then the named (or default) config entry,
    // then environment variables.
    let mut connection = match cli.connection_name() {
        Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
            AqlError::config(format!("Connection '{}' not found in config file", name))
        })?,
        None => config.get_connection(None).cloned().unwrap_or_default(),
    };

    connection.merge(&cli.to_connection_config()?);
    connection.apply_env_defaults();

    Ok(connection)
}
