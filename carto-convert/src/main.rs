//! Point d'entrée CLI pour carto-convert

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Charge `.env` depuis le répertoire courant, sinon depuis celui de l'exécutable
///
/// Retourne le fichier chargé, journalisé une fois le logging initialisé.
fn load_env() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }
    let path = std::env::current_exe().ok()?.parent()?.join(".env");
    dotenvy::from_path(&path).ok().map(|_| path)
}

mod cli;

use cli::Commands;

/// Convertir des positions de forage entre projection, datum de référence et WGS84
#[derive(Parser)]
#[command(name = "carto-convert")]
#[command(author, version)]
#[command(about = "Convertir des positions de forage entre projection cartographique, datum de référence et WGS84")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // GEODETIC_DATUM_HOST_URL et POLL_* doivent être connus avant la config
    let env_file = load_env();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    if let Some(path) = env_file {
        debug!(path = %path.display(), "Environment file loaded");
    }

    match cli.command {
        Commands::Convert {
            batch,
            catalog,
            output,
            report,
            service,
        } => {
            let config = service.resolve()?;
            info!(batch = %batch.display(), catalog = %catalog.display(), "Conversion");
            cli::cmd_convert(
                &batch,
                &catalog,
                output.as_deref(),
                report.as_deref(),
                &config,
            )
            .await?;
        }
        Commands::Definition {
            catalog,
            id,
            service,
        } => {
            let config = service.resolve()?;
            cli::cmd_definition(&catalog, id, &config).await?;
        }
        Commands::Families => cli::cmd_families(),
    }

    Ok(())
}

/// Directives par défaut : nos crates suivent la verbosité, les dépendances
/// (reqwest, hyper) restent à `warn`
fn default_directives(verbose: u8, quiet: bool) -> String {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };
    format!("warn,carto_convert={level},carto_proj={level}")
}

/// Logs sur stderr (stdout reçoit le lot converti) ; `RUST_LOG` l'emporte
fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose, quiet)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 0)
        .init();
}
