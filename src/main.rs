use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gridcity::{
    render::TextRenderer,
    scenario::{Scenario, ScenarioLoader},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Grid city builder")]
struct Cli {
    /// Log filter used when RUST_LOG is unset (defaults to the scenario's level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Replay a scenario's scripted commands and print the resulting city
    Play {
        /// Path to the scenario YAML file
        #[arg(long, default_value = "scenarios/downtown.yaml")]
        scenario: PathBuf,

        /// Print the final snapshot as JSON instead of a text map
        #[arg(long)]
        json: bool,
    },
    /// Serve the city over HTTP
    Serve {
        /// Optional scenario to start from (the standard empty city otherwise)
        #[arg(long)]
        scenario: Option<PathBuf>,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load(path: Option<&PathBuf>) -> Result<Scenario> {
    match path {
        Some(path) => ScenarioLoader::new(".").load(path),
        None => Ok(Scenario::standard()),
    }
}

fn play(scenario: &Scenario, json: bool) -> Result<()> {
    let mut session = scenario.build_session();
    info!(
        scenario = %scenario.name,
        commands = scenario.commands.len(),
        "replaying scenario"
    );
    for command in &scenario.commands {
        match session.apply(*command) {
            Ok(event) => info!(%event),
            Err(err) => warn!(?command, reason = err.reason(), "{err}"),
        }
    }

    let snapshot = session.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", TextRenderer::render(&snapshot));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Mode::Play { scenario, json } => {
            let scenario = load(Some(&scenario))?;
            init_logging(cli.log_level.as_deref().unwrap_or(&scenario.logging.level));
            play(&scenario, json)
        }
        Mode::Serve {
            scenario,
            host,
            port,
        } => {
            let scenario = load(scenario.as_ref())?;
            init_logging(cli.log_level.as_deref().unwrap_or(&scenario.logging.level));
            web::run(WebServerConfig {
                scenario,
                host,
                port,
            })
            .await
        }
    }
}
