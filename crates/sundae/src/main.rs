//! SUNDAE CLI - crypto futures chart analyst backed by Gemini.
//!
//! Sends a trading chart image with the SUNDAE analyst instruction to a
//! Gemini model and prints the trading signal it returns. Logs go to stderr
//! so the analysis on stdout can be piped or redirected.
//!
//! # Usage
//!
//! ```bash
//! # Analyse a chart
//! sundae analyze btc_4h.png
//!
//! # Save the reply and use a specific model
//! sundae analyze btc_4h.png --model gemini-2.5-pro --output signal.txt
//!
//! # See which models are reachable with the current key
//! sundae models check
//!
//! # Guided session
//! sundae
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use std::io::IsTerminal;
use std::process::ExitCode;
use sundae_core::AnalysisError;

mod cli;
mod logging;

/// SUNDAE - crypto futures chart analysis with Gemini.
#[derive(Parser, Debug)]
#[command(name = "sundae")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyse a chart image and print the trading signal
    Analyze(cli::analyze::AnalyzeArgs),

    /// List or check the configured Gemini models
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match sundae_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `sundae config path`."
            );
            sundae_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("SUNDAE v{}", sundae_core::VERSION);

    let outcome = match cli.command {
        Some(Commands::Analyze(args)) => cli::analyze::execute(args, config).await,
        Some(Commands::Models(args)) => cli::models::execute(args, config).await,
        Some(Commands::Config(args)) => cli::config::execute(args, config).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(&config).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    // Analysis failures get their remedy list instead of a bare error line
    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => match e.downcast_ref::<AnalysisError>() {
            Some(err) => {
                cli::report_failure(err);
                Ok(ExitCode::FAILURE)
            }
            None => Err(e),
        },
    }
}
