//! The `sundae models` command: inspect the model fallback list.

use clap::{Args, Subcommand};
use console::Style;
use sundae_core::{Analyst, Config};

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Print the candidate models in the order they are tried
    List,

    /// Try to load every candidate model and report which are usable
    Check {
        /// Gemini API key (takes precedence over env, .env and key file)
        #[arg(long)]
        api_key: Option<String>,
    },
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::List => {
            for line in candidate_lines(&config) {
                println!("{line}");
            }
        }

        ModelsCommand::Check { api_key } => {
            let analyst =
                Analyst::from_config(config, api_key.as_deref()).map_err(super::into_anyhow)?;

            let green = Style::new().green();
            let red = Style::new().red();
            let report = analyst.check_models().await;
            let usable = report.iter().filter(|(_, r)| r.is_ok()).count();

            for (name, outcome) in &report {
                match outcome {
                    Ok(()) => println!("  {} {name}", green.apply_to("✓")),
                    Err(reason) => println!("  {} {name}  {reason}", red.apply_to("✗")),
                }
            }
            println!();
            println!("{usable}/{} model(s) usable", report.len());

            if usable == 0 {
                anyhow::bail!("No configured Gemini model could be loaded");
            }
        }
    }

    Ok(())
}

/// Candidate models, numbered, with the preferred one marked.
fn candidate_lines(config: &Config) -> Vec<String> {
    config
        .model
        .candidates()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i == 0 {
                format!("{}. {name} (preferred)", i + 1)
            } else {
                format!("{}. {name}", i + 1)
            }
        })
        .collect()
}
