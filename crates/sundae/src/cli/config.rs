//! The `sundae config` command: where settings live and what they resolve to.

use clap::{Args, Subcommand};
use sundae_core::{credential, Config};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective settings: model order, key lookup and the full TOML
    Show,

    /// Show config file path
    Path,

    /// Write a config file with the default model list and key locations
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command against the configuration `main` loaded.
pub async fn execute(args: ConfigArgs, config: Config) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            for line in summary_lines(&config) {
                println!("{line}");
            }
            println!();
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, Config::default().to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
            println!(
                "Put your Gemini key in ${} or {}",
                Config::default().credentials.env_vars.join(" / $"),
                Config::default().key_file_path().display()
            );
        }
    }

    Ok(())
}

/// Human summary of the settings that decide which model is used and where
/// the key comes from. The key itself is never printed.
fn summary_lines(config: &Config) -> Vec<String> {
    let config_path = Config::default_path();
    let mut lines = vec![format!(
        "Config file:  {} {}",
        config_path.display(),
        if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        }
    )];

    lines.push(format!("Endpoint:     {}", config.model.endpoint));
    lines.push("Models (tried in order):".to_string());
    for (i, name) in config.model.candidates().iter().enumerate() {
        lines.push(format!("  {}. {name}", i + 1));
    }

    lines.push("API key lookup (first non-empty wins):".to_string());
    for var in &config.credentials.env_vars {
        lines.push(format!("  ${var}"));
    }
    lines.push(format!("  {} (dotfile)", config.dotenv_path().display()));
    lines.push(format!("  {} (key file)", config.key_file_path().display()));

    lines.push(match credential::resolve(config, None) {
        Ok(found) => format!("API key:      found in {}", found.source()),
        Err(_) => "API key:      not found".to_string(),
    });

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isolated(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.credentials.env_vars = vec!["SUNDAE_TEST_UNSET_KEY_CFG".to_string()];
        config.credentials.dotenv_file = dir.join(".env").to_string_lossy().into_owned();
        config.credentials.key_file = dir.join("key.txt").to_string_lossy().into_owned();
        config
    }

    #[test]
    fn test_summary_lists_models_and_key_locations() {
        let dir = tempfile::tempdir().unwrap();
        let config = isolated(dir.path());
        let lines = summary_lines(&config);

        let first = lines.iter().position(|l| l == "  1. gemini-2.5-flash").unwrap();
        assert_eq!(lines[first + 1], "  2. gemini-2.0-flash-exp");
        assert_eq!(lines[first + 2], "  3. gemini-1.5-flash");
        assert!(lines.contains(&"  $SUNDAE_TEST_UNSET_KEY_CFG".to_string()));
        assert!(lines.iter().any(|l| l.contains("key.txt (key file)")));
        assert_eq!(lines.last().unwrap(), "API key:      not found");
    }

    #[test]
    fn test_summary_names_key_source_without_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = isolated(dir.path());
        std::fs::write(dir.path().join("key.txt"), "very-secret\n").unwrap();

        let lines = summary_lines(&config);
        let last = lines.last().unwrap();
        assert!(last.starts_with("API key:      found in"));
        assert!(last.ends_with("key.txt"));
        assert!(lines.iter().all(|l| !l.contains("very-secret")));
    }
}
