//! Interactive mode: a guided session for bare `sundae` on a TTY.
//!
//! Uses the same core calls as the `analyze` and `models` commands.

pub mod session;
pub mod theme;

use console::Style;
use dialoguer::Select;
use sundae_core::Config;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &["Analyze a chart", "Check models", "Configure settings", "Exit"];

/// Entry point for interactive mode.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::sundae_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => session::guided_analysis(config).await?,
            Some(1) => session::guided_check(config).await?,
            Some(2) => show_config(config)?,
            Some(3) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// Show a summary of the current settings, with the full TOML on request.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::sundae_theme();
    let dim = Style::new().for_stderr().dim();
    let yellow = Style::new().for_stderr().yellow();
    let label = Style::new().for_stderr().bold();

    loop {
        eprintln!();
        eprintln!("  {}", yellow.apply_to("Current configuration:"));
        eprintln!();

        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };

        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Models:"),
            config.model.candidates().join(" → ")
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Key env vars:"),
            config.credentials.env_vars.join(", ")
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Key file:"),
            config.key_file_path().display()
        );
        eprintln!(
            "    {:<20} {} (warn above {} MB)",
            label.apply_to("Formats:"),
            config.input.supported_formats.join(", "),
            config.input.max_file_size_mb
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Output:"),
            config.output.format
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        let items = &["View full config (TOML)", "Show config file path", "Back"];

        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!();
                }
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                    eprintln!();
                }
            },
            Some(1) => {
                eprintln!();
                eprintln!("  {}", Config::default_path().display());
                eprintln!();
            }
            Some(2) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}
