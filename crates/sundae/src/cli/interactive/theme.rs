//! Dialoguer theme and banner for SUNDAE interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// Returns a `ColorfulTheme` in SUNDAE's colours.
///
/// - Prompt prefix: yellow `?`
/// - Active item indicator: yellow `▸`
/// - Success prefix: green `✓`
/// - Error prefix: red `✗`
pub fn sundae_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().yellow(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().yellow(),
        active_item_style: Style::new().for_stderr().yellow(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Prints the SUNDAE banner to stderr so stdout stays clean for analyses.
pub fn print_banner() {
    let version_line = format!("SUNDAE v{}", sundae_core::VERSION);
    let tagline = "Crypto futures chart analyst";

    let inner_width = tagline.len() + 8;

    let top = format!("  ╔{:═<width$}╗", "", width = inner_width);
    let mid1 = format!("  ║{:^width$}║", version_line, width = inner_width);
    let mid2 = format!("  ║{:^width$}║", tagline, width = inner_width);
    let bot = format!("  ╚{:═<width$}╝", "", width = inner_width);

    let yellow = Style::new().for_stderr().yellow();

    eprintln!();
    eprintln!("{}", yellow.apply_to(&top));
    eprintln!("{}", yellow.apply_to(&mid1));
    eprintln!("{}", yellow.apply_to(&mid2));
    eprintln!("{}", yellow.apply_to(&bot));
    eprintln!();
}
