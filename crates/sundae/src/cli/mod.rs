//! Command handlers.

pub mod analyze;
pub mod config;
pub mod interactive;
pub mod models;

use sundae_core::{AnalysisError, SizeAdvisory, SundaeError};

/// Print an analysis failure and the remedies the user can try.
pub(crate) fn report_failure(err: &AnalysisError) {
    let red = console::Style::new().for_stderr().red();
    let dim = console::Style::new().for_stderr().dim();
    eprintln!("{} {err}", red.apply_to("✗"));
    for remedy in err.remedies() {
        eprintln!("  {} {remedy}", dim.apply_to("→"));
    }
}

/// Print the oversize warning for an image that is about to be sent anyway.
pub(crate) fn report_advisory(image_name: &str, advisory: &SizeAdvisory) {
    let warn = console::Style::new().for_stderr().yellow();
    eprintln!("{} {image_name}: {advisory}", warn.apply_to("!"));
}

/// Lift an analysis failure out of the library's umbrella error so `main`
/// can find it again with `downcast_ref::<AnalysisError>()`.
pub(crate) fn into_anyhow(err: SundaeError) -> anyhow::Error {
    match err {
        SundaeError::Analysis(err) => err.into(),
        other => other.into(),
    }
}
