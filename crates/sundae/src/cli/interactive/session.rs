//! Guided analysis session: pick a chart, pick a model, read the verdict.

use std::path::PathBuf;

use console::Style;
use dialoguer::{Confirm, Input, Password, Select};
use sundae_core::presenter::{self, OutputFormat};
use sundae_core::{
    credential, AnalysisError, Analyst, Config, ImagePayload, Presenter, SundaeError,
};

use super::handle_interrupt;
use super::theme::sundae_theme;
use crate::cli::analyze::spinner;
use crate::cli::{report_advisory, report_failure};

/// Run analyses until the user declines another chart.
///
/// The model is resolved once and reused for every chart in the session.
pub async fn guided_analysis(config: &Config) -> anyhow::Result<()> {
    let theme = sundae_theme();
    let dim = Style::new().for_stderr().dim();

    let Some(model) = select_model(config)? else {
        return Ok(());
    };
    let mut config = config.clone();
    prefer_model(&mut config, &model);

    let Some(analyst) = build_analyst(config)? else {
        return Ok(());
    };

    let pb = spinner("Resolving Gemini model...");
    let resolved = analyst.resolve_model().await;
    pb.finish_and_clear();
    let resolved = match resolved {
        Ok(resolved) => resolved,
        Err(err) => {
            report_failure(&err);
            return Ok(());
        }
    };
    if resolved.used_fallback() {
        eprintln!(
            "  {}",
            dim.apply_to(format!("Using fallback model {}", resolved.model_used()))
        );
    }

    let format = OutputFormat::parse(&analyst.config().output.format).unwrap_or(OutputFormat::Text);
    let banner = analyst.config().output.banner;

    loop {
        let Some(path) = prompt_image_path()? else {
            break;
        };

        match ImagePayload::from_path(&path, &analyst.config().input) {
            Ok(image) => {
                if let Some(advisory) = analyst.size_advisory(&image) {
                    report_advisory(image.name(), &advisory);
                }

                let pb = spinner("Analyzing chart with Gemini...");
                let outcome = analyst.analyze_with(&resolved, &image).await;
                pb.finish_and_clear();

                match outcome {
                    Ok(result) => {
                        let stdout = std::io::stdout();
                        let mut out = Presenter::new(stdout.lock(), format, banner);
                        out.render(&result)?;
                        out.flush()?;
                        drop(out);

                        let save = handle_interrupt(
                            Confirm::with_theme(&theme)
                                .with_prompt("Save this analysis to a file?")
                                .default(false)
                                .interact(),
                        )?;
                        if save == Some(true) {
                            let path = PathBuf::from(presenter::default_save_name(&result.image_name));
                            presenter::save_text(&result, &path)?;
                            eprintln!("  Saved to {}", path.display());
                        }
                    }
                    Err(err) => report_failure(&err),
                }
            }
            Err(err) => report_failure(&err),
        }

        let again = handle_interrupt(
            Confirm::with_theme(&theme)
                .with_prompt("Analyze another chart?")
                .default(true)
                .interact(),
        )?;
        if again != Some(true) {
            break;
        }
    }

    Ok(())
}

/// Probe every candidate model and print which ones load.
pub async fn guided_check(config: &Config) -> anyhow::Result<()> {
    let Some(analyst) = build_analyst(config.clone())? else {
        return Ok(());
    };

    let green = Style::new().for_stderr().green();
    let red = Style::new().for_stderr().red();

    let pb = spinner("Checking models...");
    let report = analyst.check_models().await;
    pb.finish_and_clear();

    eprintln!();
    for (name, outcome) in &report {
        match outcome {
            Ok(()) => eprintln!("  {} {name}", green.apply_to("✓")),
            Err(reason) => eprintln!("  {} {name}  {reason}", red.apply_to("✗")),
        }
    }
    eprintln!();

    Ok(())
}

/// Ask for a chart path; tilde is expanded. `None` on cancel or empty input.
fn prompt_image_path() -> anyhow::Result<Option<PathBuf>> {
    let theme = sundae_theme();
    let input = handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Chart image path")
            .allow_empty(true)
            .interact_text(),
    )?;
    Ok(input.and_then(|raw| expand_path(&raw)))
}

fn expand_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(shellexpand::tilde(trimmed).into_owned()))
}

/// Let the user choose the preferred model. `None` on cancel.
fn select_model(config: &Config) -> anyhow::Result<Option<String>> {
    let theme = sundae_theme();
    let candidates = config.model.candidates();

    let mut items: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i == 0 {
                format!("{name} (preferred)")
            } else {
                name.clone()
            }
        })
        .collect();
    items.push("Custom model name...".to_string());

    let choice = Select::with_theme(&theme)
        .with_prompt("Gemini model")
        .items(&items)
        .default(0)
        .interact_opt()?;

    match choice {
        Some(i) if i < candidates.len() => Ok(Some(candidates[i].clone())),
        Some(_) => {
            let Some(name) = handle_interrupt(
                Input::<String>::with_theme(&theme)
                    .with_prompt("Model name")
                    .interact_text(),
            )?
            else {
                return Ok(None);
            };
            let name = name.trim();
            Ok((!name.is_empty()).then(|| name.to_string()))
        }
        None => Ok(None),
    }
}

/// Make `model` the preferred model, keeping the other candidates in order as fallbacks.
fn prefer_model(config: &mut Config, model: &str) {
    let fallbacks = config
        .model
        .candidates()
        .into_iter()
        .filter(|name| name != model)
        .collect();
    config.model.preferred = model.to_string();
    config.model.fallbacks = fallbacks;
}

/// Build an analyst, prompting for a key when none is configured.
///
/// Returns `None` if the user declines to enter one.
fn build_analyst(config: Config) -> anyhow::Result<Option<Analyst>> {
    match credential::resolve(&config, None) {
        Ok(found) => {
            let dim = Style::new().for_stderr().dim();
            eprintln!(
                "  {}",
                dim.apply_to(format!("Using API key from {}", found.source()))
            );
            analyst_or_report(config, Some(found.expose()))
        }
        Err(err) => {
            let Some(key) = prompt_for_key(&config, &err)? else {
                return Ok(None);
            };
            analyst_or_report(config, Some(&key))
        }
    }
}

fn analyst_or_report(config: Config, key: Option<&str>) -> anyhow::Result<Option<Analyst>> {
    match Analyst::from_config(config, key) {
        Ok(analyst) => Ok(Some(analyst)),
        Err(SundaeError::Analysis(err)) => {
            report_failure(&err);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Ask for a key after lookup failed, optionally saving it to the key file.
fn prompt_for_key(config: &Config, missing: &AnalysisError) -> anyhow::Result<Option<String>> {
    let theme = sundae_theme();
    let warn = Style::new().for_stderr().yellow();

    eprintln!("  {}", warn.apply_to(missing.to_string()));

    let key = match Password::with_theme(&theme)
        .with_prompt("Enter your Gemini API key (empty to cancel)")
        .allow_empty_password(true)
        .interact()
    {
        Ok(k) if !k.trim().is_empty() => k.trim().to_string(),
        _ => return Ok(None),
    };

    let key_path = config.key_file_path();
    let save = handle_interrupt(
        Confirm::with_theme(&theme)
            .with_prompt(format!("Save this key to {}?", key_path.display()))
            .default(true)
            .interact(),
    )?;

    if save == Some(true) {
        if let Err(e) = credential::save_key_file(&key_path, &key) {
            eprintln!(
                "  {}",
                warn.apply_to(format!("Could not save key: {e}. Using it for this session only."))
            );
        } else {
            tracing::info!("API key saved to {}", key_path.display());
        }
    }

    Ok(Some(key))
}
