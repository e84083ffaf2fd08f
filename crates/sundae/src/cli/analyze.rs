//! The `sundae analyze` command.

use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use sundae_core::presenter::{self, OutputFormat as CoreOutputFormat};
use sundae_core::{Analyst, Config, ImagePayload, Presenter};

/// Supported render formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// The reply as received
    Text,
    /// The reply split under a heading per signal field
    Sections,
    /// JSON object with reply, model and sections
    Json,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => CoreOutputFormat::Text,
            OutputFormat::Sections => CoreOutputFormat::Sections,
            OutputFormat::Json => CoreOutputFormat::Json,
        }
    }
}

/// Arguments for the `analyze` command.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Chart image to analyse (png, jpg, jpeg, gif, bmp, webp)
    #[arg(required = true)]
    pub image: PathBuf,

    /// Preferred Gemini model
    #[arg(short, long, env = "GEMINI_MODEL")]
    pub model: Option<String>,

    /// Fallback model, tried in the order given (replaces the configured list)
    #[arg(long = "fallback", value_name = "MODEL")]
    pub fallbacks: Vec<String>,

    /// Gemini API key (takes precedence over env, .env and key file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Custom instruction instead of the SUNDAE analyst persona
    #[arg(long)]
    pub prompt: Option<String>,

    /// Render format (defaults to the config's output.format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the rendered analysis to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also save the raw reply as analysis_result_<image>.txt
    #[arg(long)]
    pub save: bool,

    /// Print the reply without the surrounding banner
    #[arg(long)]
    pub no_banner: bool,
}

/// Fold command-line overrides into the loaded configuration.
fn apply_overrides(mut config: Config, args: &AnalyzeArgs) -> Config {
    if let Some(model) = args.model.as_deref().filter(|m| !m.trim().is_empty()) {
        config.model.preferred = model.trim().to_string();
    }
    if !args.fallbacks.is_empty() {
        config.model.fallbacks = args.fallbacks.clone();
    }
    if let Some(prompt) = &args.prompt {
        config.analysis.instruction = prompt.clone();
    }
    if args.no_banner {
        config.output.banner = false;
    }
    config
}

pub(crate) fn spinner(message: &str) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args);
    let format = args
        .format
        .map(CoreOutputFormat::from)
        .or_else(|| CoreOutputFormat::parse(&config.output.format))
        .unwrap_or(CoreOutputFormat::Text);
    let banner = config.output.banner;

    let analyst =
        Analyst::from_config(config, args.api_key.as_deref()).map_err(super::into_anyhow)?;
    let image = ImagePayload::from_path(&args.image, &analyst.config().input)?;
    if let Some(advisory) = analyst.size_advisory(&image) {
        super::report_advisory(image.name(), &advisory);
    }

    let pb = spinner("Analyzing chart with Gemini...");
    let outcome = match analyst.resolve_model().await {
        Ok(model) => analyst.analyze_with(&model, &image).await,
        Err(err) => Err(err),
    };
    pb.finish_and_clear();
    let result = outcome?;

    tracing::info!(
        "Analysis of {} by {} in {}ms",
        result.image_name,
        result.model,
        result.latency_ms
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            let mut out = Presenter::new(BufWriter::new(file), format, banner);
            out.render(&result)?;
            out.flush()?;
            eprintln!("Analysis written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = Presenter::new(stdout.lock(), format, banner);
            out.render(&result)?;
            out.flush()?;
        }
    }

    if args.save {
        let path = PathBuf::from(presenter::default_save_name(&result.image_name));
        presenter::save_text(&result, &path)?;
        eprintln!("Raw reply saved to {}", path.display());
    }

    if presenter::is_no_signal(&result.text) {
        tracing::info!("No trade setup found on this chart");
    }

    std::io::stderr().flush()?;
    Ok(())
}
