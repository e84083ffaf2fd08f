//! Rendering analysis text for the console or a file.
//!
//! The text is never altered. Sectioning looks for the persona's label
//! markers at the start of a line and is purely cosmetic: concatenating the
//! section bodies always gives back the original text.

use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::prompt::NO_SIGNAL_REPLY;
use crate::types::AnalysisResult;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The reply verbatim
    Text,
    /// The reply with a heading before each labelled section
    Sections,
    /// One JSON object with the reply, metadata and sections
    Json,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Some(Self::Text),
            "sections" => Some(Self::Sections),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Known section labels, matched after leading whitespace.
const LABELS: &[(&str, &str)] = &[
    ("🔥 SUNDAE", "Signal"),
    ("📍 Entry", "Entry"),
    ("🛑 Stop Loss", "Stop Loss"),
    ("🎯 Take Profit", "Take Profit"),
    ("📊 Risk-Reward", "Risk-Reward"),
    ("✅ Confidence Level", "Confidence Level"),
    ("🔍 Reason / Analysis", "Reason / Analysis"),
    ("⏰ Estimated Move Duration", "Estimated Move Duration"),
    ("📈 Scenario if TP", "Scenario if TP"),
    ("📉 Scenario if SL", "Scenario if SL"),
    ("⚠️ Execution Notes", "Execution Notes"),
    // Some replies drop the variation selector on the warning sign
    ("⚠ Execution Notes", "Execution Notes"),
];

/// A run of lines opened by a label (or the unlabelled preamble).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Display label, `None` for text before the first label
    pub label: Option<&'static str>,
    /// The lines of this section exactly as received
    pub body: String,
}

fn label_of(line: &str) -> Option<&'static str> {
    let line = line.trim_start();
    LABELS
        .iter()
        .find(|(marker, _)| line.starts_with(marker))
        .map(|(_, label)| *label)
}

/// Split text into labelled sections without losing a byte.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    for line in text.split_inclusive('\n') {
        match label_of(line) {
            Some(label) => sections.push(Section {
                label: Some(label),
                body: line.to_string(),
            }),
            None => match sections.last_mut() {
                Some(current) => current.body.push_str(line),
                None => sections.push(Section {
                    label: None,
                    body: line.to_string(),
                }),
            },
        }
    }

    sections
}

/// Body of the first section with `label`, without the label line's marker.
pub fn section_value<'a>(sections: &'a [Section], label: &str) -> Option<&'a str> {
    let section = sections.iter().find(|s| s.label == Some(label))?;
    let body = section.body.trim();
    Some(body.split_once(':').map(|(_, v)| v.trim()).unwrap_or(body))
}

/// Whether the model declined to give a signal.
pub fn is_no_signal(text: &str) -> bool {
    text.trim()
        .trim_matches('"')
        .starts_with(NO_SIGNAL_REPLY.trim_end_matches('.'))
}

#[derive(Serialize)]
struct JsonReport<'a> {
    model: &'a str,
    image: &'a str,
    latency_ms: u64,
    no_signal: bool,
    text: &'a str,
    sections: Vec<Section>,
}

const RULE_WIDTH: usize = 60;

/// Writes an analysis in the chosen format.
pub struct Presenter<W: Write> {
    writer: W,
    format: OutputFormat,
    banner: bool,
}

impl<W: Write> Presenter<W> {
    /// Create a new presenter.
    ///
    /// * `banner` - frame `Text` output with a header naming the model
    pub fn new(writer: W, format: OutputFormat, banner: bool) -> Self {
        Self {
            writer,
            format,
            banner,
        }
    }

    /// Render one analysis.
    pub fn render(&mut self, result: &AnalysisResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                let rule = "=".repeat(RULE_WIDTH);
                if self.banner {
                    writeln!(self.writer, "{rule}")?;
                    writeln!(
                        self.writer,
                        "🔥 SUNDAE CRYPTO FUTURES ANALYSIS ({}):",
                        result.model
                    )?;
                    writeln!(self.writer, "{rule}")?;
                }
                self.writer.write_all(result.text.as_bytes())?;
                if self.banner {
                    if !result.text.ends_with('\n') {
                        writeln!(self.writer)?;
                    }
                    writeln!(self.writer, "{rule}")?;
                }
            }
            OutputFormat::Sections => {
                for section in split_sections(&result.text) {
                    let heading = section.label.unwrap_or("Summary");
                    let fill = RULE_WIDTH.saturating_sub(heading.chars().count() + 4);
                    writeln!(self.writer, "── {heading} {}", "─".repeat(fill))?;
                    self.writer.write_all(section.body.as_bytes())?;
                    if !section.body.ends_with('\n') {
                        writeln!(self.writer)?;
                    }
                }
            }
            OutputFormat::Json => {
                let report = JsonReport {
                    model: &result.model,
                    image: &result.image_name,
                    latency_ms: result.latency_ms,
                    no_signal: is_no_signal(&result.text),
                    text: &result.text,
                    sections: split_sections(&result.text),
                };
                serde_json::to_writer_pretty(&mut self.writer, &report)
                    .map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the presenter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Default file name for a saved analysis of `image_name`.
pub fn default_save_name(image_name: &str) -> String {
    format!("analysis_result_{image_name}.txt")
}

/// Write the raw reply text to `path`, unchanged.
pub fn save_text(result: &AnalysisResult, path: &Path) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, result.text.as_bytes())?;
    Ok(path.to_path_buf())
}
