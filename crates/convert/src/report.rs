//! Conversion results, warnings and quality scoring.

use prpm_canonical::{Format, SectionKind};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConvertError;

/// Score every render starts from.
pub const MAX_QUALITY: u8 = 100;

/// Deduction applied once when any warning reports dropped content.
pub const LOSSY_PENALTY: u8 = 10;

/// Why a render lost or degraded something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning")]
pub enum ConversionWarning {
    /// The target cannot express this section kind.
    UnsupportedSection { section: String, target: Format },
    /// A custom block written for another editor.
    ForeignCustom { editor: Format, target: Format },
    /// A section discriminant this renderer does not know.
    UnknownSection { kind: String },
    /// The output exceeds a size limit the target enforces.
    SizeLimit { target: Format, limit: usize, actual: usize },
    /// A required field was missing and a default was substituted.
    DefaultApplied { field: String, value: String },
    /// A contained rendering error.
    Failed { message: String },
}

impl ConversionWarning {
    /// Human-readable warning line, as surfaced in [`ConversionResult::warnings`].
    pub fn description(&self) -> String {
        match self {
            Self::UnsupportedSection { section, target } => {
                format!("{section} section skipped: not supported by {target}")
            }
            Self::ForeignCustom { editor, target } => {
                format!("Custom {editor} section skipped: not supported by {target}")
            }
            Self::UnknownSection { kind } => format!("Unknown section type: {kind}"),
            Self::SizeLimit {
                target,
                limit,
                actual,
            } => format!(
                "Content is {actual} characters, over the {limit} character limit for {target}"
            ),
            Self::DefaultApplied { field, value } => {
                format!("{field} not provided, defaulting to {value}")
            }
            Self::Failed { message } => format!("Conversion error: {message}"),
        }
    }
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Whether a warning line reports dropped content.
pub fn is_lossy_warning(warning: &str) -> bool {
    warning.contains("not supported") || warning.contains("skipped")
}

/// Outcome of rendering a canonical package into one format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub content: String,
    pub format: Format,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub lossy_conversion: bool,
    pub quality_score: u8,
}

impl ConversionResult {
    /// A perfect, warning-free result.
    pub fn clean(format: Format, content: String) -> Self {
        Self {
            content,
            format,
            warnings: Vec::new(),
            lossy_conversion: false,
            quality_score: MAX_QUALITY,
        }
    }

    /// The degraded result returned when rendering fails.
    pub fn failed(format: Format, error: &ConvertError) -> Self {
        Self {
            content: String::new(),
            format,
            warnings: vec![ConversionWarning::Failed {
                message: error.to_string(),
            }
            .description()],
            lossy_conversion: true,
            quality_score: 0,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Accumulates warnings and deductions while a renderer runs.
#[derive(Debug, Clone)]
pub struct RenderReport {
    format: Format,
    warnings: Vec<ConversionWarning>,
    deductions: Vec<(u8, &'static str)>,
}

impl RenderReport {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            warnings: Vec::new(),
            deductions: Vec::new(),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn warn(&mut self, warning: ConversionWarning) {
        self.warnings.push(warning);
    }

    /// Records that a section kind was dropped for this target.
    pub fn skip_section(&mut self, kind: SectionKind) {
        tracing::debug!(section = kind.as_str(), target = %self.format, "Skipping section");
        self.warn(ConversionWarning::UnsupportedSection {
            section: kind.label().to_string(),
            target: self.format,
        });
    }

    /// Subtracts `points` from the final score for a missing optional part.
    pub fn deduct(&mut self, points: u8, reason: &'static str) {
        self.deductions.push((points, reason));
    }

    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    pub fn deductions(&self) -> &[(u8, &'static str)] {
        &self.deductions
    }

    /// Scores the rendered content and produces the final result.
    pub fn finish(self, content: String) -> ConversionResult {
        let warnings: Vec<String> = self.warnings.iter().map(|w| w.description()).collect();
        let lossy_conversion = warnings.iter().any(|w| is_lossy_warning(w));

        let mut score = i32::from(MAX_QUALITY);
        if lossy_conversion {
            score -= i32::from(LOSSY_PENALTY);
        }
        for (points, _) in &self.deductions {
            score -= i32::from(*points);
        }

        ConversionResult {
            content,
            format: self.format,
            warnings,
            lossy_conversion,
            quality_score: score.clamp(0, i32::from(MAX_QUALITY)) as u8,
        }
    }
}
