//! Error rendering.
//!
//! Human mode prints a one-line header plus an optional hint on stderr;
//! JSON and Markdown modes print a structured object for machine consumers.

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::FuelError;
use crate::storage::config::{ENV_CONFIG, ENV_FILLS_FILE};

/// Render an error for the selected output format.
#[must_use]
pub fn render_error(error: &FuelError, format: OutputFormat, no_color: bool, pretty: bool) -> String {
    match format {
        OutputFormat::Json => render_error_json(error, pretty),
        OutputFormat::Md => render_error_json(error, true),
        OutputFormat::Human => render_simple(error, no_color),
    }
}

/// Render an error as structured JSON.
#[must_use]
pub fn render_error_json(error: &FuelError, pretty: bool) -> String {
    let error_json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&error_json)
    } else {
        serde_json::to_string(&error_json)
    };
    rendered.unwrap_or_else(|_| render_simple(error, true))
}

fn render_simple(error: &FuelError, no_color: bool) -> String {
    let header = format!("Error [{}]: {error}", error.code());
    let mut lines = vec![if no_color {
        header
    } else {
        header.red().bold().to_string()
    }];

    if let Some(hint) = hint(error) {
        lines.push(format!("Hint: {hint}"));
    }

    lines.join("\n")
}

fn hint(error: &FuelError) -> Option<String> {
    match error {
        FuelError::SourceNotFound { .. } => Some(format!(
            "pass --file PATH or set {ENV_FILLS_FILE} to point at your fill data"
        )),
        FuelError::SourceParse { .. } => Some(
            "the file must hold a JSON array of fills or an object with a \"fills\" array"
                .to_string(),
        ),
        FuelError::ConfigParse { .. } | FuelError::ConfigInvalid { .. } => Some(format!(
            "fix the config file or point {ENV_CONFIG} at another one"
        )),
        _ => None,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorJson {
    error_code: String,
    category: String,
    message: String,
    is_retryable: bool,
    exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &FuelError) -> Self {
        Self {
            error_code: error.code(),
            category: error.category().to_string(),
            message: error.to_string(),
            is_retryable: error.is_retryable(),
            exit_code: error.exit_code().into(),
            hint: hint(error),
        }
    }
}
