//! Output formatting functions.

pub mod json;
pub mod pretty;

use eventdesk_core::view::{ErrorBlock, SectionContent};

use crate::cli::OutputFormat;

/// Format a value for output.
pub fn format_output<T: serde::Serialize>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_json(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Format a view section. Loaded data goes through `pretty` in pretty mode;
/// an error section is returned as the error, even when it carries stale data.
pub fn format_section<T: serde::Serialize>(
    content: SectionContent<T>,
    format: OutputFormat,
    pretty: impl FnOnce(&T) -> String,
) -> Result<String, ErrorBlock> {
    match content {
        SectionContent::Loaded(data) => Ok(match format {
            OutputFormat::Json => format_output(&data, format),
            OutputFormat::Pretty => pretty(&data),
        }),
        SectionContent::Prompt(prompt) => Ok(prompt),
        SectionContent::Loading => Ok(pretty::LOADING.to_string()),
        SectionContent::Error { error, .. } => Err(error),
    }
}
