// ABOUTME: Utility functions for the smart-slides application
// ABOUTME: Provides helpers for validation, path handling, and text shaping

use crate::errors::{Result, SlideError};
use log::warn;
use std::path::Path;

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(SlideError::FileReadError)?;
    } else if !path.is_dir() {
        return Err(SlideError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Validate write permissions for a directory
pub fn validate_directory_writable(path: &Path) -> Result<()> {
    // First ensure it exists
    ensure_directory_exists(path)?;

    // Try to create a temporary file to test write permissions
    let test_file = path.join(format!("test_write_{}.tmp", uuid::Uuid::new_v4()));
    match std::fs::File::create(&test_file) {
        Ok(_) => {
            // Clean up the test file
            if let Err(e) = std::fs::remove_file(&test_file) {
                warn!("Failed to clean up test file {:?}: {}", test_file, e);
            }
            Ok(())
        }
        Err(e) => Err(SlideError::ValidationError(format!(
            "Directory is not writable: {:?} - {}",
            path, e
        ))),
    }
}

/// Sanitize a topic string for use in an output filename.
/// Everything outside `[A-Za-z0-9 _-]` is stripped, then spaces become
/// underscores.
pub fn sanitize_topic(topic: &str) -> String {
    topic
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// First sentence of a body text, by naive period split. A body without any
/// period comes back whole. Abbreviations and decimals are not handled; the
/// split is intentionally literal.
pub fn first_sentence(body: &str) -> String {
    let first = body.split('.').next().unwrap_or(body).trim();
    if first.is_empty() {
        body.trim().to_string()
    } else {
        first.to_string()
    }
}

/// Split a body into up to `max` sentence-like segments by naive period
/// split, dropping empty segments.
pub fn split_sentences(body: &str, max: usize) -> Vec<String> {
    body.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(max)
        .map(String::from)
        .collect()
}

/// Truncate a label to a character budget, appending an ellipsis marker when
/// anything was cut.
pub fn truncate_label(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let kept: String = text.chars().take(budget.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Escape text for inclusion in XML content or attributes.
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
