// ABOUTME: Configuration module for the smart-slides application
// ABOUTME: Provides configuration settings and environment variable handling

use crate::errors::{Result, SlideError};
use crate::utils::{ensure_directory_exists, validate_directory_writable};
use std::env;
use std::path::PathBuf;

/// Explicit configuration for one pipeline run. Constructed once by the
/// caller and threaded through the components; there is no module-level
/// client or credential state.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub pexels_api_key: Option<String>,
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub default_slide_count: usize,
    pub default_style: String,
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            pexels_api_key: None,
            output_dir: PathBuf::from("output"),
            cache_dir: PathBuf::from("downloads/cache"),
            default_slide_count: 6,
            default_style: "dark".to_string(),
            request_timeout_ms: 20000, // 20 seconds
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let gemini_api_key = env::var("GEMINI_API_KEY").ok();
        let pexels_api_key = env::var("PEXELS_API_KEY").ok();
        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("output"));
        let cache_dir = env::var("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("downloads/cache"));
        let default_slide_count = env::var("DEFAULT_SLIDE_COUNT")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(6);
        let default_style = env::var("DEFAULT_STYLE").unwrap_or_else(|_| "dark".to_string());
        let request_timeout_ms = env::var("REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(20000);

        Self {
            gemini_api_key,
            pexels_api_key,
            output_dir,
            cache_dir,
            default_slide_count,
            default_style,
            request_timeout_ms,
        }
    }

    /// Effective slide count: an explicit CLI value wins over the
    /// configured default.
    pub fn slide_count_or_default(&self, explicit: Option<usize>) -> usize {
        explicit.unwrap_or(self.default_slide_count)
    }

    /// Effective style name: an explicit CLI value wins over the configured
    /// default.
    pub fn style_or_default(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_string)
            .unwrap_or_else(|| self.default_style.clone())
    }

    /// Validate the fatal preconditions before any slide is processed:
    /// both provider credentials present, output and cache directories usable.
    pub fn validate(&self) -> Result<()> {
        if self.gemini_api_key.as_deref().unwrap_or("").is_empty() {
            return Err(SlideError::ConfigError(
                "GEMINI_API_KEY is required but not set".to_string(),
            ));
        }
        if self.pexels_api_key.as_deref().unwrap_or("").is_empty() {
            return Err(SlideError::ConfigError(
                "PEXELS_API_KEY is required but not set".to_string(),
            ));
        }
        validate_directory_writable(&self.output_dir)?;
        ensure_directory_exists(&self.cache_dir)?;
        Ok(())
    }
}
