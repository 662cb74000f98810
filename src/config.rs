//! Tunables of the completion engine and session controller

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::completion::context::DEFAULT_WINDOW_CHARS;
use crate::completion::ranking::DEFAULT_MAX_RESULTS;

/// Completion configuration
///
/// Every field has a default, so a config file only needs the keys it changes:
///
/// ```json
/// { "debounce_ms": 200, "max_suggestions": 12 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompletionConfig {
    /// Quiet period before an edit is classified
    pub debounce_ms: u64,
    /// Delay before a focus loss closes the session
    pub blur_grace_ms: u64,
    /// Characters before the cursor scanned by the classifier
    pub window_chars: usize,
    /// Upper bound on the suggestions shown
    pub max_suggestions: usize,
    /// Shortest bare identifier that opens a session
    pub min_identifier_len: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            blur_grace_ms: 150,
            window_chars: DEFAULT_WINDOW_CHARS,
            max_suggestions: DEFAULT_MAX_RESULTS,
            min_identifier_len: 2,
        }
    }
}

impl CompletionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        serde_json::from_str(&json).with_context(|| format!("invalid config file {:?}", path))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "debounce_ms": 200, "max_suggestions": 12 }}"#).unwrap();

        let config = CompletionConfig::load(file.path()).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(200));
        assert_eq!(config.max_suggestions, 12);
        assert_eq!(config.window_chars, DEFAULT_WINDOW_CHARS);
        assert_eq!(config.min_identifier_len, 2);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "debounce": 200 }}"#).unwrap();
        assert!(CompletionConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(CompletionConfig::load(Path::new("/nonexistent/config.json")).is_err());
    }
}
