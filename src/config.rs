//! Bridge configuration.

use std::env;

/// Environment variable naming the interpreter library to preload.
pub const PYTHON_LIBRARY_ENV: &str = "STREAMPY_PYTHON_LIBRARY";

/// Environment variable holding the default log filter.
pub const LOG_ENV: &str = "STREAMPY_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Shared library to open with global symbol visibility before the
    /// interpreter starts, e.g. `libpython3.12.so`. `None` skips the step.
    pub python_library: Option<String>,
    /// `tracing` filter directive used by the CLI.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            python_library: None,
            log_filter: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(library) = lookup(PYTHON_LIBRARY_ENV).filter(|s| !s.is_empty()) {
            config.python_library = Some(library);
        }
        if let Some(filter) = lookup(LOG_ENV).filter(|s| !s.is_empty()) {
            config.log_filter = filter;
        }
        config
    }

    pub fn with_python_library(mut self, library: impl Into<String>) -> Self {
        self.python_library = Some(library.into());
        self
    }
}
