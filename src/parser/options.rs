//! Parsing options and configuration.

use crate::render::PageSelection;

/// Options for reconstructing analysed documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to reconstruct pages in parallel
    pub parallel: bool,

    /// Page selection (which pages to reconstruct)
    pub pages: PageSelection,

    /// How key/value pairs interact with tables in the same band
    pub key_value_policy: KeyValuePolicy,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages that fail to reconstruct).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set the key/value policy.
    pub fn with_key_value_policy(mut self, policy: KeyValuePolicy) -> Self {
        self.key_value_policy = policy;
        self
    }

    /// Drop key/value pairs that sit inside a table of the same band.
    pub fn exclude_table_key_values(mut self) -> Self {
        self.key_value_policy = KeyValuePolicy::ExcludeInTables;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            parallel: true,
            pages: PageSelection::All,
            key_value_policy: KeyValuePolicy::Plain,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first page error
    #[default]
    Strict,
    /// Log failing pages and leave them out
    Lenient,
}

/// Which key/value pairs a band keeps when it also holds tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyValuePolicy {
    /// Every pair whose value lies in the band
    #[default]
    Plain,
    /// Same, minus pairs whose value lies fully inside a table in the band
    ExcludeInTables,
}

impl std::str::FromStr for KeyValuePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(KeyValuePolicy::Plain),
            "exclude-in-tables" | "exclude_in_tables" => Ok(KeyValuePolicy::ExcludeInTables),
            other => Err(format!("unknown key/value policy: {other}")),
        }
    }
}
