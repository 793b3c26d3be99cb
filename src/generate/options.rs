//! Fill options and configuration.

use crate::package::{ErrorMode, LoadOptions};
use crate::placeholder::MissingValuePolicy;

/// Options for filling templates.
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// What to do with placeholders that have no value
    pub on_missing: MissingValuePolicy,

    /// Whether batch generation renders recipients in parallel
    pub parallel: bool,

    /// How the template package is loaded
    pub load: LoadOptions,
}

impl FillOptions {
    /// Create new fill options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the missing-value policy.
    pub fn on_missing(mut self, policy: MissingValuePolicy) -> Self {
        self.on_missing = policy;
        self
    }

    /// Fail on the first placeholder without a value.
    pub fn strict_values(mut self) -> Self {
        self.on_missing = MissingValuePolicy::Error;
        self
    }

    /// Enable or disable parallel batch rendering.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel batch rendering.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the template load options.
    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    /// Skip unreadable header, footer and core-properties parts.
    pub fn lenient(mut self) -> Self {
        self.load.error_mode = ErrorMode::Lenient;
        self
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            on_missing: MissingValuePolicy::Keep,
            parallel: true,
            load: LoadOptions::default(),
        }
    }
}
