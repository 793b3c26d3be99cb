//! Loading options and configuration.

/// Options for loading DOCX templates.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to read core properties (`docProps/core.xml`)
    pub read_metadata: bool,

    /// Size limit for a single uncompressed package part in MB (0 = unlimited)
    pub part_size_limit_mb: u32,
}

impl LoadOptions {
    /// Create new load options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip unreadable secondary parts).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable reading core properties.
    pub fn with_metadata(mut self, read: bool) -> Self {
        self.read_metadata = read;
        self
    }

    /// Set the per-part size limit in MB.
    pub fn with_part_size_limit(mut self, mb: u32) -> Self {
        self.part_size_limit_mb = mb;
        self
    }

    /// Per-part limit in bytes, if any.
    pub(crate) fn part_size_limit(&self) -> Option<u64> {
        (self.part_size_limit_mb > 0).then(|| u64::from(self.part_size_limit_mb) * 1024 * 1024)
    }

    pub(crate) fn is_lenient(&self) -> bool {
        self.error_mode == ErrorMode::Lenient
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            read_metadata: true,
            part_size_limit_mb: 0,
        }
    }
}

/// Error handling mode while loading secondary parts.
///
/// The main document part must always be readable; the mode only decides
/// what happens when a header, footer or core-properties part is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Log and skip broken secondary parts
    Lenient,
}
