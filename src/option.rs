/// Default cap on rows read from the backend before a scan is refused.
pub const DEFAULT_SCAN_THRESHOLD: u64 = 10_000_000;

/// Default lower bound of the partial-result cut-off.
pub const DEFAULT_PARTIAL_RESULT_FLOOR: u64 = 10_000;

/// Per-query scan configuration.
///
/// Built with consuming setters starting from [`ScanOptions::default`]:
///
/// ```
/// use cubescan::ScanOptions;
///
/// let options = ScanOptions::default().limit(100).offset(20);
/// assert_eq!(options.limit_value(), Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub(crate) limit: Option<u64>,
    pub(crate) offset: u64,
    pub(crate) limit_enabled: bool,
    pub(crate) threshold: u64,
    pub(crate) accept_partial_result: bool,
    pub(crate) partial_result_floor: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            limit: None,
            offset: 0,
            limit_enabled: true,
            threshold: DEFAULT_SCAN_THRESHOLD,
            accept_partial_result: false,
            partial_result_floor: DEFAULT_PARTIAL_RESULT_FLOOR,
        }
    }
}

impl ScanOptions {
    /// Maximum number of rows the caller wants.
    pub fn limit(self, limit: u64) -> Self {
        ScanOptions {
            limit: Some(limit),
            ..self
        }
    }

    /// Rows the caller skips before the first one it keeps.
    pub fn offset(self, offset: u64) -> Self {
        ScanOptions { offset, ..self }
    }

    /// Whether the limit may stop the scan early.
    ///
    /// Disabled when rows are post-processed (for example aggregated) after
    /// the scan, so cutting the stream would change the answer.
    pub fn limit_enabled(self, limit_enabled: bool) -> Self {
        ScanOptions {
            limit_enabled,
            ..self
        }
    }

    /// Hard cap on rows read; reaching it fails the scan.
    pub fn threshold(self, threshold: u64) -> Self {
        ScanOptions { threshold, ..self }
    }

    /// Whether the scan may stop early and report a truncated result.
    pub fn accept_partial_result(self, accept_partial_result: bool) -> Self {
        ScanOptions {
            accept_partial_result,
            ..self
        }
    }

    /// Lower bound of the partial-result cut-off.
    pub fn partial_result_floor(self, partial_result_floor: u64) -> Self {
        ScanOptions {
            partial_result_floor,
            ..self
        }
    }

    /// Configured limit, if any.
    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    /// Configured offset.
    pub fn offset_value(&self) -> u64 {
        self.offset
    }

    /// Configured threshold.
    pub fn threshold_value(&self) -> u64 {
        self.threshold
    }
}
