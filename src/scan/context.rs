use crate::option::ScanOptions;

/// Per-query scan state.
///
/// Created once per query; the iterator bumps the scanned counter and may
/// raise the partial-result flag, and the caller reads both afterwards.
#[derive(Debug, Clone)]
pub struct ScanContext {
    options: ScanOptions,
    scanned: u64,
    partial_result_returned: bool,
}

impl ScanContext {
    /// Fresh context for one query.
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            scanned: 0,
            partial_result_returned: false,
        }
    }

    /// Options the context was created from.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Requested limit.
    pub fn limit(&self) -> Option<u64> {
        self.options.limit
    }

    /// Requested offset.
    pub fn offset(&self) -> u64 {
        self.options.offset
    }

    /// Whether the limit may stop the scan.
    pub fn is_limit_enabled(&self) -> bool {
        self.options.limit_enabled
    }

    /// Row cap after which the scan fails.
    pub fn threshold(&self) -> u64 {
        self.options.threshold
    }

    /// Whether a truncated result is acceptable.
    pub fn accepts_partial_result(&self) -> bool {
        self.options.accept_partial_result
    }

    /// Rows after which a scan accepting partial results stops:
    /// the larger of the limit and the configured floor.
    pub fn partial_result_limit(&self) -> u64 {
        self.options
            .limit
            .unwrap_or(0)
            .max(self.options.partial_result_floor)
    }

    /// Rows emitted so far.
    pub fn scanned(&self) -> u64 {
        self.scanned
    }

    /// Whether the result was cut short by the partial-result policy.
    pub fn partial_result_returned(&self) -> bool {
        self.partial_result_returned
    }

    /// Whether enough rows were emitted to satisfy `limit + offset`.
    pub(crate) fn limit_reached(&self) -> bool {
        match self.options.limit {
            Some(limit) if self.options.limit_enabled => {
                self.scanned >= limit.saturating_add(self.options.offset)
            }
            _ => false,
        }
    }

    pub(crate) fn partial_result_reached(&self) -> bool {
        self.options.accept_partial_result && self.scanned > self.partial_result_limit()
    }

    pub(crate) fn threshold_reached(&self) -> bool {
        self.scanned >= self.options.threshold
    }

    pub(crate) fn record_row(&mut self) {
        self.scanned += 1;
    }

    pub(crate) fn set_partial_result_returned(&mut self) {
        self.partial_result_returned = true;
    }
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new(ScanOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_counts_offset() {
        let mut ctx = ScanContext::new(ScanOptions::default().limit(2).offset(1));
        for _ in 0..2 {
            ctx.record_row();
            assert!(!ctx.limit_reached());
        }
        ctx.record_row();
        assert!(ctx.limit_reached());
        assert_eq!(ctx.scanned(), 3);
    }

    #[test]
    fn disabled_limit_never_stops() {
        let mut ctx = ScanContext::new(ScanOptions::default().limit(0).limit_enabled(false));
        ctx.record_row();
        assert!(!ctx.limit_reached());
        assert!(!ScanContext::default().limit_reached());
    }

    #[test]
    fn partial_limit_uses_floor() {
        let ctx = ScanContext::new(ScanOptions::default().limit(20));
        assert_eq!(ctx.partial_result_limit(), 10_000);
        let ctx = ScanContext::new(ScanOptions::default().limit(50).partial_result_floor(10));
        assert_eq!(ctx.partial_result_limit(), 50);
        let ctx = ScanContext::new(ScanOptions::default().partial_result_floor(10));
        assert_eq!(ctx.partial_result_limit(), 10);
    }

    #[test]
    fn partial_gate_requires_acceptance() {
        let mut ctx = ScanContext::new(ScanOptions::default().partial_result_floor(1));
        ctx.record_row();
        ctx.record_row();
        assert!(!ctx.partial_result_reached());

        let mut ctx = ScanContext::new(
            ScanOptions::default()
                .partial_result_floor(1)
                .accept_partial_result(true),
        );
        ctx.record_row();
        assert!(!ctx.partial_result_reached());
        ctx.record_row();
        assert!(ctx.partial_result_reached());
        assert!(!ctx.partial_result_returned());
    }

    #[test]
    fn exposes_its_options() {
        let ctx = ScanContext::new(
            ScanOptions::default()
                .limit(5)
                .limit_enabled(false)
                .accept_partial_result(true),
        );
        assert_eq!(ctx.options().limit_value(), Some(5));
        assert_eq!(ctx.limit(), Some(5));
        assert!(!ctx.is_limit_enabled());
        assert!(ctx.accepts_partial_result());

        let ctx = ScanContext::default();
        assert!(ctx.is_limit_enabled());
        assert!(!ctx.accepts_partial_result());
        assert_eq!(ctx.options().threshold_value(), ctx.threshold());
    }
}
