//! Aggregate job counters and the derived percentage.

/// Aggregate counters reported by the status endpoint.
///
/// `processed <= total` is expected but not enforced; the server is
/// trusted as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobProgress {
    pub processed: u64,
    pub total: u64,
    pub captioned: u64,
    pub errors: u64,
}

impl JobProgress {
    /// `processed / total * 100`, or `0.0` for an empty job.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.processed as f64 / self.total as f64 * 100.0
    }

    /// Percentage clamped to `0..=100` for drawing a bar.
    pub fn bar_percent(&self) -> f64 {
        self.percent().clamp(0.0, 100.0)
    }

    /// Whether polling should stop after this report.
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }

    /// `"<processed> of <total> files processed"`.
    pub fn summary(&self) -> String {
        format!("{} of {} files processed", self.processed, self.total)
    }

    /// `"<captioned> captioned, <errors> errors"`.
    pub fn outcome(&self) -> String {
        format!("{} captioned, {} errors", self.captioned, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(processed: u64, total: u64) -> JobProgress {
        JobProgress {
            processed,
            total,
            ..Default::default()
        }
    }

    #[test]
    fn zero_total_is_zero_percent() {
        let p = progress(0, 0);
        assert_eq!(p.percent(), 0.0);
        assert!(!p.percent().is_nan());
    }

    #[test]
    fn zero_total_with_processed_files_is_still_zero() {
        assert_eq!(progress(4, 0).percent(), 0.0);
    }

    #[test]
    fn half_done() {
        assert_eq!(progress(1, 2).percent(), 50.0);
    }

    #[test]
    fn overshoot_is_clamped_for_the_bar_only() {
        let p = progress(3, 2);
        assert_eq!(p.percent(), 150.0);
        assert_eq!(p.bar_percent(), 100.0);
    }

    #[test]
    fn completion_uses_greater_or_equal() {
        assert!(!progress(1, 2).is_complete());
        assert!(progress(2, 2).is_complete());
        assert!(progress(3, 2).is_complete());
        assert!(progress(0, 0).is_complete());
    }

    #[test]
    fn text_lines() {
        let p = JobProgress {
            processed: 2,
            total: 2,
            captioned: 1,
            errors: 1,
        };
        assert_eq!(p.summary(), "2 of 2 files processed");
        assert_eq!(p.outcome(), "1 captioned, 1 errors");
    }
}
