//! Inclusive date-window filtering for time-series candidates
//!
//! Scan-result candidate sets carry an ISO 8601 timestamp next to each key.
//! The filter narrows such a set before pagination, after authorization
//! filtering has already happened upstream.

use async_graphql::InputObject;
use chrono::{DateTime, NaiveDate};
use tracing::warn;

use crate::context::RequestScope;
use crate::i18n::MessageKey;
use crate::{ConnectionError, Result};

/// A time-series candidate: entity key plus its scan timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCandidate {
    pub key: String,
    pub timestamp: String,
}

impl ScanCandidate {
    pub fn new(key: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Optional inclusive timestamp window.
///
/// Bounds are ISO 8601 date or date-time strings.
#[derive(InputObject, Debug, Clone, Default)]
pub struct DateRangeFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeFilter {
    /// Check that both bounds parse as ISO 8601 dates or date-times.
    pub fn validate(&self, loader: &str, scope: &RequestScope) -> Result<()> {
        for (argument, bound) in [("startDate", &self.start_date), ("endDate", &self.end_date)] {
            if let Some(value) = bound {
                if !is_iso_date(value) {
                    warn!(
                        request_id = %scope.request_id,
                        loader,
                        argument,
                        rule = "invalid-date",
                        "date filter rejected"
                    );
                    return Err(ConnectionError::Validation(
                        scope.message(&MessageKey::InvalidDate { argument }),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }

    /// Whether `timestamp` falls inside the window, inclusive on both ends.
    ///
    /// Comparison is lexical, which is valid because all scan timestamps
    /// share the fixed-width ISO 8601 format. A date-only start bound sorts
    /// before every timestamp of the same day, so a record at midnight of
    /// `startDate` is included.
    pub fn contains(&self, timestamp: &str) -> bool {
        if let Some(start) = &self.start_date {
            if timestamp < start.as_str() {
                return false;
            }
        }
        if let Some(end) = &self.end_date {
            if timestamp > end.as_str() {
                return false;
            }
        }
        true
    }

    /// Order-preserving retain of the candidates inside the window.
    pub fn apply(&self, candidates: Vec<ScanCandidate>) -> Vec<ScanCandidate> {
        if self.is_empty() {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|candidate| self.contains(&candidate.timestamp))
            .collect()
    }
}

fn is_iso_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;

    fn candidates() -> Vec<ScanCandidate> {
        vec![
            ScanCandidate::new("scan-1", "2020-10-01T23:59:59Z"),
            ScanCandidate::new("scan-2", "2020-10-02T00:00:00Z"),
            ScanCandidate::new("scan-3", "2020-10-02T12:43:39Z"),
            ScanCandidate::new("scan-4", "2020-10-03T12:43:39Z"),
        ]
    }

    #[test]
    fn test_start_date_is_inclusive_at_midnight() {
        let filter = DateRangeFilter {
            start_date: Some("2020-10-02".to_string()),
            end_date: None,
        };
        let kept = filter.apply(candidates());
        assert_eq!(
            kept.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
            vec!["scan-2", "scan-3", "scan-4"]
        );
    }

    #[test]
    fn test_date_time_bounds_are_inclusive() {
        let filter = DateRangeFilter {
            start_date: Some("2020-10-02T00:00:00Z".to_string()),
            end_date: Some("2020-10-02T12:43:39Z".to_string()),
        };
        let kept = filter.apply(candidates());
        assert_eq!(
            kept.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
            vec!["scan-2", "scan-3"]
        );
    }

    #[test]
    fn test_open_bounds_keep_everything_in_order() {
        let filter = DateRangeFilter::default();
        assert_eq!(filter.apply(candidates()), candidates());
    }

    #[test]
    fn test_end_date_excludes_later_records() {
        let filter = DateRangeFilter {
            start_date: None,
            end_date: Some("2020-10-02T23:59:59Z".to_string()),
        };
        let kept = filter.apply(candidates());
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|c| c.key != "scan-4"));
    }

    #[test]
    fn test_validate_accepts_dates_and_date_times() {
        let scope = RequestScope::new(Locale::English);
        let filter = DateRangeFilter {
            start_date: Some("2020-10-02".to_string()),
            end_date: Some("2020-10-03T12:43:39Z".to_string()),
        };
        assert!(filter.validate("load_dkim_results_by_domain", &scope).is_ok());
    }

    #[test]
    fn test_validate_rejects_garbage_bounds() {
        let scope = RequestScope::new(Locale::English);
        let filter = DateRangeFilter {
            start_date: Some("last tuesday".to_string()),
            end_date: None,
        };
        let err = filter
            .validate("load_dkim_results_by_domain", &scope)
            .unwrap_err();
        match err {
            ConnectionError::Validation(message) => {
                assert_eq!(
                    message,
                    "`startDate` must be a valid ISO 8601 date or date-time string."
                );
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }
}
