//! Curve statistics
//!
//! Each course curve (enrollment, waitlist, interest over elapsed days) is
//! reduced to the sum of its time-normalized step magnitudes: for every pair of
//! consecutive samples, `|Δvalue| / Δdays`. Courses whose numbers churn score
//! higher than courses with flat curves, independent of the sampling interval.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use tracing::{debug, warn};

use crate::report::GroupSheet;
use crate::series::DerivedRow;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurveStats {
    pub enrollment: f64,
    pub waitlist: f64,
    pub interest: f64,
}

impl CurveStats {
    pub fn new(enrollment: f64, waitlist: f64, interest: f64) -> Self {
        Self {
            enrollment,
            waitlist,
            interest,
        }
    }
}

impl Add for CurveStats {
    type Output = CurveStats;

    fn add(self, rhs: CurveStats) -> CurveStats {
        CurveStats {
            enrollment: self.enrollment + rhs.enrollment,
            waitlist: self.waitlist + rhs.waitlist,
            interest: self.interest + rhs.interest,
        }
    }
}

impl AddAssign for CurveStats {
    fn add_assign(&mut self, rhs: CurveStats) {
        *self = *self + rhs;
    }
}

impl Sum for CurveStats {
    fn sum<I: Iterator<Item = CurveStats>>(iter: I) -> Self {
        iter.fold(CurveStats::default(), Add::add)
    }
}

/// One line of the "Stats" sheet
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub group: String,
    pub totals: CurveStats,
}

/// Sum of `|Δvalue| / Δdays` over consecutive rows, per value column
///
/// Pairs whose elapsed-days do not increase are skipped. Repeated timestamps
/// are expected; going back in time means the samples are out of order.
pub fn curve_area(rows: &[DerivedRow]) -> CurveStats {
    let mut stats = CurveStats::default();
    let mut skipped = 0;

    for pair in rows.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let dt = next.elapsed_days - prev.elapsed_days;

        if dt < 0.0 {
            warn!(
                "Out-of-order samples: day {:.3} follows day {:.3}, pair skipped",
                next.elapsed_days, prev.elapsed_days
            );
            continue;
        }
        if dt == 0.0 {
            skipped += 1;
            continue;
        }

        stats.enrollment += step(prev.enrollment, next.enrollment) / dt;
        stats.waitlist += step(prev.waitlist, next.waitlist) / dt;
        stats.interest += step(prev.interest, next.interest) / dt;
    }

    if skipped > 0 {
        debug!(
            "Skipped {} sample pairs with repeated elapsed days out of {}",
            skipped,
            rows.len().saturating_sub(1)
        );
    }

    stats
}

fn step(from: u32, to: u32) -> f64 {
    (f64::from(to) - f64::from(from)).abs()
}

/// Statistics of one course column set, or `None` if the sheet has no such set
pub fn column_set_area(sheet: &GroupSheet, column_set: usize) -> Option<CurveStats> {
    sheet.block(column_set).map(|block| curve_area(&block.rows))
}

/// Element-wise sum of every column set's statistics
pub fn sheet_totals(sheet: &GroupSheet) -> CurveStats {
    sheet
        .blocks()
        .iter()
        .map(|block| curve_area(&block.rows))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CourseBlock;

    fn rows(days: &[f64], enrollment: &[u32], waitlist: &[u32]) -> Vec<DerivedRow> {
        days.iter()
            .zip(enrollment)
            .zip(waitlist)
            .map(|((&d, &e), &w)| DerivedRow::new(d, e, w))
            .collect()
    }

    #[test]
    fn test_curve_area_unit_spacing() {
        let stats = curve_area(&rows(&[0.0, 1.0, 2.0], &[10, 15, 12], &[0, 0, 0]));
        assert_eq!(stats.enrollment, 8.0);
        assert_eq!(stats.waitlist, 0.0);
        assert_eq!(stats.interest, 8.0);
    }

    #[test]
    fn test_curve_area_is_time_normalized() {
        let stats = curve_area(&rows(&[0.0, 2.0, 4.0], &[10, 15, 12], &[0, 0, 0]));
        assert_eq!(stats.enrollment, 4.0);
    }

    #[test]
    fn test_curve_area_interest_combines_both_curves() {
        // Enrollment rises as the waitlist drains: interest stays flat
        let stats = curve_area(&rows(&[0.0, 1.0], &[10, 13], &[5, 2]));
        assert_eq!(stats.enrollment, 3.0);
        assert_eq!(stats.waitlist, 3.0);
        assert_eq!(stats.interest, 0.0);
    }

    #[test]
    fn test_curve_area_skips_zero_time_delta() {
        let stats = curve_area(&rows(&[0.0, 1.0, 1.0, 2.0], &[10, 12, 40, 41], &[0, 0, 0, 0]));
        // 10->12 over 1 day, 12->40 skipped, 40->41 over 1 day
        assert_eq!(stats.enrollment, 3.0);
    }

    #[test]
    fn test_curve_area_skips_out_of_order_samples() {
        let stats = curve_area(&rows(&[0.0, 2.0, 1.0, 3.0], &[10, 14, 20, 22], &[0, 0, 0, 0]));
        // 10->14 over 2 days, 14->20 goes back in time, 20->22 over 2 days
        assert_eq!(stats.enrollment, 3.0);
        assert_eq!(stats.interest, 3.0);
    }

    #[test]
    fn test_curve_area_short_inputs() {
        assert_eq!(curve_area(&[]), CurveStats::default());
        assert_eq!(
            curve_area(&rows(&[0.0], &[10], &[1])),
            CurveStats::default()
        );
    }

    #[test]
    fn test_sheet_totals_empty_sheet() {
        let sheet = GroupSheet::from_blocks("Empty", Vec::new());
        assert_eq!(sheet_totals(&sheet), CurveStats::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_sheet_totals_sums_column_sets() {
        let sheet = GroupSheet::from_blocks(
            "CompSci",
            vec![
                CourseBlock {
                    course_id: "10001".to_string(),
                    rows: rows(&[0.0, 1.0, 2.0], &[10, 15, 12], &[0, 2, 1]),
                },
                CourseBlock {
                    course_id: "10002".to_string(),
                    rows: rows(&[0.0, 2.0, 4.0], &[20, 30, 30], &[4, 0, 0]),
                },
            ],
        );

        let first = column_set_area(&sheet, 0).unwrap();
        let second = column_set_area(&sheet, 1).unwrap();
        assert_eq!(first, CurveStats::new(8.0, 3.0, 11.0));
        assert_eq!(second, CurveStats::new(5.0, 2.0, 3.0));
        assert_eq!(sheet_totals(&sheet), first + second);
        assert_eq!(column_set_area(&sheet, 2), None);
    }

    #[test]
    fn test_curve_stats_add_assign() {
        let mut total = CurveStats::new(1.0, 2.0, 3.0);
        total += CurveStats::new(0.5, 0.5, 0.5);
        assert_eq!(total, CurveStats::new(1.5, 2.5, 3.5));
    }
}
