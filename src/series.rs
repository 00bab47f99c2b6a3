use chrono::{DateTime, Utc};

use crate::fetch_error::FetchError;

const MILLIS_PER_DAY: f64 = 1000.0 * 60.0 * 60.0 * 24.0;

/// One sample of an enrollment or waitlist curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub count: u32,
}

impl SeriesPoint {
    pub fn from_millis(millis: i64, count: u32) -> Result<Self, FetchError> {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            FetchError::DataFormat(format!("timestamp {millis} is out of range"))
        })?;
        Ok(Self { timestamp, count })
    }
}

/// Enrollment and waitlist curves of one course, sampled at the same instants
#[derive(Debug, Clone, PartialEq)]
pub struct CourseSeries {
    pub course_id: String,
    enrollment: Vec<SeriesPoint>,
    waitlist: Vec<SeriesPoint>,
}

impl CourseSeries {
    /// Builds a series after checking both curves are co-indexed
    pub fn new(
        course_id: impl Into<String>,
        enrollment: Vec<SeriesPoint>,
        waitlist: Vec<SeriesPoint>,
    ) -> Result<Self, FetchError> {
        let course_id = course_id.into();

        if enrollment.len() != waitlist.len() {
            return Err(FetchError::DataFormat(format!(
                "course {course_id}: enrollment has {} points but waitlist has {}",
                enrollment.len(),
                waitlist.len()
            )));
        }

        if let Some(idx) = enrollment
            .iter()
            .zip(&waitlist)
            .position(|(e, w)| e.timestamp != w.timestamp)
        {
            return Err(FetchError::DataFormat(format!(
                "course {course_id}: enrollment and waitlist timestamps differ at point {idx}"
            )));
        }

        Ok(Self {
            course_id,
            enrollment,
            waitlist,
        })
    }

    pub fn enrollment(&self) -> &[SeriesPoint] {
        &self.enrollment
    }

    pub fn waitlist(&self) -> &[SeriesPoint] {
        &self.waitlist
    }

    pub fn len(&self) -> usize {
        self.enrollment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enrollment.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.enrollment.first().map(|p| p.timestamp)
    }

    /// Rows relative to `origin`, which becomes day zero
    pub fn derive_rows(&self, origin: DateTime<Utc>) -> Vec<DerivedRow> {
        self.enrollment
            .iter()
            .zip(&self.waitlist)
            .map(|(e, w)| DerivedRow {
                elapsed_days: (e.timestamp - origin).num_milliseconds() as f64 / MILLIS_PER_DAY,
                enrollment: e.count,
                waitlist: w.count,
                interest: e.count.saturating_add(w.count),
            })
            .collect()
    }
}

/// One sheet row of a course column set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRow {
    pub elapsed_days: f64,
    pub enrollment: u32,
    pub waitlist: u32,
    pub interest: u32,
}

impl DerivedRow {
    pub fn new(elapsed_days: f64, enrollment: u32, waitlist: u32) -> Self {
        Self {
            elapsed_days,
            enrollment,
            waitlist,
            interest: enrollment.saturating_add(waitlist),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    fn points(samples: &[(i64, u32)]) -> Vec<SeriesPoint> {
        samples
            .iter()
            .map(|&(ms, count)| SeriesPoint::from_millis(ms, count).unwrap())
            .collect()
    }

    #[test]
    fn test_new_accepts_co_indexed_series() {
        let series = CourseSeries::new(
            "15423",
            points(&[(0, 10), (DAY_MS, 12)]),
            points(&[(0, 0), (DAY_MS, 3)]),
        );
        assert!(series.is_ok());
        assert_eq!(series.unwrap().len(), 2);
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let result = CourseSeries::new(
            "15423",
            points(&[(0, 10), (DAY_MS, 12)]),
            points(&[(0, 0)]),
        );
        assert!(matches!(result, Err(FetchError::DataFormat(_))));
    }

    #[test]
    fn test_new_rejects_timestamp_mismatch() {
        let result = CourseSeries::new(
            "15423",
            points(&[(0, 10), (DAY_MS, 12)]),
            points(&[(0, 0), (2 * DAY_MS, 1)]),
        );
        match result {
            Err(FetchError::DataFormat(msg)) => assert!(msg.contains("point 1")),
            other => panic!("Expected DataFormat error, got {other:?}"),
        }
    }

    #[test]
    fn test_derive_rows_uses_origin_and_sums_interest() {
        let origin_ms = 1_470_000_000_000;
        let series = CourseSeries::new(
            "15423",
            points(&[(origin_ms + DAY_MS, 10), (origin_ms + DAY_MS * 3 / 2, 15)]),
            points(&[(origin_ms + DAY_MS, 2), (origin_ms + DAY_MS * 3 / 2, 4)]),
        )
        .unwrap();

        let origin = DateTime::<Utc>::from_timestamp_millis(origin_ms).unwrap();
        let rows = series.derive_rows(origin);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], DerivedRow::new(1.0, 10, 2));
        assert_eq!(rows[1].elapsed_days, 1.5);
        assert_eq!(rows[1].interest, 19);
    }

    #[test]
    fn test_from_millis_out_of_range() {
        assert!(matches!(
            SeriesPoint::from_millis(i64::MAX, 1),
            Err(FetchError::DataFormat(_))
        ));
    }
}
