use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::fetch_error::FetchError;
use crate::semester::Semester;
use crate::series::{CourseSeries, SeriesPoint};

/// HTTP behaviour shared by the listing and series fetchers
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub max_retries: usize,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            min_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl FetchSettings {
    pub(crate) fn client(&self) -> Result<reqwest::Client, FetchError> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }

    pub(crate) fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_backoff)
            .with_max_delay(self.max_backoff)
            .with_factor(2.0)
            .with_max_times(self.max_retries)
            .with_jitter()
    }
}

/// GET `url` and return the body, retrying transient failures
pub(crate) async fn get_text(
    client: &reqwest::Client,
    settings: &FetchSettings,
    url: &str,
) -> Result<String, FetchError> {
    (|| get_text_once(client, url))
        .retry(settings.backoff())
        .when(FetchError::is_transient)
        .notify(|err: &FetchError, delay: Duration| {
            warn!("Request to {} failed ({}), retrying in {:?}", url, err, delay);
        })
        .await
}

async fn get_text_once(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    debug!("Sending HTTP request");
    let response = client.get(url).send().await?;
    let status = response.status();
    debug!("Received HTTP response with status: {}", status);

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let text = response.text().await?;
    debug!("Retrieved content, size: {} bytes", text.len());
    Ok(text)
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    enrollment: Vec<(i64, u32)>,
    waitlist: Vec<(i64, u32)>,
}

/// Fetches the enrollment/waitlist history of single courses
#[derive(Clone)]
pub struct EnrollmentFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
    base_url: String,
}

impl EnrollmentFetcher {
    pub fn new(base_url: impl Into<String>, settings: FetchSettings) -> Result<Self, FetchError> {
        Ok(Self {
            client: settings.client()?,
            settings,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn series_url(&self, semester: &Semester, course_id: &str) -> String {
        format!(
            "{}/enrollmentData.php?Semester={}&ClassNumber={}",
            self.base_url,
            semester.code(),
            course_id
        )
    }

    #[instrument(skip(self, semester), fields(semester = %semester.code()))]
    pub async fn fetch_series(
        &self,
        semester: &Semester,
        course_id: &str,
    ) -> Result<CourseSeries, FetchError> {
        let url = self.series_url(semester, course_id);
        let body = get_text(&self.client, &self.settings, &url).await?;
        let series = parse_series(course_id, &body)?;
        debug!("Parsed {} samples", series.len());
        Ok(series)
    }
}

/// Decode a data endpoint response into a validated course series
pub fn parse_series(course_id: &str, body: &str) -> Result<CourseSeries, FetchError> {
    let raw: RawSeries = serde_json::from_str(body)
        .map_err(|e| FetchError::DataFormat(format!("course {course_id}: {e}")))?;

    let to_points = |samples: Vec<(i64, u32)>| {
        samples
            .into_iter()
            .map(|(millis, count)| SeriesPoint::from_millis(millis, count))
            .collect::<Result<Vec<_>, _>>()
    };

    CourseSeries::new(course_id, to_points(raw.enrollment)?, to_points(raw.waitlist)?)
}
