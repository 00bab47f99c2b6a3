use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::course_list_fetcher::CourseListFetcher;
use crate::fetch_error::FetchError;
use crate::fetcher::EnrollmentFetcher;
use crate::report::{self, GroupSheet, ReportError};
use crate::series::CourseSeries;
use crate::stats::{self, CurveStats, GroupSummary};

/// Result of processing one department group
#[derive(Debug)]
pub struct GroupReport {
    pub sheet: GroupSheet,
    pub totals: CurveStats,
    /// Courses listed for the group whose series could not be fetched
    pub skipped_courses: Vec<(String, FetchError)>,
}

impl GroupReport {
    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            group: self.sheet.name().to_string(),
            totals: self.totals,
        }
    }
}

/// Everything gathered in one run, in configured group order
#[derive(Debug, Default)]
pub struct ReportOutcome {
    pub groups: Vec<GroupReport>,
    pub failures: Vec<(String, FetchError)>,
}

impl ReportOutcome {
    pub fn summaries(&self) -> Vec<GroupSummary> {
        self.groups.iter().map(GroupReport::summary).collect()
    }
}

/// Drives listing, series fetches, layout and statistics for every group
pub struct ReportRunner {
    config: Config,
    course_lists: CourseListFetcher,
    series: EnrollmentFetcher,
}

impl ReportRunner {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let settings = config.fetch_settings();
        Ok(Self {
            course_lists: CourseListFetcher::new(config.base_url.clone(), settings.clone())?,
            series: EnrollmentFetcher::new(config.base_url.clone(), settings)?,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    #[instrument(skip(self))]
    pub async fn run_group(&self, group: &str) -> Result<GroupReport, FetchError> {
        let semester = &self.config.semester;
        let course_ids = self.course_lists.list_course_ids(semester, group).await?;
        info!("Group {} lists {} courses", group, course_ids.len());

        // `buffered` keeps listing order, which the sheet layout depends on
        let results: Vec<(String, Result<CourseSeries, FetchError>)> =
            stream::iter(course_ids)
                .map(|course_id| async move {
                    let result = self.series.fetch_series(semester, &course_id).await;
                    (course_id, result)
                })
                .buffered(self.config.fetch_concurrency.max(1))
                .collect()
                .await;

        let mut courses = Vec::with_capacity(results.len());
        let mut skipped_courses = Vec::new();
        for (course_id, result) in results {
            match result {
                Ok(series) => courses.push(series),
                Err(e) => {
                    warn!(group = %group, course_id = %course_id, error = %e, "Skipping course");
                    skipped_courses.push((course_id, e));
                }
            }
        }

        let sheet = GroupSheet::build(group, courses);
        let totals = stats::sheet_totals(&sheet);
        debug!(
            "Group {} totals: enrollment={:.3} waitlist={:.3} interest={:.3}",
            group, totals.enrollment, totals.waitlist, totals.interest
        );

        Ok(GroupReport {
            sheet,
            totals,
            skipped_courses,
        })
    }

    /// Process every configured group; a failing group is recorded and skipped
    #[instrument(skip(self, progress), fields(semester = %self.config.semester))]
    pub async fn run(&self, progress: &ProgressBar) -> ReportOutcome {
        let mut outcome = ReportOutcome::default();

        for group in &self.config.groups {
            progress.set_message(group.clone());

            match self.run_group(group).await {
                Ok(report) => {
                    if !report.skipped_courses.is_empty() {
                        warn!(
                            "Group {}: skipped {} of {} courses",
                            group,
                            report.skipped_courses.len(),
                            report.skipped_courses.len() + report.sheet.len()
                        );
                    }
                    outcome.groups.push(report);
                }
                Err(e) => {
                    error!("Failed to process group {}: {}", group, e);
                    outcome.failures.push((group.clone(), e));
                }
            }

            progress.inc(1);
        }

        info!(
            "Processed {} groups, {} failed",
            outcome.groups.len(),
            outcome.failures.len()
        );
        outcome
    }

    /// Run all groups and persist the workbook once, at the end
    ///
    /// Group names are checked before the first request, so a configuration
    /// that cannot become a workbook fails without fetching anything.
    pub async fn generate(&self, progress: &ProgressBar) -> Result<ReportOutcome, ReportError> {
        self.config.validate()?;
        let outcome = self.run(progress).await;

        if outcome.groups.is_empty() {
            return Err(ReportError::NoGroups);
        }

        let stats_sheet = report::write_stats_sheet(&outcome.summaries())?;
        let group_sheets = outcome
            .groups
            .iter()
            .map(|g| report::write_group_sheet(&g.sheet))
            .collect::<Result<Vec<_>, _>>()?;

        report::save_workbook(stats_sheet, group_sheets, &self.config.output_path)?;
        Ok(outcome)
    }
}
