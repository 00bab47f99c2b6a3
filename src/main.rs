use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, instrument, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use enrollment_report::config::{parse_group_list, Config, GroupPreset};
use enrollment_report::runner::ReportRunner;
use enrollment_report::semester::Semester;

#[derive(Parser)]
#[command(name = "enrollment-report")]
#[command(about = "Build an enrollment/waitlist workbook with per-group interest statistics", long_about = None)]
struct Cli {
    /// 4-digit semester code (e.g. 1168 for Fall 2016)
    #[arg(long)]
    semester: Option<Semester>,

    /// Comma separated department groups (e.g. "CompSci,Physics")
    #[arg(long, conflicts_with = "preset")]
    groups: Option<String>,

    /// Named group list
    #[arg(long, value_enum)]
    preset: Option<GroupPreset>,

    /// Output workbook path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base URL of the listing and data endpoints
    #[arg(long)]
    base_url: Option<String>,

    /// Concurrent series requests per group
    #[arg(long)]
    parallel: Option<usize>,
}

impl Cli {
    /// `--groups` or `--preset`, whichever was given
    fn group_override(&self) -> Option<Vec<String>> {
        match (&self.groups, self.preset) {
            (Some(list), _) => Some(parse_group_list(list)),
            (None, Some(preset)) => Some(preset.groups()),
            (None, None) => None,
        }
    }

    fn apply(self, config: &mut Config) {
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(parallel) = self.parallel {
            config.fetch_concurrency = parallel;
        }
    }
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,enrollment_report=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    // Flags replace their environment counterparts before anything is validated
    let mut config = Config::load(cli.semester.clone(), cli.group_override())?;
    cli.apply(&mut config);
    config.validate()?;
    info!(
        "Building {} report for {} groups -> {}",
        config.semester,
        config.groups.len(),
        config.output_path.display()
    );

    let pb = ProgressBar::new(config.groups.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} groups ({msg})")?
            .progress_chars("##-"),
    );

    let runner = ReportRunner::new(config)?;
    let outcome = runner.generate(&pb).await?;
    pb.finish_with_message(format!(
        "{} groups written, {} failed",
        outcome.groups.len(),
        outcome.failures.len()
    ));

    for (group, e) in &outcome.failures {
        warn!("Group {} was left out: {}", group, e);
    }
    for report in &outcome.groups {
        for (course_id, e) in &report.skipped_courses {
            warn!("{}: course {} was left out: {}", report.sheet.name(), course_id, e);
        }
    }

    println!("\nInterest statistics ({})", runner.config().semester);
    println!(
        "{:<16} {:>12} {:>12} {:>12}",
        "Group", "Enrollment", "Waitlist", "Interest"
    );
    for summary in outcome.summaries() {
        println!(
            "{:<16} {:>12.2} {:>12.2} {:>12.2}",
            summary.group,
            summary.totals.enrollment,
            summary.totals.waitlist,
            summary.totals.interest
        );
    }
    println!("\nWorkbook saved to {}", runner.config().output_path.display());

    Ok(())
}
