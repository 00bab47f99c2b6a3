use clap::Parser;

use enrollment_report::config::DEFAULT_BASE_URL;
use enrollment_report::course_list_fetcher::CourseListFetcher;
use enrollment_report::fetcher::FetchSettings;
use enrollment_report::semester::Semester;

#[derive(Parser)]
#[command(name = "list-sections")]
#[command(about = "List course ids of a department group, or lecture sections of one course", long_about = None)]
struct Cli {
    /// Department group (e.g. "CompSci")
    group: String,

    /// Course title; when given, only its lecture section ids are listed
    #[arg(long)]
    title: Option<String>,

    /// 4-digit semester code
    #[arg(long, env = "SEMESTER", default_value = "1168")]
    semester: Semester,

    /// Base URL of the listing endpoint
    #[arg(long, env = "ENROLLMENT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let fetcher = CourseListFetcher::new(cli.base_url, FetchSettings::default())?;

    let (heading, ids) = match &cli.title {
        Some(title) => (
            format!("Lecture sections of '{title}'"),
            fetcher
                .list_lecture_section_ids(&cli.semester, &cli.group, title)
                .await?,
        ),
        None => (
            format!("Courses in {}", cli.group),
            fetcher.list_course_ids(&cli.semester, &cli.group).await?,
        ),
    };

    println!("{heading} ({}):", cli.semester);
    for id in &ids {
        println!("  {id}");
    }
    println!("\nTotal: {}", ids.len());

    Ok(())
}
