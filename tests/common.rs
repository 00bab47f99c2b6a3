#![allow(dead_code)]

use std::path::PathBuf;

use enrollment_report::config::Config;
use enrollment_report::semester::Semester;
use mockito::{Matcher, Mock, ServerGuard};

pub const DAY_MS: i64 = 86_400_000;
pub const START_MS: i64 = 1_459_468_800_000;

/// Config pointed at a mock server, without retries
pub fn test_config(base_url: String, groups: &[&str], output_path: PathBuf) -> Config {
    Config {
        base_url,
        semester: Semester::parse("1168").unwrap(),
        groups: groups.iter().map(|g| g.to_string()).collect(),
        output_path,
        request_timeout_secs: 5,
        max_retries: 0,
        fetch_concurrency: 2,
    }
}

/// Listing page with one capacity link per `(course_id, label)`
pub fn listing_html(links: &[(&str, &str)]) -> String {
    let rows: String = links
        .iter()
        .map(|(id, label)| {
            format!(
                r#"<tr><td><a class="Link" onclick="EnrollmentGraph('1168','{id}');">{label}</a></td></tr>"#
            )
        })
        .collect();
    format!("<html><body><table>{rows}</table></body></html>")
}

/// Data endpoint body; samples are `(day offset from START_MS, enrolled, waitlisted)`
pub fn series_json(samples: &[(i64, u32, u32)]) -> String {
    let enrollment: Vec<String> = samples
        .iter()
        .map(|(day, e, _)| format!("[{}, {}]", START_MS + day * DAY_MS, e))
        .collect();
    let waitlist: Vec<String> = samples
        .iter()
        .map(|(day, _, w)| format!("[{}, {}]", START_MS + day * DAY_MS, w))
        .collect();
    format!(
        r#"{{"enrollment": [{}], "waitlist": [{}]}}"#,
        enrollment.join(", "),
        waitlist.join(", ")
    )
}

pub async fn mock_listing(server: &mut ServerGuard, group: &str, status: usize, body: &str) -> Mock {
    server
        .mock("GET", Matcher::Regex(r"^/page\.php".to_string()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("Semester".into(), "1168".into()),
            Matcher::UrlEncoded("Group".into(), group.into()),
        ]))
        .with_status(status)
        .with_header("content-type", "text/html")
        .with_body(body)
        .create_async()
        .await
}

pub async fn mock_series(server: &mut ServerGuard, course_id: &str, status: usize, body: &str) -> Mock {
    server
        .mock("GET", Matcher::Regex(r"^/enrollmentData\.php".to_string()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("Semester".into(), "1168".into()),
            Matcher::UrlEncoded("ClassNumber".into(), course_id.into()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}
