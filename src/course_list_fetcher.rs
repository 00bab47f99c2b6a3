use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, instrument, warn};

use crate::fetch_error::FetchError;
use crate::fetcher::{get_text, FetchSettings};
use crate::semester::Semester;
use crate::utils;

/// Scrapes department group listing pages for course and section numbers
#[derive(Clone)]
pub struct CourseListFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
    base_url: String,
}

impl CourseListFetcher {
    pub fn new(base_url: impl Into<String>, settings: FetchSettings) -> Result<Self, FetchError> {
        Ok(Self {
            client: settings.client()?,
            settings,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn listing_url(&self, semester: &Semester, group: &str, printable: bool) -> String {
        let mut url = format!(
            "{}/page.php?Semester={}&Type=Group&Group={}",
            self.base_url,
            semester.code(),
            group
        );
        if printable {
            url.push_str("&Print=");
        }
        url
    }

    #[instrument(skip(self, semester), fields(semester = %semester.code()))]
    pub async fn list_course_ids(
        &self,
        semester: &Semester,
        group: &str,
    ) -> Result<Vec<String>, FetchError> {
        let url = self.listing_url(semester, group, true);
        let html = get_text(&self.client, &self.settings, &url).await?;
        let ids = parse_course_ids(&html);
        debug!("Found {} course ids", ids.len());
        Ok(ids)
    }

    #[instrument(skip(self, semester), fields(semester = %semester.code()))]
    pub async fn list_lecture_section_ids(
        &self,
        semester: &Semester,
        group: &str,
        course_title: &str,
    ) -> Result<Vec<String>, FetchError> {
        let url = self.listing_url(semester, group, false);
        let html = get_text(&self.client, &self.settings, &url).await?;
        parse_lecture_sections(&html, course_title)
    }
}

fn link_selector() -> Selector {
    Selector::parse(".Link").unwrap()
}

/// Course ids of every enrollment-graph link with a non-trivial enrollment
///
/// Links whose label reports 0 or 1 enrolled (`0 / 30`, `1 / 30`) are
/// cancelled or placeholder sections and are dropped.
pub fn parse_course_ids(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = link_selector();

    let mut ids: Vec<String> = Vec::new();
    let mut skipped = 0;

    for link in document.select(&selector) {
        let Some(onclick) = link.value().attr("onclick") else {
            continue;
        };
        if !onclick.contains("EnrollmentGraph") {
            continue;
        }

        let label = link.text().collect::<String>();
        if is_trivial_capacity(&label) {
            debug!("Skipping trivial section label '{}'", label.trim());
            skipped += 1;
            continue;
        }

        match utils::extract_course_id(onclick) {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {}
            None => {
                warn!("Enrollment link without a course id: {}", onclick);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!("Skipped {} enrollment links", skipped);
    }

    ids
}

/// True when the enrolled count in front of the `/` is 0 or 1
fn is_trivial_capacity(label: &str) -> bool {
    let Some((enrolled, _)) = label.split_once('/') else {
        return false;
    };

    matches!(
        enrolled.split_whitespace().last().map(str::parse::<u32>),
        Some(Ok(0 | 1))
    )
}

/// Lecture section numbers of the course titled `course_title`
///
/// The title's parent element carries the subject code and number in its
/// `onclick`, e.g. `ToggleCourse('CS2150')`. Their concatenation is the CSS
/// class shared by every section row of that course.
pub fn parse_lecture_sections(html: &str, course_title: &str) -> Result<Vec<String>, FetchError> {
    let document = Html::parse_document(html);

    let title_parent = document
        .root_element()
        .descendants()
        .find(|node| match node.value() {
            Node::Text(text) => text.trim() == course_title,
            _ => false,
        })
        .and_then(|node| node.parent())
        .and_then(ElementRef::wrap)
        .ok_or_else(|| FetchError::NotFound(format!("course title '{course_title}'")))?;

    let onclick = title_parent.value().attr("onclick").ok_or_else(|| {
        FetchError::NotFound(format!("onclick metadata for '{course_title}'"))
    })?;

    let course_key = course_key(onclick).ok_or_else(|| {
        FetchError::NotFound(format!(
            "subject code and number in '{onclick}' for '{course_title}'"
        ))
    })?;
    debug!("Course '{}' has key {}", course_title, course_key);

    let section_selector = Selector::parse(&format!(".{course_key}"))
        .map_err(|_| FetchError::DataFormat(format!("invalid course key '{course_key}'")))?;
    let link = link_selector();

    let sections = document
        .select(&section_selector)
        .filter(|section| section.text().any(|t| t.trim() == "Lecture"))
        .filter_map(|section| section.select(&link).next())
        .map(|link| link.text().collect::<String>().trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    Ok(sections)
}

fn course_key(onclick: &str) -> Option<String> {
    let subject = Regex::new(r"[A-Z]{2,}").ok()?;
    let number = Regex::new(r"\d+").ok()?;

    let subject = subject.find(onclick)?.as_str();
    let number = number.find(onclick)?.as_str();
    Some(format!("{subject}{number}"))
}
