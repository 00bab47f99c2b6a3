use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::fetcher::FetchSettings;
use crate::report::STATS_SHEET_NAME;
use crate::semester::{Semester, SemesterError};

pub const DEFAULT_BASE_URL: &str = "http://rabi.phys.virginia.edu/mySIS/CS2";

pub const ENGINEERING_GROUPS: &[&str] = &[
    "APMA", "BME", "CHE", "CEE", "CompSci", "ENGR", "ECE", "MSE", "MAE", "STS", "SYS",
];

/// Sheet names are limited to 31 characters
const MAX_SHEET_NAME_CHARS: usize = 31;
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

pub const COLLEGE_GROUPS: &[&str] = &[
    "Anthropology", "Art", "Astronomy", "Biology", "Chemistry", "Classics", "Drama", "EALC",
    "Economics", "English", "EnviSci", "French", "German", "History", "Mathematics", "MDST",
    "MESA", "Music", "Philosophy", "Physics", "Politics", "PHS", "Psychology", "ReliStu",
    "Slavic", "Sociology", "SPAN", "Statistics",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid SEMESTER: {0}")]
    Semester(#[from] SemesterError),
    #[error("Unknown group preset '{0}' (expected college, engineering or all)")]
    UnknownPreset(String),
    #[error("No department groups configured")]
    NoGroups,
    #[error("Group '{0}' is listed more than once")]
    DuplicateGroup(String),
    #[error("Group '{0}' collides with the summary sheet name")]
    ReservedGroupName(String),
    #[error("Group '{name}' cannot be used as a sheet name: {reason}")]
    InvalidGroupName { name: String, reason: &'static str },
    #[error("REQUEST_TIMEOUT_SECS must be greater than zero")]
    ZeroTimeout,
}

/// Named department group lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GroupPreset {
    College,
    Engineering,
    All,
}

impl GroupPreset {
    pub fn groups(self) -> Vec<String> {
        let names: Vec<&str> = match self {
            GroupPreset::College => COLLEGE_GROUPS.to_vec(),
            GroupPreset::Engineering => ENGINEERING_GROUPS.to_vec(),
            GroupPreset::All => [ENGINEERING_GROUPS, COLLEGE_GROUPS].concat(),
        };
        names.into_iter().map(String::from).collect()
    }
}

impl FromStr for GroupPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "college" => Ok(GroupPreset::College),
            "engineering" => Ok(GroupPreset::Engineering),
            "all" => Ok(GroupPreset::All),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub semester: Semester,
    pub groups: Vec<String>,
    pub output_path: PathBuf,
    pub request_timeout_secs: u64,
    pub max_retries: usize,
    pub fetch_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::load(None, None)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the environment without validating; `semester` and `groups`
    /// replace `SEMESTER` and `GROUPS`/`GROUP_PRESET` when given
    pub fn load(
        semester: Option<Semester>,
        groups: Option<Vec<String>>,
    ) -> Result<Self, ConfigError> {
        let groups = match groups {
            Some(groups) => groups,
            None => match env::var("GROUPS") {
                Ok(list) => parse_group_list(&list),
                Err(_) => env::var("GROUP_PRESET")
                    .unwrap_or_else(|_| "college".to_string())
                    .parse::<GroupPreset>()?
                    .groups(),
            },
        };

        let semester = match semester {
            Some(semester) => semester,
            None => env::var("SEMESTER")
                .unwrap_or_else(|_| "1168".to_string())
                .parse()?,
        };

        Ok(Config {
            base_url: env::var("ENROLLMENT_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            semester,
            groups,
            output_path: env::var("OUTPUT_PATH")
                .unwrap_or_else(|_| "out.xlsx".to_string())
                .into(),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|secs| secs.parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(30),
            max_retries: env::var("MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            fetch_concurrency: env::var("FETCH_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
        })
    }

    /// Checked before any request: every group must become a distinct sheet
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.groups.is_empty() {
            return Err(ConfigError::NoGroups);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let mut seen: Vec<String> = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            validate_sheet_name(group)?;

            // Sheet names compare case-insensitively
            let folded = group.to_lowercase();
            if folded == STATS_SHEET_NAME.to_lowercase() {
                return Err(ConfigError::ReservedGroupName(group.clone()));
            }
            if seen.contains(&folded) {
                return Err(ConfigError::DuplicateGroup(group.clone()));
            }
            seen.push(folded);
        }

        Ok(())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_retries: self.max_retries,
            ..FetchSettings::default()
        }
    }
}

fn validate_sheet_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidGroupName {
        name: name.to_string(),
        reason,
    };

    if name.chars().count() > MAX_SHEET_NAME_CHARS {
        return Err(invalid("longer than 31 characters"));
    }
    if name.contains(FORBIDDEN_SHEET_CHARS) {
        return Err(invalid("contains one of []:*?/\\"));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(invalid("starts or ends with an apostrophe"));
    }
    Ok(())
}

/// Split a comma separated group list, dropping blanks
pub fn parse_group_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(String::from)
        .collect()
}
