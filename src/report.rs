//! Workbook output: one sheet per department group plus the "Stats" summary

pub mod chart;
pub mod sheet;

use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::{debug, info, instrument};

use crate::config::ConfigError;
use crate::stats::GroupSummary;

// Re-export commonly used items
pub use chart::{scatter_chart, series_ranges, SeriesRanges};
pub use sheet::{write_group_sheet, CourseBlock, GroupSheet, COLUMNS_PER_COURSE};

pub const STATS_SHEET_NAME: &str = "Stats";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to build workbook: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("Failed to write workbook: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid report configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("No department group could be processed")]
    NoGroups,
}

/// Summary sheet: a header row, then one row per processed group
pub fn write_stats_sheet(summaries: &[GroupSummary]) -> Result<Worksheet, XlsxError> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(STATS_SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, title) in ["Group", "Enrollment", "Waitlist", "Interest"]
        .iter()
        .enumerate()
    {
        worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (idx, summary) in summaries.iter().enumerate() {
        let row = idx as u32 + 1;
        worksheet.write_string(row, 0, &summary.group)?;
        worksheet.write_number(row, 1, summary.totals.enrollment)?;
        worksheet.write_number(row, 2, summary.totals.waitlist)?;
        worksheet.write_number(row, 3, summary.totals.interest)?;
    }

    worksheet.set_column_width(0, 16)?;
    Ok(worksheet)
}

/// Assemble and persist the workbook: "Stats" first, then group sheets in order
///
/// The workbook is rendered in memory first, so a rejected workbook leaves
/// whatever was at `path` untouched.
#[instrument(skip(stats, group_sheets), fields(sheets = group_sheets.len() + 1))]
pub fn save_workbook(
    stats: Worksheet,
    group_sheets: Vec<Worksheet>,
    path: &Path,
) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(stats);
    for worksheet in group_sheets {
        workbook.push_worksheet(worksheet);
    }

    let bytes = workbook.save_to_buffer()?;
    debug!("Writing {} bytes to {}", bytes.len(), path.display());
    fs::write(path, bytes)?;
    info!("Workbook saved to {}", path.display());
    Ok(())
}
