use rust_xlsxwriter::{ColNum, RowNum, Worksheet, XlsxError};
use tracing::{debug, instrument};

use crate::report::chart::scatter_chart;
use crate::series::{CourseSeries, DerivedRow};

/// Elapsed days, enrollment, waitlist, interest
pub const COLUMNS_PER_COURSE: usize = 4;

const CHART_ROW: RowNum = 9;
const CHARTS: [(usize, &str, ColNum); 3] = [
    (1, "Enrollment", 0),
    (2, "Waitlist", 8),
    (3, "Interest", 16),
];

/// One course column set
#[derive(Debug, Clone, PartialEq)]
pub struct CourseBlock {
    pub course_id: String,
    pub rows: Vec<DerivedRow>,
}

/// In-memory layout of one department group sheet
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSheet {
    name: String,
    blocks: Vec<CourseBlock>,
}

impl GroupSheet {
    /// Lay out courses in order; the first course with data defines day zero
    pub fn build(name: impl Into<String>, courses: Vec<CourseSeries>) -> Self {
        let origin = courses.iter().find_map(CourseSeries::first_timestamp);

        let blocks = courses
            .iter()
            .map(|course| CourseBlock {
                course_id: course.course_id.clone(),
                rows: origin
                    .map(|origin| course.derive_rows(origin))
                    .unwrap_or_default(),
            })
            .collect();

        Self::from_blocks(name, blocks)
    }

    pub fn from_blocks(name: impl Into<String>, blocks: Vec<CourseBlock>) -> Self {
        Self {
            name: name.into(),
            blocks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blocks(&self) -> &[CourseBlock] {
        &self.blocks
    }

    pub fn block(&self, column_set: usize) -> Option<&CourseBlock> {
        self.blocks.get(column_set)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// True when at least one course has a sample row
    pub fn has_rows(&self) -> bool {
        self.blocks.iter().any(|block| !block.rows.is_empty())
    }
}

/// Physical sheet column of `offset` (0..4) within a course column set
pub fn physical_column(column_set: usize, offset: usize) -> ColNum {
    (column_set * COLUMNS_PER_COURSE + offset) as ColNum
}

/// Render a group sheet into a worksheet with its three scatter charts
#[instrument(skip(sheet), fields(group = %sheet.name(), courses = sheet.len()))]
pub fn write_group_sheet(sheet: &GroupSheet) -> Result<Worksheet, XlsxError> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(sheet.name())?;

    for (column_set, block) in sheet.blocks().iter().enumerate() {
        write_course_block(&mut worksheet, column_set, block)?;
    }

    if !sheet.has_rows() {
        debug!("No sample rows, skipping charts");
        return Ok(worksheet);
    }

    for (y_offset, label, anchor_col) in CHARTS {
        let chart = scatter_chart(sheet, y_offset, &format!("{} {}", sheet.name(), label));
        worksheet.insert_chart(CHART_ROW, anchor_col, &chart)?;
    }

    Ok(worksheet)
}

fn write_course_block(
    worksheet: &mut Worksheet,
    column_set: usize,
    block: &CourseBlock,
) -> Result<(), XlsxError> {
    let id = &block.course_id;
    let col = |offset| physical_column(column_set, offset);

    worksheet.write_string(0, col(0), id)?;
    worksheet.write_string(0, col(1), format!("{id} Enrollment"))?;
    worksheet.write_string(0, col(2), format!("{id} Waitlist"))?;
    worksheet.write_string(0, col(3), format!("{id} Interest"))?;

    for (idx, row) in block.rows.iter().enumerate() {
        let sheet_row = idx as RowNum + 1;
        worksheet.write_number(sheet_row, col(0), row.elapsed_days)?;
        worksheet.write_number(sheet_row, col(1), f64::from(row.enrollment))?;
        worksheet.write_number(sheet_row, col(2), f64::from(row.waitlist))?;
        worksheet.write_number(sheet_row, col(3), f64::from(row.interest))?;
    }

    Ok(())
}
