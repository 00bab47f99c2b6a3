use rust_xlsxwriter::{Chart, ChartType, ColNum, RowNum};

use crate::report::sheet::{physical_column, GroupSheet};
use crate::utils::cell_ref;

const HEADER_ROW: RowNum = 0;
const FIRST_DATA_ROW: RowNum = 1;

/// Worksheet ranges behind one chart series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRanges {
    /// Header column holding the series name
    pub name_col: ColNum,
    pub categories: String,
    pub values: String,
}

/// Ranges of every course that has data, in column set order
///
/// x is the elapsed-days column of each column set, y the column at `y_offset`
/// within the same set.
pub fn series_ranges(sheet: &GroupSheet, y_offset: usize) -> Vec<SeriesRanges> {
    let sheet_ref = quote_sheet_name(sheet.name());

    sheet
        .blocks()
        .iter()
        .enumerate()
        .filter(|(_, block)| !block.rows.is_empty())
        .map(|(column_set, block)| {
            let x_col = physical_column(column_set, 0);
            let y_col = physical_column(column_set, y_offset);
            let last_row = block.rows.len() as RowNum;
            let range = |col| {
                format!(
                    "{sheet_ref}!{}:{}",
                    cell_ref(FIRST_DATA_ROW, col),
                    cell_ref(last_row, col)
                )
            };

            SeriesRanges {
                name_col: y_col,
                categories: range(x_col),
                values: range(y_col),
            }
        })
        .collect()
}

/// Scatter chart with one series per course that has data, named by its header cell
pub fn scatter_chart(sheet: &GroupSheet, y_offset: usize, title: &str) -> Chart {
    let mut chart = Chart::new(ChartType::ScatterStraightWithMarkers);
    chart.set_style(2);
    chart.title().set_name(title);
    chart.x_axis().set_name("Days since enrollment start");
    chart.y_axis().set_name("Total people");

    for ranges in series_ranges(sheet, y_offset) {
        chart
            .add_series()
            .set_name((sheet.name(), HEADER_ROW, ranges.name_col))
            .set_categories(ranges.categories.as_str())
            .set_values(ranges.values.as_str());
    }

    chart
}

/// Sheet names with anything but letters, digits or `_` need quoting in ranges
fn quote_sheet_name(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}
