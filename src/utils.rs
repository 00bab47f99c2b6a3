/// Shared utility functions for the enrollment report
///
/// Convert a zero-based column index to a spreadsheet column label
///
/// Labels use bijective base-26: there is no zero digit, so after "Z" comes
/// "AA" rather than "BA".
///
/// # Examples
///
/// ```
/// use enrollment_report::utils::column_label;
///
/// assert_eq!(column_label(0), "A");
/// assert_eq!(column_label(25), "Z");
/// assert_eq!(column_label(26), "AA");
/// assert_eq!(column_label(701), "ZZ");
/// ```
pub fn column_label(index: usize) -> String {
    let mut remaining = index + 1;
    let mut letters = Vec::new();

    while remaining > 0 {
        // Digit values run 1..=26; a remainder of 0 borrows from the next place
        let digit = match remaining % 26 {
            0 => 26,
            d => d,
        };
        letters.push(b'A' + (digit - 1) as u8);
        remaining = (remaining - digit) / 26;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Inverse of [`column_label`]. Returns `None` for empty or non `A-Z` input.
///
/// ```
/// use enrollment_report::utils::column_index;
///
/// assert_eq!(column_index("A"), Some(0));
/// assert_eq!(column_index("AB"), Some(27));
/// assert_eq!(column_index("a1"), None);
/// ```
pub fn column_index(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }

    let mut value: usize = 0;
    for c in label.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        let digit = (c as u8 - b'A') as usize + 1;
        value = value.checked_mul(26)?.checked_add(digit)?;
    }

    Some(value - 1)
}

/// Absolute A1-style reference (e.g. `$B$2`) for a zero-based row and column.
pub fn cell_ref(row: u32, col: u16) -> String {
    format!("${}${}", column_label(col as usize), row + 1)
}

/// Extract the 5-digit course (class) number from listing link metadata
///
/// Listing links carry the number inside an `onclick` handler such as
/// `EnrollmentGraph('1168','15423')`. The first run of exactly five digits wins.
///
/// ```
/// use enrollment_report::utils::extract_course_id;
///
/// assert_eq!(extract_course_id("EnrollmentGraph('1168','15423')"), Some("15423".to_string()));
/// assert_eq!(extract_course_id("EnrollmentGraph('1168')"), None);
/// ```
pub fn extract_course_id(value: &str) -> Option<String> {
    let mut run = String::new();

    for c in value.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_digit() {
            run.push(c);
            continue;
        }
        if run.len() == 5 {
            return Some(run);
        }
        run.clear();
    }

    None
}
