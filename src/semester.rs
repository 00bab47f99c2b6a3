use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SemesterError {
    #[error("Semester code must be exactly 4 digits, got '{0}'")]
    InvalidLength(String),
    #[error("Invalid century digit '{0}' (expected 0 or 1)")]
    InvalidCentury(char),
    #[error("Invalid term digit '{0}' (expected 1, 2, 6 or 8)")]
    InvalidTerm(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    January,
    Spring,
    Summer,
    Fall,
}

impl Term {
    fn from_digit(digit: char) -> Result<Self, SemesterError> {
        match digit {
            '1' => Ok(Term::January),
            '2' => Ok(Term::Spring),
            '6' => Ok(Term::Summer),
            '8' => Ok(Term::Fall),
            other => Err(SemesterError::InvalidTerm(other)),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Term::January => "January",
            Term::Spring => "Spring",
            Term::Summer => "Summer",
            Term::Fall => "Fall",
        };
        f.write_str(name)
    }
}

/// A 4-digit SIS semester code, e.g. `1168` for Fall 2016
///
/// Digit 1 selects the century (0 = 1900s, 1 = 2000s), digits 2-3 are the
/// two-digit year, digit 4 is the term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Semester {
    code: String,
    year: i32,
    term: Term,
}

impl Semester {
    pub fn parse(code: &str) -> Result<Self, SemesterError> {
        let code = code.trim();
        let digits: Vec<char> = code.chars().collect();
        if digits.len() != 4 || !digits.iter().all(|c| c.is_ascii_digit()) {
            return Err(SemesterError::InvalidLength(code.to_string()));
        }

        let century = match digits[0] {
            '0' => 1900,
            '1' => 2000,
            other => return Err(SemesterError::InvalidCentury(other)),
        };
        let year_in_century = code[1..3]
            .parse::<i32>()
            .map_err(|_| SemesterError::InvalidLength(code.to_string()))?;
        let term = Term::from_digit(digits[3])?;

        Ok(Self {
            code: code.to_string(),
            year: century + year_in_century,
            term,
        })
    }

    /// The raw code as sent to the remote endpoints
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn term(&self) -> Term {
        self.term
    }
}

impl FromStr for Semester {
    type Err = SemesterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Semester::parse(s)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.term, self.year)
    }
}
