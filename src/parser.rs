//! Free-form score text parser.

use crate::error::GradeError;

/// Converts pasted score text into a sequence of rounded integer scores.
///
/// Any run of whitespace or commas separates tokens. Tokens that do not
/// parse as a finite number are silently dropped, as are tokens whose
/// ceiling is negative (a score is a non-negative integer). Every surviving
/// value is rounded *up* to the nearest integer, in favor of the student.
///
/// # Errors
///
/// Returns [`GradeError::NoScores`] if no tokens survive.
pub fn parse_scores(raw: &str) -> Result<Vec<u32>, GradeError> {
    let scores: Vec<u32> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.ceil())
        .filter(|v| *v >= 0.0)
        .map(|v| v as u32)
        .collect();

    if scores.is_empty() {
        return Err(GradeError::NoScores);
    }
    Ok(scores)
}
