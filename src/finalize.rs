//! Finalization: per-score letter grades and the submission payload.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::GradeError;
use crate::ledger::{GradeBand, Ledger};

/// Sentinel written to the CSV for a score below every enabled cut-off.
pub const NOT_FOUND: &str = "NOT_FOUND";

/// One score paired with its assigned band label, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeAssignment {
    pub score: u32,
    pub label: Option<&'static str>,
}

/// Assigns each score the first enabled band whose cut-off it meets.
///
/// Bands run highest tier first, so the first match is the best grade the
/// score qualifies for. A score below every enabled cut-off gets `None`.
pub fn assign_grades(ledger: &Ledger) -> Vec<GradeAssignment> {
    ledger
        .scores()
        .iter()
        .map(|&score| GradeAssignment {
            score,
            label: ledger
                .bands()
                .iter()
                .filter(|b| b.enabled)
                .find(|b| score >= b.cut_off)
                .map(|b| b.label),
        })
        .collect()
}

/// Renders assignments as the two-column `Marks,Grade` CSV. Unassigned
/// scores get the [`NOT_FOUND`] sentinel.
pub fn grades_csv(assignments: &[GradeAssignment]) -> Result<String> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(["Marks", "Grade"])?;
        for a in assignments {
            writer.write_record([a.score.to_string(), a.label.unwrap_or(NOT_FOUND).to_string()])?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8(buf)?)
}

/// The flat record POSTed to the grade-collection endpoint.
#[derive(Debug, Serialize)]
pub struct Submission {
    pub csv: String,
    pub mgpa: Option<f64>,
    pub mgpa_course: Option<String>,
    pub average: u32,
    pub total_students: usize,
    pub cut_offs: Vec<GradeBand>,
    pub course_mgpa: Vec<(String, f64)>,
    pub max_score: u32,
    pub save_n_submit: bool,
    pub generated_at: DateTime<Utc>,
}

/// Builds the finalization payload for `ledger`.
///
/// # Errors
///
/// Returns [`GradeError::IncompleteGrading`] when any score falls below
/// every enabled cut-off; the caller must widen or re-enable bands before
/// submitting.
pub fn build_submission(ledger: &Ledger, save_n_submit: bool) -> Result<Submission, GradeError> {
    let assignments = assign_grades(ledger);
    let unassigned = assignments.iter().filter(|a| a.label.is_none()).count();
    if unassigned > 0 {
        return Err(GradeError::IncompleteGrading { unassigned });
    }

    // Infallible: every record is plain UTF-8 text.
    let csv = grades_csv(&assignments).unwrap_or_default();

    let (mgpa, mgpa_course) = match ledger.mgpa() {
        Some(top) => (Some(top.grade_point), Some(top.course.clone())),
        None => (None, None),
    };

    Ok(Submission {
        csv,
        mgpa,
        mgpa_course,
        average: ledger.stats().average,
        total_students: ledger.stats().num_students,
        cut_offs: ledger
            .bands()
            .iter()
            .filter(|b| b.enabled)
            .cloned()
            .collect(),
        course_mgpa: ledger.course_grade_points().to_vec(),
        max_score: ledger.max_score(),
        save_n_submit,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ledger() -> Ledger {
        Ledger::new(vec![40, 55, 70, 85, 95], 100).unwrap()
    }

    #[test]
    fn test_assign_grades_picks_first_enabled_band() {
        let ledger = sample_ledger();
        let labels: Vec<Option<&str>> = assign_grades(&ledger).iter().map(|a| a.label).collect();
        // Enabled cut-offs: A=80, B=60, C=40, D=20.
        assert_eq!(
            labels,
            vec![Some("C"), Some("C"), Some("B"), Some("A"), Some("A")]
        );
    }

    #[test]
    fn test_assign_grades_marks_unassigned() {
        let ledger = Ledger::new(vec![5, 85], 100).unwrap();
        let assignments = assign_grades(&ledger);
        assert_eq!(assignments[0].label, None); // 5 is below D's cut-off 20
        assert_eq!(assignments[1].label, Some("A"));
    }

    #[test]
    fn test_grades_csv_format() {
        let ledger = Ledger::new(vec![5, 85], 100).unwrap();
        let csv = grades_csv(&assign_grades(&ledger)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Marks,Grade");
        assert_eq!(lines[1], "5,NOT_FOUND");
        assert_eq!(lines[2], "85,A");
    }

    #[test]
    fn test_incomplete_grading_blocks_submission() {
        let ledger = Ledger::new(vec![5, 7, 85], 100).unwrap();
        let err = build_submission(&ledger, false).unwrap_err();
        assert_eq!(err, GradeError::IncompleteGrading { unassigned: 2 });
    }

    #[test]
    fn test_build_submission_payload() {
        let mut ledger = sample_ledger();
        ledger.set_courses(vec![("CS101".to_string(), 55.0)]);
        let submission = build_submission(&ledger, true).unwrap();

        assert_eq!(submission.average, 69);
        assert_eq!(submission.total_students, 5);
        assert_eq!(submission.max_score, 100);
        assert!(submission.save_n_submit);
        assert_eq!(submission.cut_offs.len(), 4); // only enabled bands
        assert!(submission.cut_offs.iter().all(|b| b.enabled));
        assert_eq!(submission.mgpa, Some(6.0));
        assert_eq!(submission.mgpa_course.as_deref(), Some("CS101"));
        assert!(submission.csv.starts_with("Marks,Grade\n"));
        assert_eq!(submission.csv.lines().count(), 6);
    }

    #[test]
    fn test_submission_without_course_data_has_null_mgpa() {
        let ledger = sample_ledger();
        let submission = build_submission(&ledger, false).unwrap();
        assert_eq!(submission.mgpa, None);
        assert_eq!(submission.mgpa_course, None);

        let json = serde_json::to_value(&submission).unwrap();
        assert!(json["mgpa"].is_null());
    }
}
