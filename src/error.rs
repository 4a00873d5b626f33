//! Domain error taxonomy for the grading pipeline.

use thiserror::Error;

/// Every recoverable failure the grading core can report.
///
/// All variants are boundary errors: the caller corrects its input and
/// retries. A failed construction or finalization never leaves an existing
/// [`crate::ledger::Ledger`] in an inconsistent state.
#[derive(Debug, Error, PartialEq)]
pub enum GradeError {
    /// No numeric tokens survived parsing of the raw score text.
    #[error("no numeric scores found in input")]
    NoScores,

    /// The requested maximum score is below the highest observed score.
    #[error("max score ({requested}) cannot be less than the highest marks ({highest})")]
    MaxScore { requested: u32, highest: u32 },

    /// One or more scores fall below every enabled cut-off; submission is
    /// blocked until the bands are widened or re-enabled.
    #[error("{unassigned} student(s) are still below the lowest enabled cut-off")]
    IncompleteGrading { unassigned: usize },

    /// The remote endpoint rejected the submission. Carries the remote
    /// status text; the request is not retried.
    #[error("submission rejected: {status}")]
    SubmitRejected { status: String },
}
