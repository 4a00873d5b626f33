//! Save/load snapshot of a grading session.
//!
//! The on-disk format is a small camelCase JSON document holding the raw
//! inputs plus each band's `(enabled, cutOff)` pair:
//!
//! ```json
//! {
//!   "courseTitle": "CS101",
//!   "maxScore": 100,
//!   "scoresText": "40 55 70 85 95",
//!   "bands": [{ "enabled": true, "cutOff": 80 }, ...]
//! }
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::GradeError;
use crate::ledger::{Ledger, NUM_BANDS};

/// Saved state for one band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedBand {
    pub enabled: bool,
    #[serde(rename = "cutOff")]
    pub cut_off: u32,
}

/// The downloadable/uploadable session snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSheet {
    pub course_title: String,
    pub max_score: u32,
    pub scores_text: String,
    pub bands: Vec<SavedBand>,
}

impl SavedSheet {
    /// Captures the current session: raw inputs plus the band state.
    pub fn capture(course_title: &str, scores_text: &str, ledger: &Ledger) -> Self {
        SavedSheet {
            course_title: course_title.to_string(),
            max_score: ledger.max_score(),
            scores_text: scores_text.to_string(),
            bands: ledger
                .bands()
                .iter()
                .map(|b| SavedBand {
                    enabled: b.enabled,
                    cut_off: b.cut_off,
                })
                .collect(),
        }
    }

    /// Rebuilds an equivalent ledger from the snapshot.
    ///
    /// Each saved cut-off is replayed through the ledger's own update path,
    /// in band order, so a hand-edited (non-monotonic) file still restores
    /// to a consistent sequence. Saved cut-offs above `maxScore` are capped
    /// before replay.
    pub fn restore(&self) -> Result<Ledger, GradeError> {
        let mut ledger = Ledger::from_text(&self.scores_text, self.max_score)?;
        for (i, band) in self.bands.iter().enumerate().take(NUM_BANDS) {
            ledger.set_cut_off(i, band.enabled, band.cut_off.min(self.max_score));
        }
        Ok(ledger)
    }

    /// Loads a snapshot from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the snapshot as JSON to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_restore_round_trip() {
        let scores_text = "40 55 70 85 95";
        let mut ledger = Ledger::from_text(scores_text, 100).unwrap();
        ledger.set_cut_off(0, true, 85);
        ledger.set_cut_off(7, true, 15);

        let sheet = SavedSheet::capture("CS101", scores_text, &ledger);
        assert_eq!(sheet.course_title, "CS101");
        assert_eq!(sheet.max_score, 100);
        assert_eq!(sheet.bands.len(), NUM_BANDS);

        let restored = sheet.restore().unwrap();
        let offs: Vec<u32> = restored.bands().iter().map(|b| b.cut_off).collect();
        let orig: Vec<u32> = ledger.bands().iter().map(|b| b.cut_off).collect();
        assert_eq!(offs, orig);
        for (a, b) in restored.bands().iter().zip(ledger.bands()) {
            assert_eq!(a.enabled, b.enabled);
            assert_eq!(a.count, b.count);
        }
    }

    #[test]
    fn test_restore_repairs_non_monotonic_bands() {
        let sheet = SavedSheet {
            course_title: "CS101".to_string(),
            max_score: 100,
            scores_text: "40 55 70 85 95".to_string(),
            bands: vec![
                SavedBand { enabled: true, cut_off: 50 },
                SavedBand { enabled: true, cut_off: 90 }, // out of order
                SavedBand { enabled: true, cut_off: 60 }, // out of order
                SavedBand { enabled: false, cut_off: 40 },
                SavedBand { enabled: true, cut_off: 30 },
                SavedBand { enabled: false, cut_off: 20 },
                SavedBand { enabled: true, cut_off: 10 },
                SavedBand { enabled: false, cut_off: 5 },
            ],
        };
        let ledger = sheet.restore().unwrap();
        let offs: Vec<u32> = ledger.bands().iter().map(|b| b.cut_off).collect();
        for pair in offs.windows(2) {
            assert!(pair[0] > pair[1], "restore left bands unsorted: {:?}", offs);
        }
    }

    #[test]
    fn test_restore_caps_cut_off_at_max_score() {
        let sheet = SavedSheet {
            course_title: String::new(),
            max_score: 50,
            scores_text: "10 20 30".to_string(),
            bands: vec![SavedBand { enabled: true, cut_off: 500 }],
        };
        let ledger = sheet.restore().unwrap();
        assert_eq!(ledger.bands()[0].cut_off, 50);
    }

    #[test]
    fn test_restore_propagates_parse_errors() {
        let sheet = SavedSheet {
            course_title: String::new(),
            max_score: 100,
            scores_text: "no scores here".to_string(),
            bands: vec![],
        };
        assert_eq!(sheet.restore().unwrap_err(), GradeError::NoScores);
    }

    #[test]
    fn test_json_field_names_are_camel_case() {
        let sheet = SavedSheet {
            course_title: "CS101".to_string(),
            max_score: 100,
            scores_text: "40".to_string(),
            bands: vec![SavedBand { enabled: true, cut_off: 80 }],
        };
        let json = serde_json::to_string(&sheet).unwrap();
        assert!(json.contains("\"courseTitle\""));
        assert!(json.contains("\"maxScore\""));
        assert!(json.contains("\"scoresText\""));
        assert!(json.contains("\"cutOff\""));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join("marks_grader_test_sheet.json");
        let _ = std::fs::remove_file(&path);

        let ledger = Ledger::from_text("40 55", 100).unwrap();
        let sheet = SavedSheet::capture("CS101", "40 55", &ledger);
        sheet.save(&path).unwrap();

        let loaded = SavedSheet::load(&path).unwrap();
        assert_eq!(loaded.course_title, "CS101");
        assert_eq!(loaded.bands.len(), NUM_BANDS);

        std::fs::remove_file(&path).unwrap();
    }
}
