//! Output formatting and persistence for ledger views and grade sheets.

use anyhow::Result;
use tracing::{debug, info};

use crate::ledger::LedgerView;
use std::path::Path;

/// Logs a ledger view using Rust's debug pretty-print format.
pub fn print_pretty(view: &LedgerView) {
    debug!("{:#?}", view);
}

/// Prints a ledger view as pretty JSON to stdout.
pub fn print_json(view: &LedgerView) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

/// Writes a ledger view as pretty JSON to a file.
pub fn write_view(path: &Path, view: &LedgerView) -> Result<()> {
    debug!(path = %path.display(), "Writing ledger view");
    std::fs::write(path, serde_json::to_string_pretty(view)?)?;
    Ok(())
}

/// Writes the rendered `Marks,Grade` CSV to a file.
pub fn write_grades_csv(path: &Path, csv: &str) -> Result<()> {
    std::fs::write(path, csv)?;
    info!(path = %path.display(), "Grades CSV written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn sample_view() -> LedgerView {
        Ledger::new(vec![40, 55, 70, 85, 95], 100).unwrap().view()
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_view());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample_view()).unwrap();
    }

    #[test]
    fn test_write_view_creates_file() {
        let path = temp_path("marks_grader_test_view.json");
        let _ = fs::remove_file(&path);

        write_view(&path, &sample_view()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"bands\""));
        assert!(content.contains("\"histogram\""));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_grades_csv() {
        let path = temp_path("marks_grader_test_grades.csv");
        let _ = fs::remove_file(&path);

        write_grades_csv(&path, "Marks,Grade\n85,A\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Marks,Grade\n85,A\n");

        fs::remove_file(&path).unwrap();
    }
}
