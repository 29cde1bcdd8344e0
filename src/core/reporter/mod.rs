//! # Reporter Module
//!
//! Appends run results to CSV files so repeated runs accumulate
//! history instead of overwriting it.
//!
//! Two record shapes exist: `(DATE, NAME)` for plain file listings
//! (the not-found sets) and `(DATE, NAME, SCORE)` for join-similarity
//! results. The header row is written only when the target file is
//! still empty.

use crate::core::work::JoinOutcome;
use crate::error::ReportError;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write `(DATE, NAME)` rows for a list of file names.
pub fn write_names<W: Write>(
    mut writer: W,
    names: &[String],
    with_header: bool,
    when: &str,
) -> std::io::Result<()> {
    if with_header {
        writeln!(writer, "DATE,NAME")?;
    }
    for name in names {
        writeln!(writer, "{when},{name}")?;
    }
    Ok(())
}

/// Write `(DATE, NAME, SCORE)` rows for join outcomes.
///
/// A join without a score writes an empty SCORE field, mirroring a
/// skipped or uncomputable similarity.
pub fn write_scores<W: Write>(
    mut writer: W,
    outcomes: &[&JoinOutcome],
    with_header: bool,
    when: &str,
) -> std::io::Result<()> {
    if with_header {
        writeln!(writer, "DATE,NAME,SCORE")?;
    }
    for outcome in outcomes {
        let name = outcome
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match outcome.score {
            Some(score) => writeln!(writer, "{when},{name},{score}")?,
            None => writeln!(writer, "{when},{name},")?,
        }
    }
    Ok(())
}

/// Append a name listing to `path`. Returns false (and writes nothing,
/// not even a header) when `names` is empty.
pub fn export_names(names: &[String], path: &Path) -> Result<bool, ReportError> {
    if names.is_empty() {
        return Ok(false);
    }
    let (file, fresh) = open_for_append(path)?;
    let when = Local::now().format(TIMESTAMP_FORMAT).to_string();
    write_names(file, names, fresh, &when).map_err(|source| ReportError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Saved csv: {}", path.display());
    Ok(true)
}

/// Append similarity rows to `path`. Returns false when there is
/// nothing to write.
pub fn export_scores(outcomes: &[&JoinOutcome], path: &Path) -> Result<bool, ReportError> {
    if outcomes.is_empty() {
        return Ok(false);
    }
    let (file, fresh) = open_for_append(path)?;
    let when = Local::now().format(TIMESTAMP_FORMAT).to_string();
    write_scores(file, outcomes, fresh, &when).map_err(|source| ReportError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Saved csv: {}", path.display());
    Ok(true)
}

/// Open `path` in append mode, creating parent directories as needed.
/// The bool is true when the file was empty (header wanted).
fn open_for_append(path: &Path) -> Result<(std::fs::File, bool), ReportError> {
    let wrap = |source| ReportError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(wrap)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap)?;
    let fresh = file.metadata().map_err(wrap)?.len() == 0;
    Ok((file, fresh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn outcome(name: &str, score: Option<f64>) -> JoinOutcome {
        JoinOutcome {
            source: PathBuf::from(format!("/scans/{name}")),
            score,
            error: None,
        }
    }

    #[test]
    fn names_get_a_header_and_a_row_each() {
        let mut buffer = Vec::new();
        write_names(
            &mut buffer,
            &["a.tif".to_string(), "b.tif".to_string()],
            true,
            "2024-01-01 12:00:00",
        )
        .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "DATE,NAME");
        assert_eq!(lines[1], "2024-01-01 12:00:00,a.tif");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn scores_write_an_empty_field_when_absent() {
        let with_score = outcome("a.tif", Some(0.875));
        let without = outcome("b.tif", None);
        let mut buffer = Vec::new();
        write_scores(
            &mut buffer,
            &[&with_score, &without],
            true,
            "2024-01-01 12:00:00",
        )
        .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("a.tif,0.875"));
        assert!(text.contains("b.tif,\n"));
    }

    #[test]
    fn repeated_exports_accumulate_with_one_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notfound.csv");

        export_names(&["a.tif".to_string()], &path).unwrap();
        export_names(&["b.tif".to_string()], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("DATE,NAME").count(), 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn empty_data_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.csv");

        let written = export_names(&[], &path).unwrap();

        assert!(!written);
        assert!(!path.exists());
    }

    #[test]
    fn export_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Reports").join("scores.csv");
        let first = outcome("a.tif", Some(1.0));

        export_scores(&[&first], &path).unwrap();

        assert!(path.is_file());
    }
}
