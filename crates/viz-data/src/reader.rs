//! Export file loading.
//!
//! Resolves the physical encoding from the file extension and reads rows
//! into [`RawRecord`]s. Two encodings are supported: Arrow IPC ("feather")
//! tables, handled in [`crate::feather`], and delimited text read here.

use std::path::Path;

use tracing::debug;
use viz_core::models::RawRecord;
use viz_core::{Result, VizError};

use crate::feather::{self, REQUIRED_COLUMNS};

// ── DataFormat ────────────────────────────────────────────────────────────────

/// The physical encodings an export may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Arrow IPC file (`.feather`, `.arrow`, `.ipc`).
    Feather,
    /// Comma-delimited text with a header row (`.csv`).
    Csv,
}

impl DataFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("feather") | Some("arrow") | Some("ipc") => Ok(Self::Feather),
            Some("csv") => Ok(Self::Csv),
            _ => Err(VizError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every row of an export file.
///
/// Existence is checked before the extension, and both before any parsing,
/// so a missing file always reports [`VizError::FileNotFound`].
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(VizError::FileNotFound(path.to_path_buf()));
    }

    let format = DataFormat::from_path(path)?;
    let records = match format {
        DataFormat::Feather => feather::read_feather(path)?,
        DataFormat::Csv => read_csv(path)?,
    };

    debug!(
        "Loaded {} rows from {} ({:?})",
        records.len(),
        path.display(),
        format
    );
    Ok(records)
}

/// Read a delimited export. Extra columns are ignored; `sourceName` and
/// `unit` may be absent.
pub fn read_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).map_err(|source| VizError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().map_err(csv_error)?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(VizError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<RawRecord>() {
        records.push(row.map_err(csv_error)?);
    }
    Ok(records)
}

fn csv_error(e: csv::Error) -> VizError {
    VizError::decode("CSV", e)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    const HEADER: &str = "type,sourceName,unit,startDate,endDate,value";

    // ── DataFormat ────────────────────────────────────────────────────────────

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DataFormat::from_path(Path::new("a/export.feather")).unwrap(),
            DataFormat::Feather
        );
        assert_eq!(
            DataFormat::from_path(Path::new("export.CSV")).unwrap(),
            DataFormat::Csv
        );
    }

    #[test]
    fn test_format_unsupported_extension() {
        let err = DataFormat::from_path(Path::new("export.xml")).unwrap_err();
        assert!(matches!(err, VizError::UnsupportedFormat(_)));
        let err = DataFormat::from_path(Path::new("export")).unwrap_err();
        assert!(matches!(err, VizError::UnsupportedFormat(_)));
    }

    // ── load_records ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_missing_file_is_not_found() {
        let err = load_records(Path::new("/tmp/does-not-exist-health-viz/x.xml")).unwrap_err();
        assert!(matches!(err, VizError::FileNotFound(_)));
    }

    #[test]
    fn test_load_existing_unsupported_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "export.xml", &["<HealthData/>"]);
        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, VizError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_csv_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "export.csv",
            &[
                HEADER,
                "HKCategoryTypeIdentifierSleepAnalysis,Watch,,2024-01-01 22:00:00,2024-01-02 06:00:00,HKCategoryValueSleepAnalysisInBed",
                "HKQuantityTypeIdentifierHeartRate,Watch,count/min,2024-01-01 23:00:00,2024-01-01 23:00:00,58",
            ],
        );

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_type, "HKCategoryTypeIdentifierSleepAnalysis");
        assert_eq!(records[0].start_date, "2024-01-01 22:00:00");
        assert_eq!(records[1].unit, "count/min");
        assert_eq!(records[1].value, "58");
    }

    #[test]
    fn test_csv_optional_columns_and_extras() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "export.csv",
            &[
                "type,creationDate,startDate,endDate,value",
                "HKQuantityTypeIdentifierHeartRate,2024-01-02,2024-01-01 23:00:00,2024-01-01 23:00:00,61",
            ],
        );

        let records = read_csv(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_name, "");
        assert_eq!(records[0].unit, "");
    }

    #[test]
    fn test_csv_missing_required_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "export.csv",
            &["type,startDate,value", "x,2024-01-01 00:00:00,1"],
        );
        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, VizError::MissingColumn(c) if c == "endDate"));
    }

    #[test]
    fn test_csv_header_only_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "export.csv", &[HEADER]);
        assert!(load_records(&path).unwrap().is_empty());
    }

    #[test]
    fn test_csv_undecodable_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let mut bytes = b"type,value,startDate,endDate\nx,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b",2024-01-01 22:00:00,2024-01-02 06:00:00\n");
        std::fs::write(&path, bytes).unwrap();

        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, VizError::Decode { format: "CSV", .. }));
        assert!(err.to_string().starts_with("Failed to decode CSV data"));
    }
}
