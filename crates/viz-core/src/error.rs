use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the health visualization pipeline.
#[derive(Error, Debug)]
pub enum VizError {
    /// The input file does not exist. Checked before any parse attempt.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The file extension is neither an Arrow IPC (feather) table nor CSV.
    #[error("Unsupported file type: {0} (supported: .csv, .feather)")]
    UnsupportedFormat(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent from the input table.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A timestamp string did not match the canonical pattern.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A cell could not be coerced to the type its record kind requires.
    #[error("Invalid {field} value: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// Aggregate statistics were requested over zero nights.
    #[error("Selected range contains no nights")]
    EmptySelection,

    /// No data source has been imported or generated yet.
    #[error("No data source selected")]
    NoSource,

    /// A table codec (CSV or Arrow IPC) failed while reading or writing.
    #[error("Failed to decode {format} data: {source}")]
    Decode {
        format: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VizError {
    /// Wrap a codec error from the data layer.
    pub fn decode(
        format: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Decode {
            format,
            source: source.into(),
        }
    }
}

/// Convenience alias used throughout the viz crates.
pub type Result<T> = std::result::Result<T, VizError>;
