//! Where a record table comes from.

use std::fmt;
use std::path::PathBuf;

use viz_core::models::RawRecord;
use viz_core::Result;

use crate::reader::load_records;
use crate::synthetic::{generate, SyntheticSpec};

/// A producer of raw records; file exports and fake data are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    File { path: PathBuf },
    Synthetic(SyntheticSpec),
}

/// Identity of a source's content, used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    /// Canonicalized path when the file exists, the given path otherwise.
    File(PathBuf),
    Synthetic(SyntheticSpec),
}

impl RecordSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn key(&self) -> SourceKey {
        match self {
            Self::File { path } => {
                SourceKey::File(path.canonicalize().unwrap_or_else(|_| path.clone()))
            }
            Self::Synthetic(spec) => SourceKey::Synthetic(*spec),
        }
    }

    /// Produce the raw table.
    pub fn fetch(&self) -> Result<Vec<RawRecord>> {
        match self {
            Self::File { path } => load_records(path),
            Self::Synthetic(spec) => Ok(generate(spec)),
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path } => write!(f, "{}", path.display()),
            Self::Synthetic(spec) => write!(
                f,
                "synthetic {} .. {} (seed {})",
                spec.start, spec.end, spec.seed
            ),
        }
    }
}
