use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Visualizes your Apple Health sleep and heart-rate data
#[derive(Parser, Debug, Clone)]
#[command(
    name = "health-viz",
    about = "Visualizes your Apple Health sleep and heart-rate data",
    version
)]
pub struct Settings {
    /// Path of the exported .feather or .csv file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Use generated fake data instead of a file
    #[arg(long, conflicts_with = "file")]
    pub fake: bool,

    /// First day covered by fake data (default: 2024-01-01)
    #[arg(long)]
    pub fake_start: Option<NaiveDate>,

    /// Last day covered by fake data (default: today)
    #[arg(long)]
    pub fake_end: Option<NaiveDate>,

    /// Seed for the fake data generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the generated fake data to this .feather file
    #[arg(long)]
    pub save_fake: Option<PathBuf>,

    /// Analysis to show
    #[arg(long, default_value = "overall", value_parser = ["overall", "one-night"])]
    pub view: String,

    /// First night of the overall range (clamped to the data)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last night of the overall range (clamped to the data)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Night to inspect in the one-night view (default: latest)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Timestamp offsets: "wall" drops them, "auto" or an IANA name converts
    #[arg(long, default_value = "wall")]
    pub timezone: String,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// DEBUG, INFO, WARNING, ERROR or CRITICAL
    #[arg(long, default_value = "INFO", ignore_case = true,
          value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Write logs here instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Shorthand for --log-level DEBUG
    #[arg(long)]
    pub debug: bool,

    /// Forget the remembered file, view, timezone and format
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// What a previous run used, remembered in `~/.health-viz/last_used.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    pub fn default_path() -> PathBuf {
        Self::path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn path_in(home: &Path) -> PathBuf {
        home.join(".health-viz").join("last_used.json")
    }

    /// A missing or unreadable file counts as nothing remembered.
    pub fn read(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    /// Replace the file through a sibling temp file and a rename.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let staged = path.with_extension("json.tmp");
        std::fs::write(&staged, serde_json::to_vec_pretty(self)?)?;
        std::fs::rename(&staged, path)?;
        Ok(())
    }

    pub fn remove(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Fill every setting the command line left at its default.
    fn fill(self, settings: &mut Settings, matches: &ArgMatches) {
        // A fake run never picks up a remembered export.
        if settings.file.is_none() && !settings.fake {
            settings.file = self.file;
        }
        let slots = [
            ("view", self.view, &mut settings.view),
            ("timezone", self.timezone, &mut settings.timezone),
            ("format", self.format, &mut settings.format),
        ];
        for (name, remembered, slot) in slots {
            if let Some(value) = remembered.filter(|_| !given_on_command_line(matches, name)) {
                *slot = value;
            }
        }
    }
}

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        Self {
            file: s.file.clone(),
            view: Some(s.view.clone()),
            timezone: Some(s.timezone.clone()),
            format: Some(s.format.clone()),
        }
    }
}

fn given_on_command_line(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

// ── Resolution ─────────────────────────────────────────────────────────────────

impl Settings {
    /// Arguments merged with the parameters remembered in `store`, unless
    /// `--clear` is given. Only reads the store; see [`Settings::remember`].
    /// Exits with clap's usage message on bad input.
    pub fn resolve<I, T>(args: I, store: &Path) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().get_matches_from(args);
        let mut settings = Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        if !settings.clear {
            LastUsedParams::read(store).fill(&mut settings, &matches);
        }
        settings
    }

    /// Save this run's parameters for the next one. Call it only once the
    /// run's source has been imported, so a rejected file is never stored.
    /// A fake run keeps whatever file was remembered before.
    pub fn remember(&self, store: &Path) -> Result<()> {
        let mut next = LastUsedParams::from(self);
        if self.fake {
            next.file = LastUsedParams::read(store).file;
        }
        next.write(store)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
