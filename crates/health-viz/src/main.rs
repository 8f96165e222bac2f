mod bootstrap;
mod report;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use viz_core::settings::{LastUsedParams, Settings};
use viz_core::time_utils::TimestampMode;
use viz_data::feather::write_feather;
use viz_data::source::RecordSource;
use viz_data::synthetic::{generate, SyntheticSpec};
use viz_runtime::data_manager::DataManager;

/// First day of generated data when `--fake-start` is omitted.
const DEFAULT_FAKE_START: (i32, u32, u32) = (2024, 1, 1);

fn main() -> Result<()> {
    let store = LastUsedParams::default_path();
    let settings = Settings::resolve(std::env::args_os(), &store);

    bootstrap::ensure_directories()?;
    let _log_guard = bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    if settings.clear {
        if let Err(e) = LastUsedParams::remove(&store) {
            tracing::warn!("could not clear {}: {}", store.display(), e);
        }
    }

    tracing::info!("health-viz v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Timezone: {}, Format: {}",
        settings.view,
        settings.timezone,
        settings.format
    );

    let mode = TimestampMode::from_setting(&settings.timezone);
    let mut manager = DataManager::new(mode);

    let Some(source) = build_source(&settings) else {
        println!("{}", report::NO_DATA);
        return Ok(());
    };

    match (&settings.save_fake, &source) {
        (Some(path), RecordSource::Synthetic(spec)) => {
            write_feather(path, &generate(spec))
                .with_context(|| format!("writing synthetic data to {}", path.display()))?;
            tracing::info!("Saved synthetic data to {}", path.display());
        }
        (Some(_), RecordSource::File { .. }) => {
            tracing::warn!("--save-fake has no effect without --fake");
        }
        (None, _) => {}
    }

    import_and_remember(&mut manager, source, &settings, &store)?;

    let json = settings.format == "json";
    let output = match settings.view.as_str() {
        "one-night" => {
            let view = manager.one_night(settings.date)?;
            if json {
                report::to_json(&view)?
            } else {
                report::render_one_night(&view)
            }
        }
        _ => {
            let view = manager.overall(settings.start, settings.end)?;
            if json {
                report::to_json(&view)?
            } else {
                report::render_overall(&view)
            }
        }
    };

    println!("{output}");
    Ok(())
}

/// Import `source`, then remember this run's parameters in `store`. A
/// rejected source leaves the store as it was. `--clear` runs store nothing.
fn import_and_remember(
    manager: &mut DataManager,
    source: RecordSource,
    settings: &Settings,
    store: &Path,
) -> Result<()> {
    let label = source.to_string();
    manager
        .import(source)
        .with_context(|| format!("importing {label}"))?;

    if !settings.clear {
        if let Err(e) = settings.remember(store) {
            tracing::warn!("could not remember parameters in {}: {}", store.display(), e);
        }
    }
    Ok(())
}

/// File export if one was given or remembered, else synthetic data when
/// `--fake` is set, else nothing.
fn build_source(settings: &Settings) -> Option<RecordSource> {
    if settings.fake {
        let start = settings.fake_start.unwrap_or_else(default_fake_start);
        let end = settings
            .fake_end
            .unwrap_or_else(|| Local::now().date_naive());
        let seed = settings.seed.unwrap_or_default();
        return Some(RecordSource::Synthetic(SyntheticSpec::new(start, end, seed)));
    }
    settings.file.clone().map(RecordSource::file)
}

fn default_fake_start() -> NaiveDate {
    let (y, m, d) = DEFAULT_FAKE_START;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager() -> DataManager {
        DataManager::new(TimestampMode::WallClock)
    }

    #[test]
    fn test_rejected_file_is_not_remembered() {
        let tmp = TempDir::new().expect("tempdir");
        let store = LastUsedParams::path_in(tmp.path());
        let missing = tmp.path().join("no").join("export.xml");
        let args = ["health-viz".into(), "--file".into(), missing.clone().into_os_string()];
        let settings = Settings::resolve(args, &store);

        let source = build_source(&settings).expect("file source");
        assert!(import_and_remember(&mut manager(), source, &settings, &store).is_err());
        assert!(!store.exists());

        let next = Settings::resolve(["health-viz"], &store);
        assert!(next.file.is_none());
    }

    #[test]
    fn test_unsupported_file_is_not_remembered() {
        let tmp = TempDir::new().expect("tempdir");
        let store = LastUsedParams::path_in(tmp.path());
        let export = tmp.path().join("export.xml");
        std::fs::write(&export, "<HealthData/>").unwrap();
        let args = ["health-viz".into(), "--file".into(), export.into_os_string()];
        let settings = Settings::resolve(args, &store);

        let source = build_source(&settings).expect("file source");
        assert!(import_and_remember(&mut manager(), source, &settings, &store).is_err());
        assert!(!store.exists());
    }

    #[test]
    fn test_imported_file_is_remembered() {
        let tmp = TempDir::new().expect("tempdir");
        let store = LastUsedParams::path_in(tmp.path());
        let export = tmp.path().join("export.csv");
        std::fs::write(&export, "type,startDate,endDate,value\n").unwrap();
        let args = ["health-viz".into(), "--file".into(), export.clone().into_os_string()];
        let settings = Settings::resolve(args, &store);

        let source = build_source(&settings).expect("file source");
        import_and_remember(&mut manager(), source, &settings, &store).expect("import");
        assert_eq!(LastUsedParams::read(&store).file, Some(export));
    }

    #[test]
    fn test_clear_run_stores_nothing() {
        let tmp = TempDir::new().expect("tempdir");
        let store = LastUsedParams::path_in(tmp.path());
        let settings = Settings::resolve(
            [
                "health-viz",
                "--fake",
                "--fake-start",
                "2024-01-01",
                "--fake-end",
                "2024-01-03",
                "--clear",
            ],
            &store,
        );

        let source = build_source(&settings).expect("synthetic source");
        import_and_remember(&mut manager(), source, &settings, &store).expect("import");
        assert!(!store.exists());
    }
}
