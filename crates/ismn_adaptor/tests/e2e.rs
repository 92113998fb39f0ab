//! End-to-end tests for the adaptor
//!
//! These build a small ISMN database on disk and run full adaptation passes.

use indicatif::ProgressBar;
use ismn_adaptor::{AdaptOutcome, Adaptor, AdaptorConfig, NetworkDir, NetworkLocation, SkipReason};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DATABASE: &str = "ismn_data";

/// Create a test environment with a database root in a temp directory
struct TestEnv {
    /// Temp directory (cleaned up on drop)
    _temp: TempDir,
    /// Directory holding the database folder
    pub root: PathBuf,
    /// `<root>/<database>/USDA-ARS`
    pub network_dir: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path().to_path_buf();
        let network_dir = root.join(DATABASE).join("USDA-ARS");
        fs::create_dir_all(&network_dir).expect("Failed to create network dir");

        Self {
            _temp: temp,
            root,
            network_dir,
        }
    }

    fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.network_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    fn adaptor(&self) -> Adaptor {
        Adaptor::new(&self.root, DATABASE, AdaptorConfig::default())
    }

    fn network(&self, adaptor: &Adaptor) -> NetworkDir {
        match adaptor.locate_network() {
            NetworkLocation::Found(dir) => dir,
            NetworkLocation::NotFound(missing) => panic!("network missing: {missing:?}"),
        }
    }
}

/// Every file below `dir` as (relative path, contents), sorted.
fn snapshot(dir: &Path) -> Vec<(String, String)> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                files.push((rel, fs::read_to_string(&path).unwrap()));
            }
        }
    }
    files.sort();
    files
}

const SM_HEADER: &str =
    "USDA-ARS USDA-ARS Adams 45.35 -97.28 533.0 0.05 0.05 Hydraprobe-Analog (2.5 Volt) - soil moisture\n";
const ROWS: &str = "2019/01/01 00:00 0.213 G M\n2019/01/01 01:00 0.214 G M\n2019/01/01 02:00 0.214 G M\n";

#[test]
fn test_adapts_whole_network() {
    let env = TestEnv::new();
    env.write_file(
        "Adams/USDA-ARS_USDA-ARS_Adams_sm_0.050800_0.050800_Hydraprobe-Analog-(2.5-Volt)---_20190101_20191231.stm",
        &format!("{SM_HEADER}{ROWS}"),
    );
    env.write_file(
        "Bushland/2019/STATION_(2.5-Volt)---sensor.stm",
        "Temp (2.5 Volt) - deg C depth 5\nrow 1\n",
    );
    env.write_file("Bushland/readme.txt", "not a data file\n");

    let adaptor = env.adaptor();
    let network = env.network(&adaptor);
    let report = adaptor.adapt_files(&network, &ProgressBar::hidden()).unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.adapted(), 2);
    assert_eq!(report.skipped(), 0);

    let files = snapshot(&env.network_dir);
    assert_eq!(
        files,
        vec![
            (
                "Adams/USDA-ARS_USDA-ARS_Adams_sm_0.050800_0.050800_Hydraprobe-Analog-2500-mV-_20190101_20191231.stm".to_string(),
                format!(
                    "USDA-ARS USDA-ARS Adams 45.35 -97.28 533.0 0.05 0.05 Hydraprobe-Analog 2500 mV soil_moisture\n{ROWS}"
                ),
            ),
            (
                "Bushland/2019/STATION_2500-mV-sensor.stm".to_string(),
                "Temp 2500 mV deg_C_depth_5\nrow 1\n".to_string(),
            ),
            ("Bushland/readme.txt".to_string(), "not a data file\n".to_string()),
        ]
    );
}

#[test]
fn test_line_count_preserved() {
    let env = TestEnv::new();
    let source = env.write_file("Adams/a_(2.5-Volt)---b.stm", &format!("{SM_HEADER}{ROWS}"));

    let adaptor = env.adaptor();
    let outcome = adaptor.adapt_file(&source).unwrap();
    let target = match outcome {
        AdaptOutcome::Adapted { target, .. } => target,
        other => panic!("expected adaptation, got {other:?}"),
    };

    assert!(!source.exists());
    let original_lines = format!("{SM_HEADER}{ROWS}").lines().count();
    assert_eq!(fs::read_to_string(target).unwrap().lines().count(), original_lines);
}

#[test]
fn test_second_run_changes_nothing() {
    let env = TestEnv::new();
    env.write_file("Adams/STATION_(2.5-Volt)---sensor.stm", "Temp (2.5 Volt) - deg C\nrow\n");

    let adaptor = env.adaptor();
    let network = env.network(&adaptor);
    let first = adaptor.adapt_files(&network, &ProgressBar::hidden()).unwrap();
    assert_eq!(first.adapted(), 1);
    let after_first = snapshot(&env.network_dir);

    let second = adaptor.adapt_files(&network, &ProgressBar::hidden()).unwrap();
    assert_eq!(second.total, 1);
    assert_eq!(second.adapted(), 0);
    assert_eq!(second.skipped(), 1);
    assert!(matches!(
        &second.outcomes[0],
        AdaptOutcome::Skipped {
            reason: SkipReason::FilenameTokenMissing,
            ..
        }
    ));
    assert_eq!(snapshot(&env.network_dir), after_first);
}

#[test]
fn test_mismatch_does_not_stop_the_run() {
    let env = TestEnv::new();
    env.write_file("Adams/already_2500-mV-sensor.stm", "Temp 2500 mV deg_C\nrow\n");
    env.write_file("Adams/bad_(2.5-Volt)---header.stm", "Temp 2.5V\nrow\n");
    env.write_file("Adams/good_(2.5-Volt)---sensor.stm", "Temp (2.5 Volt) - deg C\nrow\n");

    let adaptor = env.adaptor();
    let network = env.network(&adaptor);
    let report = adaptor.adapt_files(&network, &ProgressBar::hidden()).unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.adapted(), 1);
    assert_eq!(report.skipped(), 2);

    let names: Vec<String> = snapshot(&env.network_dir).into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        vec![
            "Adams/already_2500-mV-sensor.stm",
            "Adams/bad_(2.5-Volt)---header.stm",
            "Adams/good_2500-mV-sensor.stm",
        ]
    );
}

#[test]
fn test_missing_network_touches_nothing() {
    let env = TestEnv::new();
    env.write_file("Adams/STATION_(2.5-Volt)---sensor.stm", "Temp (2.5 Volt) - deg C\n");
    let before = snapshot(&env.root);

    let config = AdaptorConfig {
        pattern: "SCAN".to_string(),
        ..AdaptorConfig::default()
    };
    let adaptor = Adaptor::new(&env.root, DATABASE, config);
    match adaptor.locate_network() {
        NetworkLocation::NotFound(missing) => {
            assert_eq!(missing.pattern, "SCAN");
            assert_eq!(missing.database, DATABASE);
        }
        NetworkLocation::Found(dir) => panic!("unexpected network {dir:?}"),
    }
    assert_eq!(snapshot(&env.root), before);
}

#[test]
fn test_dry_run_reports_plan_only() {
    let env = TestEnv::new();
    env.write_file("Adams/STATION_(2.5-Volt)---sensor.stm", "Temp (2.5 Volt) - deg C\n");
    env.write_file("Adams/other.stm", "Temp 2500 mV deg_C\n");
    let before = snapshot(&env.network_dir);

    let adaptor = env.adaptor().with_dry_run(true);
    let network = env.network(&adaptor);
    let report = adaptor.adapt_files(&network, &ProgressBar::hidden()).unwrap();

    assert_eq!(report.planned(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.adapted(), 0);
    assert_eq!(snapshot(&env.network_dir), before);
}

#[test]
fn test_progress_tracks_candidates() {
    let env = TestEnv::new();
    for i in 0..4 {
        env.write_file(
            &format!("Station{i}/s{i}_(2.5-Volt)---x.stm"),
            "Temp (2.5 Volt) - deg C\n",
        );
    }

    let adaptor = env.adaptor();
    let network = env.network(&adaptor);
    let progress = ProgressBar::hidden();
    adaptor.adapt_files(&network, &progress).unwrap();

    assert_eq!(progress.length(), Some(4));
    assert_eq!(progress.position(), 4);
}

#[test]
fn test_empty_network() {
    let env = TestEnv::new();
    let adaptor = env.adaptor();
    let network = env.network(&adaptor);
    let report = adaptor.adapt_files(&network, &ProgressBar::hidden()).unwrap();
    assert_eq!(report.total, 0);
    assert!(report.outcomes.is_empty());
}
