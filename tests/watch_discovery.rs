//! Watcher discovery tests
//!
//! Verifies the scan/mark cycle against the upstream detection layout
//! (`ang*_detections/ime_minppmm<T>/...`) using the default pattern.

use std::fs;
use std::path::{Path, PathBuf};

use msf_flow::config::{default_plume_regex, FlowDefaults};
use msf_flow::watcher::DirWatcher;
use tempfile::TempDir;

fn touch(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "Candidate ID\nang-1\n").unwrap();
    path
}

fn watcher(dir: &TempDir, pattern: &str, force: bool) -> DirWatcher {
    DirWatcher::new(
        dir.path().join("plumes"),
        pattern,
        &FlowDefaults::default().ignore,
        dir.path().join("state.json"),
        force,
    )
    .unwrap()
}

#[test]
fn test_default_pattern_matches_detection_layout() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("plumes");

    let matching = touch(
        &root,
        "ang20200924t211743_detections/ime_minppmm1000/ang20200924t211743_ime_minppmm1000.csv",
    );
    // Wrong threshold directory must not match.
    touch(
        &root,
        "ang20200924t211743_detections/ime_minppmm500/ang20200924t211743_ime_minppmm500.csv",
    );
    // Stray file at the top level must not match.
    touch(&root, "readme.txt");

    let w = watcher(&dir, &default_plume_regex(1000), false);
    let found = w.scan().unwrap();
    assert_eq!(found, vec![matching]);
}

#[test]
fn test_processed_files_not_rescanned() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("plumes");
    let file = touch(
        &root,
        "ang_detections/ime_minppmm1000/ang_a_ime_minppmm1000.csv",
    );

    let mut w = watcher(&dir, &default_plume_regex(1000), false);
    assert_eq!(w.scan().unwrap().len(), 1);

    w.mark_processed(&file).unwrap();
    assert!(w.scan().unwrap().is_empty());
}

#[test]
fn test_force_reprocesses_everything() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("plumes");
    let file = touch(
        &root,
        "ang_detections/ime_minppmm1000/ang_a_ime_minppmm1000.csv",
    );

    let mut w = watcher(&dir, &default_plume_regex(1000), false);
    w.mark_processed(&file).unwrap();
    drop(w);

    let w = watcher(&dir, &default_plume_regex(1000), true);
    assert_eq!(w.scan().unwrap().len(), 1);
}

#[test]
fn test_backup_files_ignored_by_default() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("plumes");
    touch(
        &root,
        "ang_detections/ime_minppmm1000/ang_a_ime_minppmm1000.csv.bak",
    );

    let w = watcher(&dir, &default_plume_regex(1000), false);
    assert!(w.scan().unwrap().is_empty());
}

#[test]
fn test_state_survives_watcher_restart() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("plumes");
    let file = touch(
        &root,
        "ang_detections/ime_minppmm1000/ang_a_ime_minppmm1000.csv",
    );

    {
        let mut w = watcher(&dir, &default_plume_regex(1000), false);
        w.mark_processed(&file).unwrap();
    }

    let w = watcher(&dir, &default_plume_regex(1000), false);
    assert!(w.scan().unwrap().is_empty());

    // A new detection shows up after restart.
    touch(
        &root,
        "ang_detections/ime_minppmm1000/ang_b_ime_minppmm1000.csv",
    );
    assert_eq!(w.scan().unwrap().len(), 1);
}
