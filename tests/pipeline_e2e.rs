//! End-to-end pipeline tests
//!
//! Exercises the full pass: plume file + wind archive in, enriched
//! cumulative plume list out, including the merge/backup behavior of
//! repeated runs over the same output file.

use std::fs;
use std::path::{Path, PathBuf};

use msf_flow::config::FlowDefaults;
use msf_flow::delimited::{read_table, DelimitedConfig};
use msf_flow::pipeline::FlowPipeline;
use msf_flow::summary::Status;
use tempfile::TempDir;

fn write_wind_archive(winds: &Path) {
    let hrrr = winds.join("hrrr_10m_80m");
    fs::create_dir_all(&hrrr).unwrap();
    fs::write(
        hrrr.join("hrrr_20200924.csv"),
        "Timestamp (UTC), Wind Speed (m/s), Altitude (m)\n\
         20200924t210000, 4.0, 10\n\
         20200924t211500, 5.0, 10\n\
         20200924t213000, 6.0, 10\n\
         20200924t210000, 8.0, 80\n\
         20200924t213000, 10.0, 80\n",
    )
    .unwrap();

    let rtma = winds.join("rtma");
    fs::create_dir_all(&rtma).unwrap();
    fs::write(
        rtma.join("rtma_20200924.csv"),
        "Timestamp (UTC), Wind Speed (m/s)\n\
         20200924t211000, 3.0\n\
         20200924t212000, 3.0\n",
    )
    .unwrap();

    // Unknown product and hidden directory must both be ignored.
    fs::create_dir_all(winds.join("gfs_10m")).unwrap();
    fs::create_dir_all(winds.join(".staging")).unwrap();
}

fn write_plume_file(dir: &Path, name: &str, rows: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(
        &path,
        format!("Candidate ID, IME (kg), Fetch (m)\n{rows}"),
    )
    .unwrap();
    path
}

fn new_pipeline(dir: &TempDir) -> FlowPipeline {
    FlowPipeline::new(
        FlowDefaults::default().to_config(),
        dir.path().join("winds"),
        dir.path().join("plume_list.csv"),
    )
}

#[test]
fn test_single_pass_enriches_plumes() {
    let dir = TempDir::new().unwrap();
    write_wind_archive(&dir.path().join("winds"));
    let infile = write_plume_file(
        dir.path(),
        "ang20200924t211743_ime_minppmm1000.csv",
        "ang20200924t211743-1, 100, 500\n",
    );

    let summary = new_pipeline(&dir).run(&[infile]).unwrap();
    assert_eq!(summary.status, Status::Success);
    assert_eq!(summary.plumes_processed, 1);

    let table = read_table(
        &dir.path().join("plume_list.csv"),
        DelimitedConfig::default(),
    )
    .unwrap();

    // Original columns survive, threshold and wind columns are added.
    assert!(table.header.contains(&"Candidate ID".to_string()));
    assert!(table
        .header
        .contains(&"Minimum Threshold (ppmm)".to_string()));
    assert!(table
        .header
        .contains(&"HRRR 10m Wind Speed Avg (m/s)".to_string()));
    assert!(table
        .header
        .contains(&"HRRR 80m Wind Speed Avg (m/s)".to_string()));
    assert!(table
        .header
        .contains(&"RTMA 10m Wind Speed Avg (m/s)".to_string()));
    assert!(table.header.contains(&"HRRR Emission Rate (kg/hr)".to_string()));
    assert!(table
        .header
        .contains(&"RTMA Emission Uncertainty (kg/hr)".to_string()));

    let get = |col: &str| {
        let idx = table.header.iter().position(|h| h == col).unwrap();
        table.rows[0][idx].clone()
    };

    // 10m HRRR samples: 4, 5, 6 -> mean 5, std 1, count 3.
    assert_eq!(get("HRRR 10m Wind Speed Avg (m/s)"), "5");
    assert_eq!(get("HRRR 10m Wind Speed Std (m/s)"), "1");
    assert_eq!(get("HRRR 10m Wind Sample Count"), "3");
    // 80m HRRR samples: 8, 10 -> mean 9.
    assert_eq!(get("HRRR 80m Wind Speed Avg (m/s)"), "9");
    // Emission uses the lowest altitude: 3600 * 5 * 100 / 500.
    assert_eq!(get("HRRR Emission Rate (kg/hr)"), "3600");
    // RTMA: steady 3 m/s -> zero uncertainty.
    assert_eq!(get("RTMA Emission Rate (kg/hr)"), "2160");
    assert_eq!(get("RTMA Emission Uncertainty (kg/hr)"), "0");
}

#[test]
fn test_second_pass_merges_sorts_and_backs_up() {
    let dir = TempDir::new().unwrap();
    write_wind_archive(&dir.path().join("winds"));

    let first = write_plume_file(
        dir.path(),
        "ang20200924t211743_ime_minppmm1000.csv",
        "ang20200924t211743-2, 100, 500\n",
    );
    let second = write_plume_file(
        dir.path(),
        "ang20200924t201500_ime_minppmm1000.csv",
        "ang20200924t201500-1, 50, 250\n",
    );

    let mut pipeline = new_pipeline(&dir);
    pipeline.run(&[first]).unwrap();
    pipeline.run(&[second]).unwrap();

    let out = dir.path().join("plume_list.csv");
    let table = read_table(&out, DelimitedConfig::default()).unwrap();

    // Both plumes present, sorted by Candidate ID.
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[0][0], "ang20200924t201500-1");
    assert_eq!(table.rows[1][0], "ang20200924t211743-2");

    // The first pass's output was preserved as a backup.
    let backup = fs::read_to_string(dir.path().join("plume_list.csv.bak")).unwrap();
    assert!(backup.contains("ang20200924t211743-2"));
    assert!(!backup.contains("ang20200924t201500-1"));
}

#[test]
fn test_plumes_sorted_within_single_file() {
    let dir = TempDir::new().unwrap();
    write_wind_archive(&dir.path().join("winds"));
    let infile = write_plume_file(
        dir.path(),
        "ang20200924t211743_ime_minppmm1000.csv",
        "ang20200924t211743-9, 100, 500\n\
         ang20200924t211743-1, 100, 500\n",
    );

    new_pipeline(&dir).run(&[infile]).unwrap();

    let table = read_table(
        &dir.path().join("plume_list.csv"),
        DelimitedConfig::default(),
    )
    .unwrap();
    assert_eq!(table.rows[0][0], "ang20200924t211743-1");
    assert_eq!(table.rows[1][0], "ang20200924t211743-9");
}

#[test]
fn test_missing_input_file_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    write_wind_archive(&dir.path().join("winds"));

    let missing = dir.path().join("absent_ime_minppmm1000.csv");
    let summary = new_pipeline(&dir).run(&[missing]).unwrap();

    assert_eq!(summary.status, Status::Failed);
    assert_eq!(summary.plumes_processed, 0);
    // Nothing written for an empty pass.
    assert!(!dir.path().join("plume_list.csv").exists());
}

#[test]
fn test_threshold_comes_from_file_name() {
    let dir = TempDir::new().unwrap();
    write_wind_archive(&dir.path().join("winds"));
    let infile = write_plume_file(
        dir.path(),
        "ang20200924t211743_ime_minppmm2500.csv",
        "ang20200924t211743-1, 100, 500\n",
    );

    new_pipeline(&dir).run(&[infile]).unwrap();

    let table = read_table(
        &dir.path().join("plume_list.csv"),
        DelimitedConfig::default(),
    )
    .unwrap();
    let idx = table
        .header
        .iter()
        .position(|h| h == "Minimum Threshold (ppmm)")
        .unwrap();
    assert_eq!(table.rows[0][idx], "2500");
}
