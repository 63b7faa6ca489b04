//! Pipeline orchestration for the MSF flow
//!
//! A processing pass:
//! - load plumes from the input file(s), attaching the threshold column
//! - sort plumes by their first column
//! - for each plume, compute windspeed statistics per wind type and
//!   altitude, then emission-rate estimates per wind type
//! - insert the enriched plumes into the cumulative output list
//! - emit a run summary
//!
//! Wind samples are loaded once per subdirectory and cached for the
//! lifetime of the pipeline, since every plume in a pass consults the
//! same wind archive.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use msf_wind::{compute_emission_rate, compute_wind_stats, WindStats};

use crate::config::FlowConfig;
use crate::delimited::DelimitedConfig;
use crate::output::{insert_plumes, InsertOutcome, OutputError};
use crate::plume::{
    load_plumes, observation_time, sort_by_first_column, PlumeError, PlumeRecord, FETCH_COLUMN,
    IME_COLUMN,
};
use crate::summary::{FileOutcome, RunSummary};
use crate::wind::{load_samples, scan_wind_dirs, LoadedSamples, WindDirError, WindFileError};

/// Pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("plume error: {0}")]
    Plume(#[from] PlumeError),

    #[error("wind directory error: {0}")]
    WindDir(#[from] WindDirError),

    #[error("wind file error: {0}")]
    WindFile(#[from] WindFileError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Plume(_) => 10,
            PipelineError::WindDir(_) => 20,
            PipelineError::WindFile(_) => 21,
            PipelineError::Output(_) => 30,
            PipelineError::Io(_) => 1,
        }
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// One processing pass over a winds directory and an output list.
pub struct FlowPipeline {
    config: FlowConfig,
    winds_dir: PathBuf,
    outfile: PathBuf,
    delimited: DelimitedConfig,
    sample_cache: HashMap<PathBuf, LoadedSamples>,
}

impl FlowPipeline {
    pub fn new(config: FlowConfig, winds_dir: PathBuf, outfile: PathBuf) -> Self {
        Self {
            config,
            winds_dir,
            outfile,
            delimited: DelimitedConfig::default(),
            sample_cache: HashMap::new(),
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Process input files and insert the enriched plumes into the
    /// output list. Per-file failures are recorded in the summary and
    /// do not abort the pass.
    pub fn run(&mut self, infiles: &[PathBuf]) -> PipelineResult<RunSummary> {
        let run_id = format!("run-{}", Uuid::new_v4());
        let started = Instant::now();

        let mut outcomes = Vec::with_capacity(infiles.len());
        let mut enriched: Vec<PlumeRecord> = Vec::new();

        for infile in infiles {
            match self.process_file(infile) {
                Ok(plumes) => {
                    outcomes.push(FileOutcome {
                        path: infile.display().to_string(),
                        succeeded: true,
                        plumes_processed: plumes.len(),
                        rows_skipped: 0,
                        error: None,
                    });
                    enriched.extend(plumes);
                }
                Err(e) => {
                    warn!(file = %infile.display(), error = %e, "plume file failed");
                    outcomes.push(FileOutcome {
                        path: infile.display().to_string(),
                        succeeded: false,
                        plumes_processed: 0,
                        rows_skipped: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let insert = self.insert(enriched)?;
        if let Some(last) = outcomes.last_mut() {
            // Rows dropped at insertion are attributed to the pass, not
            // a specific input; parked on the final outcome.
            last.rows_skipped += insert.skipped_rows;
        }

        let summary = RunSummary::from_file_outcomes(
            run_id,
            outcomes,
            started.elapsed().as_millis() as u64,
        );
        info!("{}", summary.human_summary);
        Ok(summary)
    }

    /// Load, sort, and enrich every plume in one input file.
    pub fn process_file(&mut self, infile: &Path) -> PipelineResult<Vec<PlumeRecord>> {
        info!(file = %infile.display(), "processing plume file");

        let mut plumes = load_plumes(infile, self.delimited)?;
        sort_by_first_column(&mut plumes);

        let wind_entries = scan_wind_dirs(&self.winds_dir)?;

        for plume in &mut plumes {
            self.enrich_plume(plume, &wind_entries)?;
        }
        Ok(plumes)
    }

    /// Compute wind statistics and emission estimates for one plume.
    fn enrich_plume(
        &mut self,
        plume: &mut PlumeRecord,
        wind_entries: &[crate::wind::WindDirEntry],
    ) -> PipelineResult<()> {
        let candidate = plume.first_value().unwrap_or("<empty>").to_string();
        info!(%candidate, "processing plume");

        let observed_at = observation_time(plume);
        if observed_at.is_none() {
            warn!(%candidate, "no observation time in candidate id; wind stats filled");
        }

        let fill = self.config.fill_value;
        let window_seconds = self.config.window_seconds;
        let ime = plume.numeric(IME_COLUMN, fill);
        let fetch = plume.numeric(FETCH_COLUMN, fill);

        for entry in wind_entries {
            let wind_type = entry.wind_type.clone();
            if wind_type.is_unknown() {
                warn!(dir = wind_type.raw(), "unknown wind type; skipped");
                continue;
            }
            info!(dir = wind_type.raw(), "processing winds");

            let mut lowest_stats: Option<WindStats> = None;
            for &alt in wind_type.alts() {
                let stats = match observed_at {
                    Some(at) => {
                        let samples = self.samples_for(&entry.path)?;
                        compute_wind_stats(&samples.samples, at, alt, window_seconds)
                    }
                    None => None,
                };

                match stats {
                    Some(s) => {
                        plume.set(&wind_type.speed_avg_column(alt), format_stat(s.mean_mps));
                        plume.set(&wind_type.speed_std_column(alt), format_stat(s.std_dev_mps));
                        plume.set(&wind_type.sample_count_column(alt), s.count.to_string());
                        if lowest_stats.is_none() {
                            lowest_stats = Some(s);
                        }
                    }
                    None => {
                        plume.set(&wind_type.speed_avg_column(alt), format_stat(fill));
                        plume.set(&wind_type.speed_std_column(alt), format_stat(fill));
                        plume.set(&wind_type.sample_count_column(alt), format_stat(fill));
                    }
                }
            }

            let estimate = match (lowest_stats, ime, fetch) {
                (Some(stats), Some(ime), Some(fetch)) => {
                    compute_emission_rate(&stats, ime, fetch)
                }
                _ => None,
            };
            match estimate {
                Some(e) => {
                    plume.set(&wind_type.emission_rate_column(), format_stat(e.rate_kg_hr));
                    plume.set(
                        &wind_type.emission_uncertainty_column(),
                        format_stat(e.uncertainty_kg_hr),
                    );
                }
                None => {
                    plume.set(&wind_type.emission_rate_column(), format_stat(fill));
                    plume.set(&wind_type.emission_uncertainty_column(), format_stat(fill));
                }
            }
        }
        Ok(())
    }

    /// Insert enriched plumes into the output list.
    fn insert(&self, plumes: Vec<PlumeRecord>) -> PipelineResult<InsertOutcome> {
        let outcome = insert_plumes(plumes, &self.outfile, &self.config.sort_key, self.delimited)?;
        if outcome.written > 0 {
            info!(
                rows = outcome.written,
                file = %self.outfile.display(),
                "extended plume file written"
            );
        }
        Ok(outcome)
    }

    fn samples_for(&mut self, dir: &Path) -> PipelineResult<&LoadedSamples> {
        if !self.sample_cache.contains_key(dir) {
            let loaded = load_samples(dir, self.delimited)?;
            if loaded.skipped_rows > 0 {
                warn!(
                    dir = %dir.display(),
                    skipped = loaded.skipped_rows,
                    "wind sample rows skipped"
                );
            }
            self.sample_cache.insert(dir.to_path_buf(), loaded);
        }
        Ok(&self.sample_cache[dir])
    }
}

/// Format a statistic for the delimited output. Integral values are
/// written without a fractional part so fill values stay `-9999`.
fn format_stat(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.3}", value)
    }
}
