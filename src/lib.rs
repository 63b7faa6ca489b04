//! MSF Flow - plume enrichment pipeline
//!
//! Processes methane plume candidate lists: for each plume, computes
//! windspeed statistics from wind-product archives and emission-rate
//! estimates, then merges the enriched plumes into a cumulative output
//! list. A companion launcher binary reproduces the original wrapper
//! contract (environment setup + process replacement).

pub mod config;
pub mod delimited;
pub mod launcher;
pub mod output;
pub mod pipeline;
pub mod plume;
pub mod summary;
pub mod telemetry;
pub mod watcher;
pub mod wind;

pub use config::{CliOverrides, ConfigError, EffectiveConfig, FlowConfig};
pub use pipeline::{FlowPipeline, PipelineError};
pub use plume::PlumeRecord;
pub use summary::RunSummary;
pub use watcher::DirWatcher;
