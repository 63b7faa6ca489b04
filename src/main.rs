//! MSF Flow CLI
//!
//! Entry point for the `msf-flow` command-line tool.

use clap::{Parser, Subcommand};
use msf_flow::config::{CliOverrides, EffectiveConfig};
use msf_flow::pipeline::FlowPipeline;
use msf_flow::telemetry::init_tracing;
use msf_flow::watcher::DirWatcher;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "msf-flow")]
#[command(about = "Methane Source Finder flow: plume wind statistics and emission rates", version)]
struct Cli {
    /// Verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process plume files once and insert results into the output list
    Run {
        /// Input plume file(s)
        #[arg(long, short = 'i')]
        infile: Vec<PathBuf>,

        /// Path to input wind file directory
        #[arg(long, short = 'w')]
        windir: PathBuf,

        /// Path to output plume list
        #[arg(long, short = 'o')]
        outfile: PathBuf,

        /// Path to config file (default: msf-flow.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Override the fill value for uncomputable statistics
        #[arg(long)]
        fill: Option<f64>,

        /// Override the wind-sample window in seconds
        #[arg(long)]
        window: Option<u64>,

        /// Write a run summary JSON to this path
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Watch a plume directory and process new files as they arrive
    Watch {
        /// Path to input plume file directory
        #[arg(long, short = 'p')]
        plumedir: PathBuf,

        /// Regular expression to match for plume files
        /// (default derived from the configured threshold)
        #[arg(long, short = 'r')]
        regex: Option<String>,

        /// Path to input wind file directory
        #[arg(long, short = 'w')]
        windir: PathBuf,

        /// Path to output plume list
        #[arg(long, short = 'o')]
        outfile: PathBuf,

        /// Path to config file (default: msf-flow.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Poll interval in seconds
        #[arg(long)]
        interval: Option<u64>,

        /// Force reprocessing of all files (not just the new ones)
        #[arg(long, short = 'f')]
        force: bool,

        /// Path to the watcher state file
        /// (default: <plumedir>/.msf-flow-state.json)
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Verify the configuration and print the effective values
    Verify {
        /// Path to config file (default: msf-flow.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            infile,
            windir,
            outfile,
            config,
            fill,
            window,
            summary,
        } => {
            run_once(infile, windir, outfile, config, fill, window, summary);
        }
        Commands::Watch {
            plumedir,
            regex,
            windir,
            outfile,
            config,
            interval,
            force,
            state,
        } => {
            run_watch(plumedir, regex, windir, outfile, config, interval, force, state);
        }
        Commands::Verify { config } => {
            run_verify(config);
        }
    }
}

fn load_effective(config_path: Option<PathBuf>, cli: CliOverrides) -> EffectiveConfig {
    let path = config_path.unwrap_or_else(|| PathBuf::from("msf-flow.toml"));
    match EffectiveConfig::build(Some(&path), cli) {
        Ok(effective) => effective,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_once(
    infiles: Vec<PathBuf>,
    windir: PathBuf,
    outfile: PathBuf,
    config_path: Option<PathBuf>,
    fill: Option<f64>,
    window: Option<u64>,
    summary_path: Option<PathBuf>,
) {
    let effective = load_effective(
        config_path,
        CliOverrides {
            fill_value: fill,
            window_seconds: window,
            ..Default::default()
        },
    );

    if infiles.is_empty() {
        tracing::warn!("nothing to do: no input plume files given");
        return;
    }

    let mut pipeline = FlowPipeline::new(effective.config.clone(), windir, outfile);
    match pipeline.run(&infiles) {
        Ok(summary) => {
            if let Some(path) = summary_path {
                if let Err(e) = summary.write_to_file(&path) {
                    eprintln!("Error writing run summary: {}", e);
                    process::exit(1);
                }
            }
            println!("{}", summary.human_summary);
            if summary.status == msf_flow::summary::Status::Failed {
                process::exit(10);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_watch(
    plumedir: PathBuf,
    regex: Option<String>,
    windir: PathBuf,
    outfile: PathBuf,
    config_path: Option<PathBuf>,
    interval: Option<u64>,
    force: bool,
    state: Option<PathBuf>,
) {
    let effective = load_effective(
        config_path,
        CliOverrides {
            poll_interval_seconds: interval,
            plume_regex: regex,
            ..Default::default()
        },
    );
    let config = effective.config.clone();

    let state_path = state.unwrap_or_else(|| plumedir.join(".msf-flow-state.json"));
    let mut watcher = match DirWatcher::new(
        plumedir,
        &config.plume_regex,
        &config.ignore,
        state_path,
        force,
    ) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error creating watcher: {}", e);
            process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Error installing signal handler: {}", e);
        process::exit(1);
    }

    let poll_interval = Duration::from_secs(config.poll_interval_seconds);
    let mut pipeline = FlowPipeline::new(config, windir, outfile);

    if let Err(e) = watcher.watch(&mut pipeline, poll_interval, running) {
        eprintln!("Watcher error: {}", e);
        process::exit(40);
    }
}

fn run_verify(config_path: Option<PathBuf>) {
    let path = config_path.unwrap_or_else(|| PathBuf::from("msf-flow.toml"));

    match EffectiveConfig::build(Some(&path), CliOverrides::default()) {
        Ok(effective) => {
            println!("Configuration valid");
            println!();
            let c = &effective.config;
            println!("  Fill value: {}", c.fill_value);
            println!("  Sort key: {}", c.sort_key);
            println!("  Min threshold (ppmm): {}", c.min_ppmm);
            println!("  Wind window (s): {}", c.window_seconds);
            println!("  Poll interval (s): {}", c.poll_interval_seconds);
            println!("  Plume pattern: {}", c.plume_regex);
            for source in &effective.sources {
                if let (Some(p), Some(d)) = (&source.path, &source.digest) {
                    println!("  Source: {} (sha256:{})", p, &d[..12]);
                }
            }
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}
