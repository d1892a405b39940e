use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use uav_rf_sim::channel::{DeadlineSimulator, FreeSpaceChannel};
use uav_rf_sim::config::SimConfig;
use uav_rf_sim::io::{run_to_directory, RunSummary};
use uav_rf_sim::Result;

#[derive(Parser)]
#[command(name = "uav-rf-sim")]
#[command(about = "Simulate a UAV homing on radio terminals and log every antenna scan", long_about = None)]
struct Args {
    /// Iterations, including the initial unmoved state
    #[arg(short, long)]
    iterations: Option<u64>,

    /// Output directory for flight.csv and summary.json
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Movement policy (locate, optimize)
    #[arg(long)]
    routine: Option<String>,

    /// AoA estimator (max-rss, weighted-rss)
    #[arg(long)]
    aoa: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(i) = args.iterations {
        config.iterations = i;
    }
    if let Some(o) = &args.output {
        config.output_dir = o.clone();
    }
    if let Some(r) = &args.routine {
        config.routine = r.clone();
    }
    if let Some(a) = &args.aoa {
        config.aoa = a.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(config: &SimConfig) -> Result<RunSummary> {
    let channel = FreeSpaceChannel::new(config.wavelength).azimuth_reference(config.boresight_bias().x);
    let simulator = DeadlineSimulator::spawn(channel, config.simulator_timeout())?;
    run_to_directory(config, simulator)
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    match run(&config) {
        Ok(summary) => {
            println!();
            println!("  UAV RF SIMULATION — {}", summary.scenario);
            println!("  ──────────────────────────────────────────────────────────────────");
            println!("  Policy:        {:>14}    Estimator:  {:>14}", summary.policy, summary.estimator);
            println!("  Steps:         {:>14}    Log rows:   {:>14}", summary.steps, summary.rows);
            println!(
                "  Start:         ({:>7.1}, {:>7.1}, {:>6.1})",
                summary.initial_position[0], summary.initial_position[1], summary.initial_position[2]
            );
            println!(
                "  End:           ({:>7.1}, {:>7.1}, {:>6.1})",
                summary.final_position[0], summary.final_position[1], summary.final_position[2]
            );
            println!("  Path length:   {:>14.1}", summary.path_length);
            if summary.degenerate_samples > 0 {
                println!("  Degenerate IQ samples clamped: {}", summary.degenerate_samples);
            }
            println!("  Output:        {}", config.output_dir.display());
            println!();
        }
        Err(e) => {
            error!("run aborted: {}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(s) = source {
                eprintln!("  caused by: {}", s);
                source = std::error::Error::source(s);
            }
            process::exit(1);
        }
    }
}
