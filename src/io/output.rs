use std::fs;
use std::io::BufWriter;

use tracing::{info, warn};

use super::json::{write_summary_file, RunSummary};
use crate::channel::ChannelSimulator;
use crate::config::SimConfig;
use crate::error::{Error, Result};
use crate::sim::simulate_scenario;

/// Run the configured scenario and persist `flight.csv` and `summary.json`
/// under the output directory.
///
/// The log is written under a `.part` name and renamed once the run has
/// finished, so a failed run leaves no flight log behind.
pub fn run_to_directory<S: ChannelSimulator>(config: &SimConfig, simulator: S) -> Result<RunSummary> {
    let scenario = config.scenario()?;
    fs::create_dir_all(&config.output_dir)?;

    let log_path = config.log_path();
    let part_path = config.output_dir.join(format!("{}.part", config.log_file));
    let writer = BufWriter::new(fs::File::create(&part_path)?);

    let output = match simulate_scenario(scenario, simulator, writer, config.iterations) {
        Ok(output) => output,
        Err(e) => {
            if let Err(rm) = fs::remove_file(&part_path) {
                warn!(path = %part_path.display(), "could not remove partial log: {}", rm);
            }
            return Err(e);
        }
    };

    let summary = RunSummary::from_run(&output);
    let file = output.writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    file.sync_all()?;
    drop(file);
    fs::rename(&part_path, &log_path)?;
    info!(path = %log_path.display(), rows = summary.rows, "flight log written");

    write_summary_file(&config.summary_path(), &summary)?;
    Ok(summary)
}
