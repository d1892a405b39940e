use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::aoa::AoaEstimator;
use crate::error::Result;
use crate::policy::MovementPolicy;
use crate::sim::RunOutput;

/// Summary of a finished run, written next to the flight log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scenario: String,
    pub policy: MovementPolicy,
    pub estimator: AoaEstimator,
    pub antennas: usize,
    pub steps: usize,
    pub rows: usize,
    pub degenerate_samples: usize,
    pub initial_position: [f64; 3],
    pub final_position: [f64; 3],
    pub path_length: f64,
    /// Steps spent following each terminal, keyed by `user-N`.
    pub followed: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn from_run<W>(run: &RunOutput<W>) -> Self {
        let position = |p: &nalgebra::Vector3<f64>| [p.x, p.y, p.z];

        let mut followed = BTreeMap::new();
        for step in &run.outcomes {
            *followed.entry(step.followed.to_string()).or_insert(0) += 1;
        }

        RunSummary {
            scenario: run.scenario.clone(),
            policy: run.drone.policy,
            estimator: run.drone.estimator,
            antennas: run.drone.antenna_count(),
            steps: run.outcomes.len(),
            rows: run.rows,
            degenerate_samples: run.degenerate_samples,
            initial_position: position(&run.initial_pose.position),
            final_position: position(&run.drone.pose().position),
            path_length: run.outcomes.iter().map(|s| s.displacement.norm()).sum(),
            followed,
        }
    }
}

/// Write the summary as pretty-printed JSON.
pub fn write_summary<W: Write>(writer: &mut W, summary: &RunSummary) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Write the summary JSON to a file.
pub fn write_summary_file(path: &std::path::Path, summary: &RunSummary) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
