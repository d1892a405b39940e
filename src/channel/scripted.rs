use std::collections::HashMap;

use num_complex::Complex64;

use super::id::SimulationId;
use super::simulator::ChannelSimulator;
use crate::entity::Pose;
use crate::error::SimulatorError;

/// Replays fixed per-antenna samples for each transmitter and records every
/// request. Useful for driving the loop without a channel model.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChannel {
    samples: HashMap<usize, Vec<Complex64>>,
    fail_on: Option<String>,
    pub requests: Vec<SimulationId>,
    pub transmitter_poses: Vec<Pose>,
    pub receiver_poses: Vec<Pose>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples returned for `transmitter`, indexed by antenna.
    pub fn with_samples(mut self, transmitter: usize, samples: Vec<Complex64>) -> Self {
        self.samples.insert(transmitter, samples);
        self
    }

    /// Real-valued amplitudes, convenient when only rss matters.
    pub fn with_amplitudes(self, transmitter: usize, amplitudes: &[f64]) -> Self {
        let samples = amplitudes.iter().map(|a| Complex64::new(*a, 0.0)).collect();
        self.with_samples(transmitter, samples)
    }

    /// Fail the request whose rendered id equals `id`.
    pub fn fail_on(mut self, id: impl Into<String>) -> Self {
        self.fail_on = Some(id.into());
        self
    }
}

impl ChannelSimulator for ScriptedChannel {
    fn set_transmitter_pose(&mut self, pose: &Pose) -> Result<(), SimulatorError> {
        self.transmitter_poses.push(*pose);
        Ok(())
    }

    fn set_receiver_pose(&mut self, pose: &Pose) -> Result<(), SimulatorError> {
        self.receiver_poses.push(*pose);
        Ok(())
    }

    fn simulate(&mut self, id: &SimulationId) -> Result<Complex64, SimulatorError> {
        self.requests.push(*id);
        if self.fail_on.as_deref() == Some(id.to_string().as_str()) {
            return Err(SimulatorError::Backend(format!("scripted failure at {}", id)));
        }
        let antenna = id.antenna.unwrap_or(0);
        self.samples
            .get(&id.transmitter)
            .and_then(|s| s.get(antenna))
            .copied()
            .ok_or_else(|| SimulatorError::Backend(format!("no scripted sample for {}", id)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
