use std::f64::consts::FRAC_PI_2;

use nalgebra::Vector3;

use super::pose::Pose;
use super::terminal::Terminal;
use crate::aoa::{AoaEstimator, Reading};
use crate::error::{Error, Result};
use crate::policy::{MovementPolicy, StepOutcome, DEFAULT_STEP_LENGTH};
use crate::sim::EnvironmentRf;
use crate::channel::ChannelSimulator;

/// Default array: four elements a quarter turn apart (0, 90, 180, 270 deg).
pub fn default_antenna_offsets() -> Vec<f64> {
    [0.0_f64, 90.0, 180.0, 270.0].iter().map(|d| d.to_radians()).collect()
}

/// Mounting bias added to every element's boresight: 90 deg in u, 135 deg in v.
///
/// Depends on the channel simulator's angle convention, which has not been
/// confirmed; keep it configurable rather than folding it into the offsets.
pub fn default_boresight_bias() -> Vector3<f64> {
    Vector3::new(FRAC_PI_2, 135.0_f64.to_radians(), 0.0)
}

// ---------------------------------------------------------------------------
// Drone: the only mobile terminal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Drone {
    terminal: Terminal,
    offsets: Vec<f64>, // one boresight offset per antenna, rad
    pub policy: MovementPolicy,
    pub estimator: AoaEstimator,
    pub step_length: f64,
}

impl Drone {
    pub fn pose(&self) -> &Pose {
        &self.terminal.pose
    }

    pub fn pose_mut(&mut self) -> &mut Pose {
        &mut self.terminal.pose
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    /// Sample storage for scans. Antennas cannot be added or removed through
    /// it, so the array keeps one antenna per configured offset.
    pub(crate) fn terminal_mut(&mut self) -> &mut Terminal {
        &mut self.terminal
    }

    pub fn antenna_offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn antenna_count(&self) -> usize {
        self.terminal.antennas().len()
    }

    /// Current (index, boresight offset, rss) per antenna, array order.
    pub fn readings(&self) -> Vec<Reading> {
        self.terminal
            .antennas()
            .iter()
            .zip(&self.offsets)
            .enumerate()
            .map(|(index, (ant, offset))| Reading { index, offset: *offset, rss: ant.rss() })
            .collect()
    }

    pub fn rss(&self) -> Vec<f64> {
        self.terminal.antennas().iter().map(|a| a.rss()).collect()
    }

    pub fn peak_rss(&self) -> f64 {
        self.terminal
            .antennas()
            .iter()
            .map(|a| a.rss())
            .fold(0.0_f64, f64::max)
    }

    /// Bearing of the strongest source from the last scan, body frame.
    pub fn aoa(&self) -> Result<f64> {
        self.estimator.estimate(&self.readings())
    }

    /// Translate in the horizontal plane toward a body-frame bearing.
    /// Altitude and orientation are left untouched.
    pub fn advance(&mut self, aoa: f64) -> Vector3<f64> {
        let heading = aoa + self.pose().u();
        let d = Vector3::new(heading.cos(), heading.sin(), 0.0) * self.step_length;
        self.terminal.pose.position += d;
        d
    }

    /// Run one step of the configured movement policy.
    pub fn routine<S: ChannelSimulator, W: std::io::Write>(
        &mut self,
        env: &mut EnvironmentRf<S, W>,
    ) -> Result<StepOutcome> {
        let policy = self.policy;
        policy.step(self, env)
    }
}

// ---------------------------------------------------------------------------
// Drone builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DroneBuilder {
    pose: Pose,
    offsets: Vec<f64>,
    boresight_bias: Vector3<f64>,
    policy: MovementPolicy,
    estimator: AoaEstimator,
    step_length: f64,
}

impl DroneBuilder {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            offsets: default_antenna_offsets(),
            boresight_bias: default_boresight_bias(),
            policy: MovementPolicy::default(),
            estimator: AoaEstimator::default(),
            step_length: DEFAULT_STEP_LENGTH,
        }
    }

    pub fn antenna_offsets(mut self, v: Vec<f64>) -> Self { self.offsets = v; self }
    pub fn boresight_bias(mut self, v: Vector3<f64>) -> Self { self.boresight_bias = v; self }
    pub fn policy(mut self, v: MovementPolicy) -> Self { self.policy = v; self }
    pub fn estimator(mut self, v: AoaEstimator) -> Self { self.estimator = v; self }
    pub fn step_length(mut self, v: f64) -> Self { self.step_length = v; self }

    pub fn build(self) -> Result<Drone> {
        if self.offsets.is_empty() {
            return Err(Error::InvalidConfig("drone needs at least one antenna".into()));
        }
        if !(self.step_length.is_finite() && self.step_length >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "step length must be a finite non-negative number, got {}",
                self.step_length
            )));
        }

        let mut terminal = Terminal::new(self.pose);
        for offset in &self.offsets {
            terminal.add_antenna(self.boresight_bias + Vector3::new(*offset, 0.0, 0.0));
        }

        Ok(Drone {
            terminal,
            offsets: self.offsets,
            policy: self.policy,
            estimator: self.estimator,
            step_length: self.step_length,
        })
    }
}
