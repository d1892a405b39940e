use std::f64::consts::{PI, TAU};

use num_complex::Complex64;

use super::id::SimulationId;
use super::simulator::ChannelSimulator;
use crate::entity::{default_boresight_bias, Pose};
use crate::error::SimulatorError;

/// 2.4 GHz carrier.
pub const DEFAULT_WAVELENGTH: f64 = 0.125;

/// Element gain floor behind the boresight (-30 dB).
pub const DEFAULT_BACK_LOBE: f64 = 1e-3;

// ---------------------------------------------------------------------------
// Free-space line-of-sight channel
// ---------------------------------------------------------------------------

/// Analytic stand-in for a ray tracer: one line-of-sight path, Friis
/// amplitude, carrier phase and a cos² azimuth element pattern.
///
/// Receiver azimuth is `u - azimuth_reference`, so a drone element mounted
/// with the default boresight bias points along its configured offset.
/// Elevation and roll are ignored.
#[derive(Debug, Clone)]
pub struct FreeSpaceChannel {
    pub wavelength: f64,
    pub azimuth_reference: f64,
    pub back_lobe: f64,
    transmitter: Option<Pose>,
    receiver: Option<Pose>,
}

impl FreeSpaceChannel {
    pub fn new(wavelength: f64) -> Self {
        Self {
            wavelength,
            azimuth_reference: default_boresight_bias().x,
            back_lobe: DEFAULT_BACK_LOBE,
            transmitter: None,
            receiver: None,
        }
    }

    pub fn azimuth_reference(mut self, v: f64) -> Self {
        self.azimuth_reference = v;
        self
    }

    /// Power gain of the receiving element toward a world bearing.
    fn element_gain(&self, receiver: &Pose, bearing: f64) -> f64 {
        let boresight = receiver.u() - self.azimuth_reference;
        // wrap to [-pi, pi)
        let delta = (bearing - boresight + PI).rem_euclid(TAU) - PI;
        let c = delta.cos().max(0.0);
        (c * c).max(self.back_lobe)
    }
}

impl Default for FreeSpaceChannel {
    fn default() -> Self {
        Self::new(DEFAULT_WAVELENGTH)
    }
}

impl ChannelSimulator for FreeSpaceChannel {
    fn set_transmitter_pose(&mut self, pose: &Pose) -> Result<(), SimulatorError> {
        self.transmitter = Some(*pose);
        Ok(())
    }

    fn set_receiver_pose(&mut self, pose: &Pose) -> Result<(), SimulatorError> {
        self.receiver = Some(*pose);
        Ok(())
    }

    fn simulate(&mut self, id: &SimulationId) -> Result<Complex64, SimulatorError> {
        let (Some(tx), Some(rx)) = (self.transmitter, self.receiver) else {
            return Err(SimulatorError::Backend(format!("{}: poses not set", id)));
        };

        let path = tx.position - rx.position;
        let distance = path.norm();
        if distance < 1e-9 {
            return Err(SimulatorError::Backend(format!(
                "{}: transmitter and receiver coincide",
                id
            )));
        }

        let bearing = path.y.atan2(path.x);
        let gain = self.element_gain(&rx, bearing);
        let amplitude = gain.sqrt() * self.wavelength / (4.0 * PI * distance);
        let phase = -TAU * distance / self.wavelength;

        Ok(Complex64::from_polar(amplitude, phase))
    }

    fn name(&self) -> &str {
        "free-space"
    }
}
