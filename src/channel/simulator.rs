use num_complex::Complex64;

use super::id::SimulationId;
use crate::entity::Pose;
use crate::error::SimulatorError;

/// External channel simulator (ray tracer or analytic model).
///
/// The environment sets the transmitter pose once per scan, then for every
/// drone antenna sets the receiver pose and asks for one baseband sample.
/// Requests are addressed by an explicit [`SimulationId`], never by implicit
/// session state.
pub trait ChannelSimulator {
    fn set_transmitter_pose(&mut self, pose: &Pose) -> Result<(), SimulatorError>;

    fn set_receiver_pose(&mut self, pose: &Pose) -> Result<(), SimulatorError>;

    /// Simulate the link for the current poses and return the IQ sample.
    fn simulate(&mut self, id: &SimulationId) -> Result<Complex64, SimulatorError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<S: ChannelSimulator + ?Sized> ChannelSimulator for Box<S> {
    fn set_transmitter_pose(&mut self, pose: &Pose) -> Result<(), SimulatorError> {
        (**self).set_transmitter_pose(pose)
    }

    fn set_receiver_pose(&mut self, pose: &Pose) -> Result<(), SimulatorError> {
        (**self).set_receiver_pose(pose)
    }

    fn simulate(&mut self, id: &SimulationId) -> Result<Complex64, SimulatorError> {
        (**self).simulate(id)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
