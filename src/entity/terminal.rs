use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::pose::Pose;
use crate::signal::Antenna;

/// Position of a terminal in the environment's terminal list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerminalId(pub usize);

impl TerminalId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Terminal: any radio endpoint with a pose and an ordered antenna array
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Terminal {
    pub pose: Pose,
    antennas: Vec<Antenna>, // mounting order; indices are used positionally
}

impl Terminal {
    pub fn new(pose: Pose) -> Self {
        Self { pose, antennas: Vec::new() }
    }

    /// Static endpoint (base station or user) with a single antenna at zero offset.
    pub fn base_station(pose: Pose) -> Self {
        let mut t = Self::new(pose);
        t.add_antenna(Vector3::zeros());
        t
    }

    pub(crate) fn add_antenna(&mut self, mounting: Vector3<f64>) {
        self.antennas.push(Antenna::new(mounting));
    }

    pub fn antennas(&self) -> &[Antenna] {
        &self.antennas
    }

    pub fn antennas_mut(&mut self) -> &mut [Antenna] {
        &mut self.antennas
    }

    /// Pose the first antenna radiates from, used when transmitting.
    pub fn transmit_pose(&self) -> Pose {
        match self.antennas.first() {
            Some(ant) => self.pose.offset_by(ant.mounting()),
            None => self.pose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_station_has_one_zero_antenna() {
        let bs = Terminal::base_station(Pose::new(96.0, 69.0, 200.0, 0.0, 0.0, 0.0));
        assert_eq!(bs.antennas().len(), 1);
        assert_eq!(*bs.antennas()[0].mounting(), Vector3::zeros());
        assert_eq!(bs.transmit_pose(), bs.pose);
    }

    #[test]
    fn id_displays_as_log_prefix() {
        assert_eq!(TerminalId(3).to_string(), "user-3");
    }
}
