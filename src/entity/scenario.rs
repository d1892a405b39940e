use serde::{Deserialize, Serialize};

use super::drone::{Drone, DroneBuilder};
use super::pose::Pose;
use super::terminal::{Terminal, TerminalId};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Roles: which terminal plays which part, resolved once at setup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    pub base_station: TerminalId,
    pub user: TerminalId,
}

impl Default for Roles {
    fn default() -> Self {
        Self { base_station: TerminalId(0), user: TerminalId(1) }
    }
}

impl Roles {
    pub fn validate(&self, terminal_count: usize) -> Result<()> {
        for id in [self.base_station, self.user] {
            if id.index() >= terminal_count {
                return Err(Error::UnknownTerminal { index: id.index(), count: terminal_count });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scenario: static terminals + drone initial conditions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub terminals: Vec<Terminal>,
    pub roles: Roles,
    pub drone: DroneBuilder,
}

impl Scenario {
    pub fn new(name: impl Into<String>, terminals: Vec<Terminal>, drone: DroneBuilder) -> Self {
        Self { name: name.into(), terminals, roles: Roles::default(), drone }
    }

    pub fn roles(mut self, roles: Roles) -> Self {
        self.roles = roles;
        self
    }

    /// Check roles against the terminal list and build the drone.
    pub fn into_parts(self) -> Result<(Vec<Terminal>, Roles, Drone)> {
        self.roles.validate(self.terminals.len())?;
        let drone = self.drone.build()?;
        Ok((self.terminals, self.roles, drone))
    }
}

// ---------------------------------------------------------------------------
// Preset scenarios
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;
    use crate::aoa::AoaEstimator;
    use crate::policy::MovementPolicy;

    /// Elevated base station, four ground users, drone at 100 m.
    pub fn campus() -> Scenario {
        let terminals = [
            [96.0, 69.0, 200.0],  // base station
            [325.0, 250.0, 2.0],  // user 1
            [425.0, 150.0, 2.0],
            [225.0, 350.0, 2.0],
            [225.0, 50.0, 2.0],
        ]
        .iter()
        .map(|p| Terminal::base_station(Pose::new(p[0], p[1], p[2], 0.0, 0.0, 0.0)))
        .collect();

        let drone = DroneBuilder::new(Pose::new(176.0, 290.0, 100.0, 0.0, 0.0, 0.0))
            .policy(MovementPolicy::Optimize)
            .estimator(AoaEstimator::MaxRss);

        Scenario::new("campus", terminals, drone)
    }
}
