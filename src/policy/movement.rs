use std::fmt;
use std::io::Write;
use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channel::ChannelSimulator;
use crate::entity::{Drone, TerminalId};
use crate::error::{Error, Result};
use crate::sim::EnvironmentRf;

/// Horizontal distance covered per step.
pub const DEFAULT_STEP_LENGTH: f64 = 20.0;

/// Bearing and strength measured toward one transmitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkEstimate {
    pub source: TerminalId,
    pub aoa: f64,
    pub peak_rss: f64,
}

/// What one policy step measured and did.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub time: u64,
    pub links: Vec<LinkEstimate>, // scan order
    pub followed: TerminalId,
    pub displacement: Vector3<f64>,
}

impl StepOutcome {
    pub fn followed_link(&self) -> Option<&LinkEstimate> {
        self.links.iter().find(|l| l.source == self.followed)
    }
}

// ---------------------------------------------------------------------------
// Movement policy selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementPolicy {
    /// Fly toward the user.
    #[default]
    Locate,
    /// Fly toward whichever of user / base station is received stronger.
    Optimize,
}

impl MovementPolicy {
    pub const NAMES: &'static str = "locate, optimize";

    pub fn name(&self) -> &'static str {
        match self {
            MovementPolicy::Locate => "locate",
            MovementPolicy::Optimize => "optimize",
        }
    }

    /// Scan, estimate, and move the drone once.
    pub fn step<S: ChannelSimulator, W: Write>(
        &self,
        drone: &mut Drone,
        env: &mut EnvironmentRf<S, W>,
    ) -> Result<StepOutcome> {
        let roles = *env.roles();
        let time = env.time();

        let links = match self {
            MovementPolicy::Locate => vec![measure(drone, env, roles.user)?],
            MovementPolicy::Optimize => vec![
                measure(drone, env, roles.user)?,
                measure(drone, env, roles.base_station)?,
            ],
        };

        let target = strongest(&links).ok_or(Error::EmptyReadings)?;
        let displacement = drone.advance(target.aoa);
        debug!(
            policy = self.name(),
            followed = %target.source,
            x = drone.pose().x(),
            y = drone.pose().y(),
            "drone moved"
        );

        Ok(StepOutcome { time, followed: target.source, links, displacement })
    }
}

/// Strongest link; on equal peak rss the earlier scan wins.
fn strongest(links: &[LinkEstimate]) -> Option<LinkEstimate> {
    links.iter().copied().fold(None, |best, l| match best {
        Some(b) if b.peak_rss >= l.peak_rss => Some(b),
        _ => Some(l),
    })
}

fn measure<S: ChannelSimulator, W: Write>(
    drone: &mut Drone,
    env: &mut EnvironmentRf<S, W>,
    source: TerminalId,
) -> Result<LinkEstimate> {
    env.scan(drone, source)?;
    let aoa = drone.aoa()?;
    let peak_rss = drone.peak_rss();
    debug!(
        source = %source,
        aoa_deg = aoa.to_degrees(),
        rss = peak_rss,
        "link estimate"
    );
    Ok(LinkEstimate { source, aoa, peak_rss })
}

impl fmt::Display for MovementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for MovementPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "locate" => Ok(MovementPolicy::Locate),
            "optimize" => Ok(MovementPolicy::Optimize),
            other => Err(Error::UnsupportedAlgorithm {
                kind: "movement policy",
                name: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}
