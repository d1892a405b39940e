//! Run configuration, loadable from a JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::aoa::AoaEstimator;
use crate::channel::DEFAULT_WAVELENGTH;
use crate::entity::{presets, DroneBuilder, Pose, Roles, Scenario, Terminal};
use crate::error::{Error, Result};
use crate::policy::{MovementPolicy, DEFAULT_STEP_LENGTH};

pub const DEFAULT_ITERATIONS: u64 = 12;
pub const DEFAULT_OUTPUT_DIR: &str = "/tmp/result";
pub const DEFAULT_LOG_FILE: &str = "flight.csv";
pub const DEFAULT_SUMMARY_FILE: &str = "summary.json";
pub const DEFAULT_SIMULATOR_TIMEOUT_MS: u64 = 30_000;

/// Terminal layout overriding the built-in preset. Poses are
/// `[x, y, z, u, v, w]` with angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default = "default_scenario_name")]
    pub name: String,
    pub terminals: Vec<[f64; 6]>,
    pub drone: [f64; 6],
    #[serde(default)]
    pub roles: Roles,
}

fn default_scenario_name() -> String {
    "custom".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub iterations: u64,
    pub output_dir: PathBuf,
    pub log_file: String,
    /// Movement policy name, checked by [`SimConfig::validate`].
    pub routine: String,
    /// AoA estimator name, checked by [`SimConfig::validate`].
    pub aoa: String,
    pub antenna_offsets_deg: Vec<f64>,
    pub boresight_bias_deg: [f64; 3],
    pub step_length: f64,
    pub simulator_timeout_ms: u64,
    /// Carrier wavelength for the built-in free-space channel.
    pub wavelength: f64,
    pub scenario: Option<ScenarioConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_file: DEFAULT_LOG_FILE.into(),
            routine: MovementPolicy::Optimize.name().into(),
            aoa: AoaEstimator::MaxRss.name().into(),
            antenna_offsets_deg: vec![0.0, 90.0, 180.0, 270.0],
            boresight_bias_deg: [90.0, 135.0, 0.0],
            step_length: DEFAULT_STEP_LENGTH,
            simulator_timeout_ms: DEFAULT_SIMULATOR_TIMEOUT_MS,
            wavelength: DEFAULT_WAVELENGTH,
            scenario: None,
        }
    }
}

impl SimConfig {
    /// Read and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn policy(&self) -> Result<MovementPolicy> {
        self.routine.parse()
    }

    pub fn estimator(&self) -> Result<AoaEstimator> {
        self.aoa.parse()
    }

    pub fn simulator_timeout(&self) -> Duration {
        Duration::from_millis(self.simulator_timeout_ms)
    }

    pub fn boresight_bias(&self) -> Vector3<f64> {
        let [u, v, w] = self.boresight_bias_deg;
        Vector3::new(u.to_radians(), v.to_radians(), w.to_radians())
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(DEFAULT_SUMMARY_FILE)
    }

    /// Reject anything that would otherwise surface mid-run.
    pub fn validate(&self) -> Result<()> {
        self.policy()?;
        self.estimator()?;

        if self.antenna_offsets_deg.is_empty() {
            return Err(Error::InvalidConfig("antenna_offsets_deg must not be empty".into()));
        }
        if self.antenna_offsets_deg.iter().any(|o| !o.is_finite()) {
            return Err(Error::InvalidConfig("antenna offsets must be finite".into()));
        }
        if !(self.step_length.is_finite() && self.step_length >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "step_length must be a non-negative number, got {}",
                self.step_length
            )));
        }
        if self.simulator_timeout_ms == 0 {
            return Err(Error::InvalidConfig("simulator_timeout_ms must be positive".into()));
        }
        if !(self.wavelength.is_finite() && self.wavelength > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "wavelength must be positive, got {}",
                self.wavelength
            )));
        }
        if self.log_file.is_empty() {
            return Err(Error::InvalidConfig("log_file must not be empty".into()));
        }
        if let Some(s) = &self.scenario {
            s.roles.validate(s.terminals.len())?;
        }
        Ok(())
    }

    /// Scenario to run: the override if present, the campus preset
    /// otherwise, with this configuration's drone settings applied.
    pub fn scenario(&self) -> Result<Scenario> {
        let base = match &self.scenario {
            Some(s) => {
                let terminals = s
                    .terminals
                    .iter()
                    .map(|c| Terminal::base_station(Pose::from_degrees(*c)))
                    .collect();
                Scenario::new(s.name.clone(), terminals, DroneBuilder::new(Pose::from_degrees(s.drone)))
                    .roles(s.roles)
            }
            None => presets::campus(),
        };

        let offsets = self.antenna_offsets_deg.iter().map(|d| d.to_radians()).collect();
        let drone = base
            .drone
            .antenna_offsets(offsets)
            .boresight_bias(self.boresight_bias())
            .policy(self.policy()?)
            .estimator(self.estimator()?)
            .step_length(self.step_length);

        Ok(Scenario { drone, ..base })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TerminalId;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let c = SimConfig::default();
        c.validate().unwrap();
        assert_eq!(c.iterations, 12);
        assert_eq!(c.log_path(), PathBuf::from("/tmp/result/flight.csv"));
    }

    #[test]
    fn unknown_routine_rejected_up_front() {
        let c = SimConfig { routine: "circle".into(), ..SimConfig::default() };
        match c.validate() {
            Err(Error::UnsupportedAlgorithm { kind, name, .. }) => {
                assert_eq!(kind, "movement policy");
                assert_eq!(name, "circle");
            }
            other => panic!("expected UnsupportedAlgorithm, got {:?}", other),
        }
    }

    #[test]
    fn unknown_estimator_rejected_up_front() {
        let c = SimConfig { aoa: "music".into(), ..SimConfig::default() };
        assert!(matches!(c.validate(), Err(Error::UnsupportedAlgorithm { .. })));
    }

    #[test]
    fn empty_array_rejected() {
        let c = SimConfig { antenna_offsets_deg: vec![], ..SimConfig::default() };
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn load_partial_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{
                "iterations": 5,
                "routine": "locate",
                "aoa": "weighted-rss",
                "antenna_offsets_deg": [0, 45, 90, 135, 180, 225, 270, 315],
                "scenario": {{
                    "terminals": [[0, 0, 30, 0, 0, 0], [300, 0, 2, 0, 0, 0]],
                    "drone": [100, 100, 50, 0, 0, 0]
                }}
            }}"#
        )
        .unwrap();

        let c = SimConfig::load(f.path()).unwrap();
        assert_eq!(c.iterations, 5);
        assert_eq!(c.step_length, DEFAULT_STEP_LENGTH);

        let (terminals, roles, drone) = c.scenario().unwrap().into_parts().unwrap();
        assert_eq!(terminals.len(), 2);
        assert_eq!(roles.user, TerminalId(1));
        assert_eq!(drone.antenna_count(), 8);
        assert_eq!(drone.policy, MovementPolicy::Locate);
        assert_eq!(drone.estimator, AoaEstimator::WeightedRss);
        assert_eq!(drone.pose().x(), 100.0);
    }

    #[test]
    fn unknown_field_is_an_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{ "iterashuns": 5 }}"#).unwrap();
        assert!(matches!(SimConfig::load(f.path()), Err(Error::Json(_))));
    }

    #[test]
    fn scenario_roles_checked() {
        let c = SimConfig {
            scenario: Some(ScenarioConfig {
                name: "tiny".into(),
                terminals: vec![[0.0; 6]],
                drone: [10.0, 0.0, 50.0, 0.0, 0.0, 0.0],
                roles: Roles::default(),
            }),
            ..SimConfig::default()
        };
        assert!(matches!(c.validate(), Err(Error::UnknownTerminal { index: 1, count: 1 })));
    }
}
