use std::io::Write;

use tracing::trace;

use crate::channel::{ChannelSimulator, SimulationId};
use crate::entity::{Drone, Roles, Terminal, TerminalId};
use crate::error::{Error, Result, SimulatorError};
use crate::io::csv::{FlightLog, LogRow};
use crate::signal::SampleQuality;

// ---------------------------------------------------------------------------
// EnvironmentRF: static terminals, simulation clock, channel, flight log
// ---------------------------------------------------------------------------

pub struct EnvironmentRf<S, W: Write> {
    terminals: Vec<Terminal>,
    roles: Roles,
    time: u64,
    simulator: S,
    log: FlightLog<W>,
    degenerate_samples: usize,
}

impl<S: ChannelSimulator, W: Write> EnvironmentRf<S, W> {
    /// Set up the environment and write the flight-log header sized for `drone`.
    pub fn new(
        terminals: Vec<Terminal>,
        roles: Roles,
        simulator: S,
        writer: W,
        drone: &Drone,
    ) -> Result<Self> {
        roles.validate(terminals.len())?;
        let log = FlightLog::new(writer, terminals.len(), drone.antenna_count())?;
        Ok(Self { terminals, roles, time: 0, simulator, log, degenerate_samples: 0 })
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn inc_time(&mut self) {
        self.time += 1;
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Rows written so far (one per scan).
    pub fn rows(&self) -> usize {
        self.log.rows()
    }

    pub fn degenerate_samples(&self) -> usize {
        self.degenerate_samples
    }

    /// Simulate the signal of one transmitter on every drone antenna, store
    /// the samples and append one log row.
    ///
    /// A simulator failure, or a sample that is not finite, returns before
    /// the row is written, so the log never holds a row built from a partial
    /// scan.
    pub fn scan(&mut self, drone: &mut Drone, transmitter: TerminalId) -> Result<()> {
        let tx_idx = transmitter.index();
        let tx = self
            .terminals
            .get(tx_idx)
            .ok_or(Error::UnknownTerminal { index: tx_idx, count: self.terminals.len() })?;
        let scan_id = SimulationId::scan(tx_idx, self.time);

        self.simulator
            .set_transmitter_pose(&tx.transmit_pose())
            .map_err(|source| Error::Simulator { id: scan_id.to_string(), source })?;

        let body = *drone.pose();
        for (i, ant) in drone.terminal_mut().antennas_mut().iter_mut().enumerate() {
            let id = SimulationId::sample(tx_idx, self.time, i);
            let fail = |source: SimulatorError| Error::Simulator { id: id.to_string(), source };

            self.simulator
                .set_receiver_pose(&body.offset_by(ant.mounting()))
                .map_err(fail)?;
            let iq = self.simulator.simulate(&id).map_err(fail)?;
            if !(iq.re.is_finite() && iq.im.is_finite()) {
                return Err(fail(SimulatorError::Backend(format!(
                    "non-finite sample ({}, {})",
                    iq.re, iq.im
                ))));
            }
            trace!(%id, re = iq.re, im = iq.im, "sample");

            if ant.set_iq(iq) == SampleQuality::Degenerate {
                self.degenerate_samples += 1;
            }
        }

        let row = LogRow {
            time: self.time,
            scan: scan_id,
            drone: body,
            terminals: self.terminals.iter().map(|t| t.pose).collect(),
            rss: drone.rss(),
        };
        self.log.append(&row)?;
        Ok(())
    }

    /// Flush the log and hand back its writer.
    pub fn finish(mut self) -> Result<W> {
        self.log.flush()?;
        Ok(self.log.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ScriptedChannel;
    use crate::entity::{DroneBuilder, Pose};
    use crate::io::csv::read_flight_log;

    fn terminals() -> Vec<Terminal> {
        vec![
            Terminal::base_station(Pose::new(96.0, 69.0, 200.0, 0.0, 0.0, 0.0)),
            Terminal::base_station(Pose::new(325.0, 250.0, 2.0, 0.0, 0.0, 0.0)),
        ]
    }

    fn drone() -> Drone {
        DroneBuilder::new(Pose::new(176.0, 290.0, 100.0, 0.0, 0.0, 0.0)).build().unwrap()
    }

    #[test]
    fn scan_requests_every_antenna_and_logs_one_row() {
        let sim = ScriptedChannel::new().with_amplitudes(1, &[0.1, 0.9, 0.2, 0.05]);
        let mut drone = drone();
        let mut env = EnvironmentRf::new(terminals(), Roles::default(), sim, Vec::new(), &drone).unwrap();

        env.scan(&mut drone, TerminalId(1)).unwrap();
        assert_eq!(env.rows(), 1);

        let ids: Vec<String> = env.simulator().requests.iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, ["u01-t0000-ant00", "u01-t0000-ant01", "u01-t0000-ant02", "u01-t0000-ant03"]);
        assert_eq!(env.simulator().transmitter_poses, vec![terminals()[1].pose]);
        for (rx, ant) in env.simulator().receiver_poses.iter().zip(drone.terminal().antennas()) {
            assert_eq!(*rx, drone.pose().offset_by(ant.mounting()));
        }

        let rss = drone.rss();
        assert!((rss[1] - 0.81).abs() < 1e-12);

        let log = env.finish().unwrap();
        let rows = read_flight_log(log.as_slice()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].scan.to_string(), "u01-t0000-antXX");
        assert_eq!(rows[0].terminals.len(), 2);
        assert_eq!(rows[0].rss.len(), 4);
    }

    #[test]
    fn simulator_failure_writes_no_row() {
        let sim = ScriptedChannel::new()
            .with_amplitudes(1, &[0.1, 0.9, 0.2, 0.05])
            .fail_on("u01-t0000-ant02");
        let mut drone = drone();
        let mut env = EnvironmentRf::new(terminals(), Roles::default(), sim, Vec::new(), &drone).unwrap();

        match env.scan(&mut drone, TerminalId(1)) {
            Err(Error::Simulator { id, .. }) => assert_eq!(id, "u01-t0000-ant02"),
            other => panic!("expected simulator error, got {:?}", other),
        }
        assert_eq!(env.rows(), 0);
        let log = String::from_utf8(env.finish().unwrap()).unwrap();
        assert_eq!(log.lines().count(), 1);
    }

    #[test]
    fn non_finite_sample_aborts_the_scan() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let sim = ScriptedChannel::new().with_amplitudes(1, &[0.1, bad, 0.2, 0.05]);
            let mut drone = drone();
            let mut env = EnvironmentRf::new(terminals(), Roles::default(), sim, Vec::new(), &drone).unwrap();

            match env.scan(&mut drone, TerminalId(1)) {
                Err(Error::Simulator { id, source: SimulatorError::Backend(_) }) => {
                    assert_eq!(id, "u01-t0000-ant01")
                }
                other => panic!("expected simulator error for {}, got {:?}", bad, other),
            }
            assert_eq!(env.rows(), 0);
            assert!(drone.rss().iter().all(|r| r.is_finite()));
        }
    }

    #[test]
    fn zero_samples_are_clamped_and_counted() {
        let sim = ScriptedChannel::new().with_amplitudes(0, &[0.0, 0.0, 0.3, 0.0]);
        let mut drone = drone();
        let mut env = EnvironmentRf::new(terminals(), Roles::default(), sim, Vec::new(), &drone).unwrap();

        env.scan(&mut drone, TerminalId(0)).unwrap();
        assert_eq!(env.degenerate_samples(), 3);
        assert!(drone.rss().iter().all(|r| *r > 0.0 && r.is_finite()));
    }

    #[test]
    fn unknown_transmitter_rejected() {
        let mut drone = drone();
        let mut env =
            EnvironmentRf::new(terminals(), Roles::default(), ScriptedChannel::new(), Vec::new(), &drone)
                .unwrap();
        assert!(matches!(
            env.scan(&mut drone, TerminalId(7)),
            Err(Error::UnknownTerminal { index: 7, count: 2 })
        ));
    }

    #[test]
    fn time_only_moves_on_request() {
        let sim = ScriptedChannel::new().with_amplitudes(1, &[1.0; 4]).with_amplitudes(0, &[1.0; 4]);
        let mut drone = drone();
        let mut env = EnvironmentRf::new(terminals(), Roles::default(), sim, Vec::new(), &drone).unwrap();
        env.scan(&mut drone, TerminalId(1)).unwrap();
        env.scan(&mut drone, TerminalId(0)).unwrap();
        assert_eq!(env.time(), 0);
        env.inc_time();
        env.scan(&mut drone, TerminalId(1)).unwrap();
        assert_eq!(env.simulator().requests.last().unwrap().to_string(), "u01-t0001-ant03");
    }
}
