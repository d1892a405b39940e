use std::io::Write;

use tracing::{debug, info};

use super::environment::EnvironmentRf;
use crate::channel::ChannelSimulator;
use crate::entity::{Drone, Pose, Scenario};
use crate::error::Result;
use crate::policy::StepOutcome;

// ---------------------------------------------------------------------------
// Fixed-count simulation loop
// ---------------------------------------------------------------------------

/// Run `iterations - 1` policy steps. Iteration 0 is the unmoved initial
/// state and triggers no scan. There is no early exit; the first error aborts
/// the run.
pub fn simulate<S: ChannelSimulator, W: Write>(
    env: &mut EnvironmentRf<S, W>,
    drone: &mut Drone,
    iterations: u64,
) -> Result<Vec<StepOutcome>> {
    let steps = iterations.saturating_sub(1);
    let mut outcomes = Vec::with_capacity(steps as usize);

    for i in 1..iterations {
        debug!(iteration = i, time = env.time(), "iteration");
        outcomes.push(drone.routine(env)?);
        env.inc_time();
    }

    Ok(outcomes)
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunOutput<W> {
    pub scenario: String,
    pub initial_pose: Pose,
    pub drone: Drone,
    pub outcomes: Vec<StepOutcome>,
    pub rows: usize,
    pub degenerate_samples: usize,
    pub writer: W,
}

/// Build the environment for a scenario and run it to completion.
pub fn simulate_scenario<S: ChannelSimulator, W: Write>(
    scenario: Scenario,
    simulator: S,
    writer: W,
    iterations: u64,
) -> Result<RunOutput<W>> {
    let name = scenario.name.clone();
    let (terminals, roles, mut drone) = scenario.into_parts()?;
    let initial_pose = *drone.pose();

    info!(
        scenario = %name,
        simulator = simulator.name(),
        policy = %drone.policy,
        estimator = %drone.estimator,
        antennas = drone.antenna_count(),
        iterations,
        "starting run"
    );

    let mut env = EnvironmentRf::new(terminals, roles, simulator, writer, &drone)?;
    let outcomes = simulate(&mut env, &mut drone, iterations)?;
    let rows = env.rows();
    let degenerate_samples = env.degenerate_samples();
    let writer = env.finish()?;

    info!(steps = outcomes.len(), rows, "run complete");

    Ok(RunOutput {
        scenario: name,
        initial_pose,
        drone,
        outcomes,
        rows,
        degenerate_samples,
        writer,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
