pub mod pose;
pub mod terminal;
pub mod drone;
pub mod scenario;

pub use pose::Pose;
pub use terminal::{Terminal, TerminalId};
pub use drone::{default_antenna_offsets, default_boresight_bias, Drone, DroneBuilder};
pub use scenario::{presets, Roles, Scenario};
