pub mod id;
pub mod simulator;
pub mod deadline;
pub mod free_space;
pub mod scripted;

pub use id::SimulationId;
pub use simulator::ChannelSimulator;
pub use deadline::DeadlineSimulator;
pub use free_space::{FreeSpaceChannel, DEFAULT_WAVELENGTH};
pub use scripted::ScriptedChannel;
