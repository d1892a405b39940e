//! UAV trajectory planner validation against a simulated radio channel.
//!
//! Each step the drone's antenna array is scanned against a fixed terminal
//! through a [`channel::ChannelSimulator`], the bearing of the strongest
//! signal is estimated ([`aoa`]), and a [`policy::MovementPolicy`] moves the
//! drone toward it. Every scan is appended to a CSV flight log ([`io`]).

pub mod error;
pub mod config;
pub mod signal;
pub mod entity;
pub mod aoa;
pub mod policy;
pub mod channel;
pub mod sim;
pub mod io;

pub use error::{Error, Result, SimulatorError};
