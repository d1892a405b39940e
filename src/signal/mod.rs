pub mod antenna;

pub use antenna::{Antenna, SampleQuality, DEGENERATE_IQ_EPSILON};
