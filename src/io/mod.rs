pub mod csv;
pub mod json;
pub mod output;

pub use csv::{header, read_flight_log, FlightLog, LogRow};
pub use json::{write_summary, write_summary_file, RunSummary};
pub use output::run_to_directory;
