use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Identifier of one simulated sample, or of a whole scan when `antenna` is `None`.
///
/// Rendered as `u{tx:02}-t{time:04}-ant{antenna:02}` (`antXX` for a scan).
/// External tooling correlates samples and log rows through this format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimulationId {
    pub transmitter: usize,
    pub time: u64,
    pub antenna: Option<usize>,
}

impl SimulationId {
    pub fn sample(transmitter: usize, time: u64, antenna: usize) -> Self {
        Self { transmitter, time, antenna: Some(antenna) }
    }

    pub fn scan(transmitter: usize, time: u64) -> Self {
        Self { transmitter, time, antenna: None }
    }
}

impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{:02}-t{:04}-ant", self.transmitter, self.time)?;
        match self.antenna {
            Some(a) => write!(f, "{:02}", a),
            None => f.write_str("XX"),
        }
    }
}

impl FromStr for SimulationId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let malformed = |reason: &str| Error::MalformedSimulationId {
            id: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split('-');
        let (Some(u), Some(t), Some(ant), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed("expected three '-' separated fields"));
        };

        let transmitter = u
            .strip_prefix('u')
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or_else(|| malformed("bad transmitter field"))?;
        let time = t
            .strip_prefix('t')
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| malformed("bad time field"))?;
        let antenna = match ant.strip_prefix("ant") {
            Some("XX") => None,
            Some(v) => Some(v.parse::<usize>().map_err(|_| malformed("bad antenna field"))?),
            None => return Err(malformed("bad antenna field")),
        };

        Ok(Self { transmitter, time, antenna })
    }
}
