use std::io::{self, BufRead, Write};

use crate::channel::SimulationId;
use crate::entity::Pose;
use crate::error::{Error, Result};

const POSE_FIELDS: [&str; 6] = ["x", "y", "z", "u", "v", "w"];

/// One flight-log row: the state right after one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub time: u64,
    pub scan: SimulationId,
    pub drone: Pose,
    pub terminals: Vec<Pose>, // construction order
    pub rss: Vec<f64>,        // drone array order
}

impl LogRow {
    /// Index of the terminal that transmitted during this scan.
    pub fn transmitter(&self) -> usize {
        self.scan.transmitter
    }

    pub fn peak_rss(&self) -> f64 {
        self.rss.iter().copied().fold(0.0_f64, f64::max)
    }
}

/// CSV header for a given terminal and antenna count.
///
/// Columns: time, simIdxs, drone.{x,y,z,u,v,w}, user-N.{x,y,z,u,v,w} per
/// terminal, ant.K per drone antenna. Readers locate columns by the `drone`,
/// `user-N.` and `ant` substrings, so names must not change.
pub fn header(terminal_count: usize, antenna_count: usize) -> String {
    fn expand(t: &str) -> Vec<String> {
        POSE_FIELDS.iter().map(|f| format!("{}.{}", t, f)).collect()
    }

    let mut cols: Vec<String> = vec!["time".into(), "simIdxs".into()];
    cols.extend(expand("drone"));
    for i in 0..terminal_count {
        cols.extend(expand(&format!("user-{}", i)));
    }
    cols.extend((0..antenna_count).map(|k| format!("ant.{}", k)));
    cols.join(",")
}

// ---------------------------------------------------------------------------
// FlightLog: append-only CSV sink
// ---------------------------------------------------------------------------

/// Append-only CSV sink. Floats are written with 16 decimals.
pub struct FlightLog<W: Write> {
    writer: W,
    terminal_count: usize,
    antenna_count: usize,
    rows: usize,
}

impl<W: Write> FlightLog<W> {
    /// Create the log and write its header.
    pub fn new(mut writer: W, terminal_count: usize, antenna_count: usize) -> io::Result<Self> {
        writeln!(writer, "{}", header(terminal_count, antenna_count))?;
        Ok(Self { writer, terminal_count, antenna_count, rows: 0 })
    }

    pub fn append(&mut self, row: &LogRow) -> io::Result<()> {
        if row.terminals.len() != self.terminal_count || row.rss.len() != self.antenna_count {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "row shape {}x{} does not match header {}x{}",
                    row.terminals.len(),
                    row.rss.len(),
                    self.terminal_count,
                    self.antenna_count
                ),
            ));
        }

        let mut line = format!("{},{}", row.time, row.scan);
        let poses = std::iter::once(&row.drone).chain(&row.terminals);
        for v in poses.flat_map(|p| p.components()).chain(row.rss.iter().copied()) {
            line.push_str(&format!(",{:.16}", v));
        }
        writeln!(self.writer, "{}", line)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

// ---------------------------------------------------------------------------
// Reading a log back
// ---------------------------------------------------------------------------

struct Columns {
    time: usize,
    scan: usize,
    drone: [usize; 6],
    terminals: Vec<[usize; 6]>,
    antennas: Vec<usize>,
}

fn pose_columns(names: &[&str], prefix: &str) -> Option<[usize; 6]> {
    let mut idx = [0usize; 6];
    for (slot, field) in idx.iter_mut().zip(POSE_FIELDS) {
        let name = format!("{}.{}", prefix, field);
        *slot = names.iter().position(|c| *c == name)?;
    }
    Some(idx)
}

fn discover_columns(line: &str) -> Result<Columns> {
    let bad = |reason: String| Error::MalformedLog { line: 1, reason };
    let names: Vec<&str> = line.split(',').map(str::trim).collect();

    let find = |name: &str| {
        names
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| bad(format!("missing column '{}'", name)))
    };
    let time = find("time")?;
    let scan = find("simIdxs")?;
    let drone = pose_columns(&names, "drone").ok_or_else(|| bad("incomplete drone pose".into()))?;

    let mut terminal_ids: Vec<usize> = names
        .iter()
        .filter_map(|c| c.strip_prefix("user-"))
        .filter_map(|c| c.split('.').next())
        .filter_map(|n| n.parse::<usize>().ok())
        .collect();
    terminal_ids.sort_unstable();
    terminal_ids.dedup();
    let terminals = terminal_ids
        .iter()
        .map(|n| {
            pose_columns(&names, &format!("user-{}", n))
                .ok_or_else(|| bad(format!("incomplete pose for user-{}", n)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut antennas: Vec<(usize, usize)> = names
        .iter()
        .enumerate()
        .filter(|(_, c)| c.contains("ant"))
        .filter_map(|(i, c)| c.strip_prefix("ant.").and_then(|k| k.parse::<usize>().ok()).map(|k| (k, i)))
        .collect();
    antennas.sort_unstable();

    Ok(Columns {
        time,
        scan,
        drone,
        terminals,
        antennas: antennas.into_iter().map(|(_, i)| i).collect(),
    })
}

/// Parse a flight log written by [`FlightLog`].
pub fn read_flight_log<R: BufRead>(reader: R) -> Result<Vec<LogRow>> {
    let mut lines = reader.lines();
    let header_line = lines
        .next()
        .ok_or(Error::MalformedLog { line: 1, reason: "empty log".into() })??;
    let cols = discover_columns(&header_line)?;

    let mut rows = Vec::new();
    for (n, line) in lines.enumerate() {
        let line_no = n + 2;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        let bad = |reason: String| Error::MalformedLog { line: line_no, reason };

        let field = |i: usize| fields.get(i).copied().ok_or_else(|| bad(format!("missing column {}", i)));
        let float = |i: usize| -> Result<f64> {
            let raw = field(i)?;
            raw.trim().parse::<f64>().map_err(|_| bad(format!("bad number '{}'", raw)))
        };
        let pose = |idx: &[usize; 6]| -> Result<Pose> {
            let mut c = [0.0; 6];
            for (slot, i) in c.iter_mut().zip(idx) {
                *slot = float(*i)?;
            }
            Ok(Pose::from_components(c))
        };

        let time_raw = field(cols.time)?;
        let time = time_raw
            .trim()
            .parse::<u64>()
            .map_err(|_| bad(format!("bad time '{}'", time_raw)))?;
        let scan = field(cols.scan)?
            .trim()
            .parse::<SimulationId>()
            .map_err(|e| bad(e.to_string()))?;

        rows.push(LogRow {
            time,
            scan,
            drone: pose(&cols.drone)?,
            terminals: cols.terminals.iter().map(&pose).collect::<Result<_>>()?,
            rss: cols.antennas.iter().map(|i| float(*i)).collect::<Result<_>>()?,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: u64, tx: usize, rss: Vec<f64>) -> LogRow {
        LogRow {
            time,
            scan: SimulationId::scan(tx, time),
            drone: Pose::new(176.0, 290.0, 100.0, 0.0, 0.0, 0.0),
            terminals: vec![
                Pose::new(96.0, 69.0, 200.0, 0.0, 0.0, 0.0),
                Pose::new(325.0, 250.0, 2.0, 0.0, 0.0, 0.0),
            ],
            rss,
        }
    }

    #[test]
    fn header_layout() {
        let h = header(2, 4);
        assert!(h.starts_with("time,simIdxs,drone.x,drone.y,drone.z,drone.u,drone.v,drone.w,user-0.x"));
        assert!(h.contains("user-1.w,ant.0,ant.1,ant.2,ant.3"));
        assert_eq!(h.split(',').count(), 2 + 6 * 3 + 4);
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut log = FlightLog::new(Vec::new(), 2, 2).unwrap();
        log.append(&row(0, 1, vec![0.25, 1e-24])).unwrap();
        log.append(&row(0, 0, vec![0.5, 0.125])).unwrap();
        assert_eq!(log.rows(), 2);

        let output = String::from_utf8(log.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0,u01-t0000-antXX,176.0000000000000000,"));
        assert!(lines[2].starts_with("0,u00-t0000-antXX,"));
        assert!(lines[1].ends_with(",0.2500000000000000,0.0000000000000000"));
    }

    #[test]
    fn wrong_row_shape_rejected() {
        let mut log = FlightLog::new(Vec::new(), 2, 4).unwrap();
        assert!(log.append(&row(0, 1, vec![1.0])).is_err());
        assert_eq!(log.rows(), 0);
    }

    #[test]
    fn reads_back_what_was_written() {
        let rss = vec![0.123_456_789_012_345_6, 0.9, 0.000_1, 3.0];
        let mut log = FlightLog::new(Vec::new(), 2, 4).unwrap();
        log.append(&row(7, 1, rss.clone())).unwrap();
        let buf = log.into_inner();

        let rows = read_flight_log(buf.as_slice()).unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.time, 7);
        assert_eq!(r.transmitter(), 1);
        assert_eq!(r.scan.to_string(), "u01-t0007-antXX");
        assert_eq!(r.terminals.len(), 2);
        for (got, want) in r.rss.iter().zip(&rss) {
            assert_eq!(format!("{:.16}", got), format!("{:.16}", want));
        }
    }

    #[test]
    fn malformed_number_reports_line() {
        let text = format!("{}\n0,u00-t0000-antXX,{}\n", header(0, 1), "a,".repeat(6) + "1.0");
        match read_flight_log(text.as_bytes()) {
            Err(Error::MalformedLog { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedLog, got {:?}", other),
        }
    }
}
