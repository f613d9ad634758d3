//! Delimited-text snapshots of the grid and its field samples
//!
//! One line per grid point, written in a single pass:
//!
//! ```text
//! x,y[,z],|E|,Ex,Ey[,Ez],|B|,Bx,By[,Bz]
//! ```
//!
//! A field that was not computed for the run (no charges, or no wires)
//! contributes no columns. Floats use Rust's shortest round-trip formatting,
//! so [`read_snapshot`] recovers the written values exactly

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{EmError, EmResult};
use crate::simulation::states::{FieldSample, Point};

pub const DELIMITER: char = ',';
pub const EXTENSION: &str = "txt";

/// Borrowed view of everything one output file contains
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a, const D: usize> {
    pub grid: &'a [Point<D>],
    pub e_field: &'a [FieldSample<D>],
    pub b_field: &'a [FieldSample<D>],
}

impl<'a, const D: usize> Snapshot<'a, D> {
    /// Grid coordinates only
    pub fn grid_only(grid: &'a [Point<D>]) -> Self {
        Self { grid, e_field: &[], b_field: &[] }
    }
}

/// Write `snap` as delimited text
pub fn write_snapshot<W: Write, const D: usize>(mut w: W, snap: &Snapshot<'_, D>) -> io::Result<()> {
    let fields: Vec<&[FieldSample<D>]> = [snap.e_field, snap.b_field]
        .into_iter()
        .filter(|f| !f.is_empty())
        .collect();

    for (idx, point) in snap.grid.iter().enumerate() {
        write_components(&mut w, point.iter(), true)?;
        for field in &fields {
            // Fields always match the grid length once computed.
            let sample = &field[idx];
            write!(w, "{DELIMITER}{}", sample.magnitude)?;
            write_components(&mut w, sample.direction.iter(), false)?;
        }
        writeln!(w)?;
    }
    w.flush()
}

fn write_components<'c, W: Write>(
    w: &mut W,
    values: impl Iterator<Item = &'c f64>,
    leading: bool,
) -> io::Result<()> {
    for (i, v) in values.enumerate() {
        if i > 0 || !leading {
            write!(w, "{DELIMITER}")?;
        }
        write!(w, "{v}")?;
    }
    Ok(())
}

/// One parsed line: the grid point and its field samples in column order
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow<const D: usize> {
    pub point: Point<D>,
    pub fields: Vec<FieldSample<D>>,
}

/// Parse a snapshot written by [`write_snapshot`] for a `D`-dimensional grid
pub fn read_snapshot<R: BufRead, const D: usize>(reader: R) -> EmResult<Vec<SnapshotRow<D>>> {
    let mut rows = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| EmError::file_io("<snapshot>", e))?;
        if line.trim().is_empty() {
            continue;
        }
        let values = line
            .split(DELIMITER)
            .map(|s| s.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| malformed(line_no, &e.to_string()))?;

        if values.len() < D || (values.len() - D) % (D + 1) != 0 {
            return Err(malformed(line_no, &format!("unexpected column count {}", values.len())));
        }

        let point = Point::<D>::from_column_slice(&values[..D]);
        let fields = values[D..]
            .chunks_exact(D + 1)
            .map(|c| FieldSample {
                magnitude: c[0],
                direction: Point::<D>::from_column_slice(&c[1..]),
            })
            .collect();
        rows.push(SnapshotRow { point, fields });
    }
    Ok(rows)
}

fn malformed(line_no: usize, msg: &str) -> EmError {
    EmError::FileIo {
        path: PathBuf::from("<snapshot>"),
        source: io::Error::new(io::ErrorKind::InvalidData, format!("line {}: {msg}", line_no + 1)),
    }
}

/// Destination for named snapshots emitted by the run controller
pub trait SnapshotSink {
    fn write<const D: usize>(&mut self, name: &str, snap: &Snapshot<'_, D>) -> EmResult<()>;
}

/// Writes each snapshot to `<dir>/<name>.txt`
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Creates `dir` if it does not exist
    pub fn new(dir: impl Into<PathBuf>) -> EmResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| EmError::file_io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{EXTENSION}"))
    }
}

impl SnapshotSink for FileSink {
    fn write<const D: usize>(&mut self, name: &str, snap: &Snapshot<'_, D>) -> EmResult<()> {
        let path = self.path_for(name);
        let file = File::create(&path).map_err(|e| EmError::file_io(&path, e))?;
        write_snapshot(BufWriter::new(file), snap).map_err(|e| EmError::file_io(&path, e))?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}

/// Keeps rendered snapshots in memory, in emission order
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub snapshots: Vec<(String, String)>,
}

impl MemorySink {
    pub fn names(&self) -> Vec<&str> {
        self.snapshots.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.snapshots
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, text)| text.as_str())
    }
}

impl SnapshotSink for MemorySink {
    fn write<const D: usize>(&mut self, name: &str, snap: &Snapshot<'_, D>) -> EmResult<()> {
        let mut buf = Vec::new();
        write_snapshot(&mut buf, snap).map_err(|e| EmError::file_io(name, e))?;
        let text = String::from_utf8(buf).map_err(|e| {
            EmError::file_io(name, io::Error::new(io::ErrorKind::InvalidData, e))
        })?;
        self.snapshots.push((name.to_string(), text));
        Ok(())
    }
}

/// Read a snapshot file back from disk
pub fn read_snapshot_file<const D: usize>(path: impl AsRef<Path>) -> EmResult<Vec<SnapshotRow<D>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| EmError::file_io(path, e))?;
    read_snapshot(BufReader::new(file))
}
