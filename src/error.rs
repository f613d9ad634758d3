//! Error types shared by the loader, the solvers and the output writer

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the crate
#[derive(Debug, Error)]
pub enum EmError {
    /// Config file missing, unreadable, malformed, or with an invalid parameter
    #[error("failed to load configuration: {0}")]
    ConfigLoad(String),

    /// Only 2D and 3D domains are supported
    #[error("invalid dimension {0}: only 2D and 3D domains are supported")]
    InvalidDimension(usize),

    /// A particle or wire was placed outside the domain
    #[error("{kind} {index} at ({x}, {y}) lies outside [-{bound}, {bound}]")]
    OutOfBounds {
        kind: &'static str,
        index: usize,
        x: f64,
        y: f64,
        bound: f64,
    },

    /// Zero separation between a sample point and a source, or two particles
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Could not open, read or write a file
    #[error("I/O error on {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EmError {
    pub(crate) fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo { path: path.into(), source }
    }
}

pub type EmResult<T> = Result<T, EmError>;
