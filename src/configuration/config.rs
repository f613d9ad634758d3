//! Configuration types for loading a simulation from JSON
//!
//! This module defines a thin, `serde`-deserializable representation of the
//! input document and the validated, immutable [`SimulationConfig`] built
//! from it. A document consists of:
//!
//! - domain keys: `dim`, `bound`, `numPoints` (required)
//! - run keys: `output filename`, `periodic`, `numSteps`, `dt` (optional)
//! - [`ParticleConfig`] entries under `particles`
//! - [`WireConfig`] entries under `wires`
//!
//! # JSON format
//!
//! ```json
//! {
//!   "dim": 2,
//!   "bound": 5.0,
//!   "numPoints": 100,
//!   "output filename": "dipole",
//!   "periodic": false,
//!   "numSteps": 200,
//!   "dt": 0.01,
//!   "particles": [
//!     {"charge": 1.0, "x": -1.0, "y": 0.0},
//!     {"charge": -1.0, "x": 1.0, "y": 0.0, "mass": 2.0, "vy": 0.5}
//!   ],
//!   "wires": [
//!     {"current": 1.0, "x": 0.0, "y": 2.0, "direction": {"x": 0.0, "y": 0.0, "z": 1.0}}
//!   ]
//! }
//! ```
//!
//! Particles or wires placed outside `[-bound, bound]²`, particles with a
//! non-positive mass, and wires with a zero direction are dropped with a
//! warning; everything else invalid is a fatal [`EmError::ConfigLoad`]

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use crate::error::{EmError, EmResult};
use crate::simulation::params::{Boundary, Parameters};
use crate::simulation::states::{ChargedParticle, InfiniteWire, NVec2, NVec3};

/// Raw 3-component vector as written in the document
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct VectorConfig {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Initial state of one charged particle
#[derive(Deserialize, Debug, Clone)]
pub struct ParticleConfig {
    pub charge: f64, // charge
    pub x: f64, // initial position
    pub y: f64,
    #[serde(default = "default_mass")]
    pub mass: f64, // defaults to 1
    #[serde(default)]
    pub vx: f64, // initial velocity, defaults to rest
    #[serde(default)]
    pub vy: f64,
    #[serde(default)]
    pub vz: f64,
}

/// One infinite straight wire
#[derive(Deserialize, Debug, Clone)]
pub struct WireConfig {
    pub current: f64, // current
    pub x: f64, // where the wire crosses the domain plane
    pub y: f64,
    pub direction: VectorConfig, // normalized on load
}

/// Top-level document as read from JSON
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    pub dim: usize,
    pub bound: f64,
    #[serde(rename = "numPoints")]
    pub num_points: usize,
    #[serde(rename = "output filename", default = "default_output")]
    pub output_filename: String,
    #[serde(default)]
    pub periodic: bool,
    #[serde(rename = "numSteps", default = "default_num_steps")]
    pub num_steps: usize,
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default)]
    pub particles: Vec<ParticleConfig>,
    #[serde(default)]
    pub wires: Vec<WireConfig>,
}

fn default_mass() -> f64 {
    1.0
}

fn default_output() -> String {
    "output".to_string()
}

fn default_num_steps() -> usize {
    1
}

fn default_dt() -> f64 {
    0.01
}

/// Validated, immutable simulation setup shared by grid, solver and integrator
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub dim: usize,
    pub num_points: usize,
    pub output_filename: String,
    pub parameters: Parameters,
    pub particles: Vec<ChargedParticle>,
    pub wires: Vec<InfiniteWire>,
}

impl SimulationConfig {
    pub fn bound(&self) -> f64 {
        self.parameters.bound
    }

    pub fn boundary(&self) -> Boundary {
        self.parameters.boundary
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> EmResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| EmError::file_io(path, e))?;
        info!("reading configuration from {}", path.display());
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> EmResult<Self> {
        let raw: ScenarioConfig =
            serde_json::from_reader(reader).map_err(|e| EmError::ConfigLoad(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn from_json_str(json: &str) -> EmResult<Self> {
        let raw: ScenarioConfig =
            serde_json::from_str(json).map_err(|e| EmError::ConfigLoad(e.to_string()))?;
        Self::try_from(raw)
    }
}

impl TryFrom<ScenarioConfig> for SimulationConfig {
    type Error = EmError;

    fn try_from(cfg: ScenarioConfig) -> EmResult<Self> {
        if cfg.dim != 2 && cfg.dim != 3 {
            return Err(EmError::InvalidDimension(cfg.dim));
        }
        if !(cfg.bound.is_finite() && cfg.bound > 0.0) {
            return Err(EmError::ConfigLoad(format!("bound must be positive, got {}", cfg.bound)));
        }
        if !(cfg.dt.is_finite() && cfg.dt > 0.0) {
            return Err(EmError::ConfigLoad(format!("dt must be positive, got {}", cfg.dt)));
        }

        let bound = cfg.bound;
        let inside = |x: f64, y: f64| x.abs() <= bound && y.abs() <= bound;

        let mut particles = Vec::with_capacity(cfg.particles.len());
        for (index, pc) in cfg.particles.iter().enumerate() {
            if !inside(pc.x, pc.y) {
                let err = EmError::OutOfBounds { kind: "particle", index, x: pc.x, y: pc.y, bound };
                warn!("{err}; skipping");
                continue;
            }
            if !(pc.mass > 0.0) {
                warn!("particle {index} has non-positive mass {}; skipping", pc.mass);
                continue;
            }
            particles.push(ChargedParticle {
                charge: pc.charge,
                mass: pc.mass,
                position: NVec2::new(pc.x, pc.y),
                velocity: NVec3::new(pc.vx, pc.vy, pc.vz),
            });
        }

        let mut wires = Vec::with_capacity(cfg.wires.len());
        for (index, wc) in cfg.wires.iter().enumerate() {
            if !inside(wc.x, wc.y) {
                let err = EmError::OutOfBounds { kind: "wire", index, x: wc.x, y: wc.y, bound };
                warn!("{err}; skipping");
                continue;
            }
            let d = wc.direction;
            match InfiniteWire::new(wc.current, NVec2::new(wc.x, wc.y), NVec3::new(d.x, d.y, d.z)) {
                Some(wire) => wires.push(wire),
                None => warn!("wire {index} has a zero direction vector; skipping"),
            }
        }

        info!(
            "loaded {}D domain, bound {}, {} particles, {} wires",
            cfg.dim,
            bound,
            particles.len(),
            wires.len()
        );

        Ok(Self {
            dim: cfg.dim,
            num_points: cfg.num_points,
            output_filename: cfg.output_filename,
            parameters: Parameters {
                bound,
                dt: cfg.dt,
                num_steps: cfg.num_steps,
                boundary: Boundary::from_periodic(cfg.periodic),
            },
            particles,
            wires,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn optional_keys_take_defaults() {
        let cfg = SimulationConfig::from_json_str(r#"{"dim": 2, "bound": 1.0, "numPoints": 4}"#).unwrap();
        assert_eq!(cfg.output_filename, "output");
        assert_eq!(cfg.parameters.num_steps, 1);
        assert_eq!(cfg.parameters.dt, 0.01);
        assert_eq!(cfg.boundary(), Boundary::Reflective);
        assert!(cfg.particles.is_empty());
        assert!(cfg.wires.is_empty());
    }

    #[test]
    fn particle_defaults_and_out_of_bounds_rejection() {
        let json = r#"{
            "dim": 2, "bound": 1.0, "numPoints": 2, "periodic": true,
            "particles": [
                {"charge": 1, "x": 0.0, "y": 0.5},
                {"charge": 1, "x": 1.5, "y": 0.0},
                {"charge": -2, "x": -1.0, "y": 1.0, "mass": 3.0, "vx": 0.1, "vz": 2.0},
                {"charge": 1, "x": 0.0, "y": 0.0, "mass": 0.0}
            ]
        }"#;
        let cfg = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.boundary(), Boundary::Periodic);
        assert_eq!(cfg.particles.len(), 2);
        assert_eq!(cfg.particles[0].mass, 1.0);
        assert_eq!(cfg.particles[0].velocity, NVec3::zeros());
        assert_eq!(cfg.particles[1].mass, 3.0);
        assert_eq!(cfg.particles[1].velocity, NVec3::new(0.1, 0.0, 2.0));
    }

    #[test]
    fn wire_direction_normalized_on_load() {
        let json = r#"{
            "dim": 2, "bound": 2.0, "numPoints": 2,
            "wires": [
                {"current": 2.0, "x": 0.5, "y": 0.5, "direction": {"x": 0.0, "y": 3.0, "z": 4.0}},
                {"current": 2.0, "x": 0.5, "y": 9.0, "direction": {"x": 0.0, "y": 0.0, "z": 1.0}}
            ]
        }"#;
        let cfg = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.wires.len(), 1);
        assert_relative_eq!(cfg.wires[0].direction.norm(), 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(cfg.wires[0].direction.z, 0.8, epsilon = 1.0e-12);
    }

    #[test]
    fn fatal_errors() {
        let bad_dim = SimulationConfig::from_json_str(r#"{"dim": 4, "bound": 1.0, "numPoints": 2}"#);
        assert!(matches!(bad_dim, Err(EmError::InvalidDimension(4))));

        let missing = SimulationConfig::from_json_str(r#"{"dim": 2, "numPoints": 2}"#);
        assert!(matches!(missing, Err(EmError::ConfigLoad(_))));

        let negative_points = SimulationConfig::from_json_str(r#"{"dim": 2, "bound": 1.0, "numPoints": -2}"#);
        assert!(matches!(negative_points, Err(EmError::ConfigLoad(_))));

        let bad_dt = SimulationConfig::from_json_str(r#"{"dim": 2, "bound": 1.0, "numPoints": 2, "dt": 0}"#);
        assert!(matches!(bad_dt, Err(EmError::ConfigLoad(_))));

        let missing_file = SimulationConfig::load("/definitely/not/here.json");
        assert!(matches!(missing_file, Err(EmError::FileIo { .. })));
    }
}
