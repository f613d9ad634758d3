//! Core state types for the field and particle simulation
//!
//! Defines the sources placed in the domain and the per-grid-point field
//! summary:
//! - `ChargedParticle` / `System` (2D positions, 3D velocity)
//! - `InfiniteWire` (2D position, unit 3D direction)
//! - `FieldSample<D>` (magnitude + direction, one per grid point)

use nalgebra::{SVector, Vector2, Vector3};

pub type NVec2 = Vector2<f64>;
pub type NVec3 = Vector3<f64>;

/// Grid-dimension generic point
pub type Point<const D: usize> = SVector<f64, D>;

#[derive(Debug, Clone, PartialEq)]
pub struct ChargedParticle {
    pub charge: f64, // charge
    pub mass: f64, // mass, strictly positive
    pub position: NVec2, // position in the domain plane
    pub velocity: NVec3, // velocity, only x/y are evolved
}

impl ChargedParticle {
    /// Particle at rest with unit mass
    pub fn at_rest(charge: f64, position: NVec2) -> Self {
        Self {
            charge,
            mass: 1.0,
            position,
            velocity: NVec3::zeros(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfiniteWire {
    pub current: f64, // current
    pub position: NVec2, // where the wire pierces the domain plane
    pub direction: NVec3, // unit vector along the wire
}

impl InfiniteWire {
    /// Builds a wire, normalizing `direction`. Returns `None` for a zero direction
    pub fn new(current: f64, position: NVec2, direction: NVec3) -> Option<Self> {
        let direction = direction.try_normalize(0.0)?;
        Some(Self { current, position, direction })
    }
}

/// Magnitude and unit direction of a field at one grid point
///
/// A zero magnitude with a zero direction is the "no field" state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample<const D: usize> {
    pub magnitude: f64,
    pub direction: Point<D>,
}

impl<const D: usize> FieldSample<D> {
    pub fn zero() -> Self {
        Self {
            magnitude: 0.0,
            direction: Point::<D>::zeros(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.magnitude = 0.0;
        self.direction.fill(0.0);
    }
}

impl<const D: usize> Default for FieldSample<D> {
    fn default() -> Self {
        Self::zero()
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub particles: Vec<ChargedParticle>, // charged particles, index-aligned with accelerations
    pub iteration: usize, // completed integration steps
}

impl System {
    pub fn new(particles: Vec<ChargedParticle>) -> Self {
        Self { particles, iteration: 0 }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Embeds a 2D source position into a `D`-dimensional grid space (extra axes at 0)
pub fn embed<const D: usize>(p: &NVec2) -> Point<D> {
    Point::<D>::from_fn(|i, _| if i < 2 { p[i] } else { 0.0 })
}

/// Projects a 3D vector onto the first `D` axes
pub fn project<const D: usize>(p: &NVec3) -> Point<D> {
    Point::<D>::from_fn(|i, _| if i < 3 { p[i] } else { 0.0 })
}
