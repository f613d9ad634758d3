//! Numerical parameters and boundary semantics for the run
//!
//! `Parameters` holds runtime settings:
//! - domain half-width `bound`,
//! - integration step size and step count,
//! - the boundary policy (periodic wrap or reflective clamp)

use nalgebra::SVector;

/// How particles and separations treat the domain edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    /// Particles are clamped to the wall and bounce back
    #[default]
    Reflective,
    /// The domain wraps around; separations use the minimum image
    Periodic,
}

impl Boundary {
    pub fn from_periodic(periodic: bool) -> Self {
        if periodic { Self::Periodic } else { Self::Reflective }
    }

    /// Separation `a - b`, remapped to the nearest periodic image when periodic
    pub fn minimum_image<const D: usize>(
        &self,
        a: &SVector<f64, D>,
        b: &SVector<f64, D>,
        bound: f64,
    ) -> SVector<f64, D> {
        let d = a - b;
        match self {
            Self::Reflective => d,
            Self::Periodic => d.map(|c| nearest_image(c, bound)),
        }
    }

    /// Applies the boundary to one axis of a freshly integrated position
    pub fn confine(&self, next: f64, bound: f64) -> f64 {
        if next.abs() < bound {
            return next;
        }
        match self {
            Self::Periodic => {
                let wrapped = next - next.signum() * 2.0 * bound;
                if wrapped.abs() <= bound {
                    wrapped
                } else {
                    // more than a full period past the wall
                    (next + bound).rem_euclid(2.0 * bound) - bound
                }
            }
            Self::Reflective => next.signum() * bound,
        }
    }

    /// True when a position component sits on a reflecting wall
    pub fn on_wall(&self, x: f64, bound: f64) -> bool {
        matches!(self, Self::Reflective) && x.abs() == bound
    }
}

/// Shortest periodic representative of a single-axis offset
fn nearest_image(d: f64, bound: f64) -> f64 {
    let period = 2.0 * bound;
    if d > bound {
        d - period
    } else if d < -bound {
        d + period
    } else {
        d
    }
}

#[derive(Debug, Clone)]
pub struct Parameters {
    pub bound: f64, // domain half-width
    pub dt: f64, // step size
    pub num_steps: usize, // evolve calls per run
    pub boundary: Boundary, // wall policy
}

impl Parameters {
    /// Velocity ceiling: a particle may cross at most 1/8 of the half-width per step
    pub fn v_limit(&self) -> f64 {
        self.bound / (8.0 * self.dt)
    }
}
