//! Force / acceleration contributors for the charged-particle system
//!
//! Defines the acceleration trait and the direct pairwise Coulomb term
//! Terms are collected in an [`AccelSet`] and summed per particle

use log::warn;
use rayon::prelude::*;

use crate::error::EmError;
use crate::simulation::params::Boundary;
use crate::simulation::states::{NVec2, System};

/// Collection of acceleration terms
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per particle
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self {
            terms: Vec::new()
        }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Compute total accelerations for all particles in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    /// - returns the number of particle pairs the terms skipped
    pub fn accumulate_accels(&self, sys: &System, out: &mut [NVec2]) -> usize {
        for a in out.iter_mut() {
            *a = NVec2::zeros();
        }
        let mut skipped = 0;
        for term in &self.terms {
            skipped += term.acceleration(sys, out);
        }
        skipped
    }

    /// Fresh acceleration buffer for `sys`, plus the skipped pair count
    pub fn accelerations(&self, sys: &System) -> (Vec<NVec2>, usize) {
        let mut out = vec![NVec2::zeros(); sys.len()];
        let skipped = self.accumulate_accels(sys, &mut out);
        (out, skipped)
    }
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Acceleration source operating on a [`System`]
/// Implementations add their contribution into `out[i]` for each particle
/// and return how many pairs they had to skip
pub trait Acceleration {
    fn acceleration(&self, sys: &System, out: &mut [NVec2]) -> usize;
}

/// Pairwise Coulomb interaction, unit coupling constant
///
/// Separations follow the boundary policy (minimum image when periodic)
/// Two particles at exactly the same position exert no force on each
/// other; the pair is skipped and reported
pub struct CoulombInteraction {
    pub bound: f64, // domain half-width
    pub boundary: Boundary, // separation convention
}

/// Accelerations from all pairs `(i, j)` with `j > i` for a block of rows,
/// plus the number of coincident pairs skipped
type Partial = (Vec<NVec2>, usize);

impl CoulombInteraction {
    fn accumulate_row(&self, sys: &System, i: usize, (acc, skipped): &mut Partial) {
        let pi = &sys.particles[i];

        for j in (i + 1)..sys.len() {
            let pj = &sys.particles[j];

            // r' points from j to i; like charges push i along +r'
            let r_prime = self.boundary.minimum_image(&pi.position, &pj.position, self.bound);
            let r = r_prime.norm();
            if r == 0.0 {
                *skipped += 1;
                warn!(
                    "{}",
                    EmError::DegenerateGeometry(format!(
                        "particles {i} and {j} coincide at ({}, {}); pair skipped",
                        pi.position.x, pi.position.y
                    ))
                );
                continue;
            }

            let f = r_prime * (pi.charge * pj.charge / (r * r * r));
            acc[i] += f / pi.mass;
            acc[j] -= f / pj.mass;
        }
    }

    /// Accelerations and the count of skipped coincident pairs
    pub fn evaluate(&self, sys: &System) -> (Vec<NVec2>, usize) {
        let n = sys.len();
        let zero = || (vec![NVec2::zeros(); n], 0usize);

        // Each worker folds whole rows into its own buffer; buffers are summed at the end.
        (0..n)
            .into_par_iter()
            .fold(zero, |mut partial, i| {
                self.accumulate_row(sys, i, &mut partial);
                partial
            })
            .reduce(zero, |(mut a, sa), (b, sb)| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                (a, sa + sb)
            })
    }
}

impl Acceleration for CoulombInteraction {
    fn acceleration(&self, sys: &System, out: &mut [NVec2]) -> usize {
        if sys.len() < 2 {
            return 0;
        }
        let (acc, skipped) = self.evaluate(sys);
        for (o, a) in out.iter_mut().zip(acc) {
            *o += a;
        }
        skipped
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::simulation::states::ChargedParticle;

    fn coulomb(boundary: Boundary) -> AccelSet {
        AccelSet::new().with(CoulombInteraction { bound: 10.0, boundary })
    }

    fn particle(charge: f64, mass: f64, x: f64, y: f64) -> ChargedParticle {
        ChargedParticle { mass, ..ChargedParticle::at_rest(charge, NVec2::new(x, y)) }
    }

    #[test]
    fn like_charges_repel() {
        let sys = System::new(vec![particle(1.0, 1.0, -0.5, 0.0), particle(1.0, 1.0, 0.5, 0.0)]);
        let (acc, _) = coulomb(Boundary::Reflective).accelerations(&sys);
        assert!(acc[0].x < 0.0);
        assert!(acc[1].x > 0.0);
        assert_relative_eq!(acc[1].x, 1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn opposite_charges_attract() {
        let sys = System::new(vec![particle(1.0, 1.0, 0.0, -1.0), particle(-1.0, 1.0, 0.0, 1.0)]);
        let (acc, _) = coulomb(Boundary::Reflective).accelerations(&sys);
        assert!(acc[0].y > 0.0);
        assert!(acc[1].y < 0.0);
    }

    #[test]
    fn coincident_pair_is_skipped() {
        let sys = System::new(vec![
            particle(1.0, 1.0, 0.2, 0.2),
            particle(1.0, 1.0, 0.2, 0.2),
            particle(-1.0, 2.0, -1.0, 0.2),
        ]);
        let term = CoulombInteraction { bound: 10.0, boundary: Boundary::Reflective };
        let (acc, skipped) = term.evaluate(&sys);
        assert_eq!(skipped, 1);
        assert!(acc.iter().all(|a| a.x.is_finite() && a.y.is_finite()));
    }

    #[test]
    fn accel_set_reports_skipped_pairs() {
        let sys = System::new(vec![
            particle(1.0, 1.0, 0.5, -0.5),
            particle(-1.0, 1.0, 0.5, -0.5),
            particle(1.0, 1.0, 0.5, -0.5),
        ]);
        let (acc, skipped) = coulomb(Boundary::Reflective).accelerations(&sys);
        assert_eq!(skipped, 3);
        assert!(acc.iter().all(|a| *a == NVec2::zeros()));
    }

    #[test]
    fn single_particle_feels_nothing() {
        let sys = System::new(vec![particle(5.0, 1.0, 0.0, 0.0)]);
        let (acc, _) = coulomb(Boundary::Periodic).accelerations(&sys);
        assert_eq!(acc, vec![NVec2::zeros()]);
    }

    #[test]
    fn periodic_pair_interacts_across_the_wall() {
        // 0.4 apart through the wall, 19.6 apart through the middle
        let sys = System::new(vec![particle(1.0, 1.0, 9.8, 0.0), particle(1.0, 1.0, -9.8, 0.0)]);
        let (acc, _) = coulomb(Boundary::Periodic).accelerations(&sys);
        // repelled away from the near image: particle 0 pushed toward -x
        assert!(acc[0].x < 0.0);
        assert_relative_eq!(acc[0].x.abs(), 1.0 / (0.4 * 0.4), epsilon = 1.0e-9);
    }
}
