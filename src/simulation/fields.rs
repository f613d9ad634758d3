//! Grid-sampled electric and magnetic fields from point sources
//!
//! Both passes superpose per-source contributions at every grid point and
//! normalize the accumulated direction at the end. They run as a `rayon`
//! parallel loop over grid points, each point touching only its own sample
//!
//! A contribution whose separation is exactly zero (grid point on top of a
//! source) is skipped and counted in the returned [`FieldPass`]

use std::f64::consts::PI;

use log::debug;
use rayon::prelude::*;

use crate::simulation::params::Boundary;
use crate::simulation::states::{
    embed, project, ChargedParticle, FieldSample, InfiniteWire, NVec2, NVec3, Point,
};

/// Summary of one accumulation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldPass {
    /// Grid point / source pairs dropped for zero separation
    pub skipped: usize,
}

/// Owns the electric and magnetic samples for one grid of dimension `D`
#[derive(Debug, Clone)]
pub struct FieldSolver<const D: usize> {
    bound: f64,
    boundary: Boundary,
    e_field: Vec<FieldSample<D>>,
    b_field: Vec<FieldSample<D>>,
}

impl<const D: usize> FieldSolver<D> {
    pub fn new(bound: f64, boundary: Boundary) -> Self {
        Self {
            bound,
            boundary,
            e_field: Vec::new(),
            b_field: Vec::new(),
        }
    }

    pub fn e_field(&self) -> &[FieldSample<D>] {
        &self.e_field
    }

    pub fn b_field(&self) -> &[FieldSample<D>] {
        &self.b_field
    }

    /// Electric field from `charges` at every grid point
    ///
    /// The first call allocates one zeroed sample per point; later calls on the
    /// same grid reset the samples in place and refill them
    pub fn compute_electric(&mut self, grid: &[Point<D>], charges: &[ChargedParticle]) -> FieldPass {
        if charges.is_empty() {
            return FieldPass::default();
        }

        if self.e_field.len() != grid.len() {
            self.e_field = vec![FieldSample::zero(); grid.len()];
        }

        let sources: Vec<(f64, Point<D>)> = charges
            .iter()
            .map(|q| (q.charge, embed::<D>(&q.position)))
            .collect();
        let (bound, boundary) = (self.bound, self.boundary);

        let skipped = self
            .e_field
            .par_iter_mut()
            .zip(grid.par_iter())
            .map(|(sample, point)| {
                sample.reset();
                electric_at(sample, point, &sources, boundary, bound)
            })
            .sum::<usize>();

        if skipped > 0 {
            debug!("electric field: skipped {skipped} contributions at zero separation");
        }
        FieldPass { skipped }
    }

    /// Magnetic field from infinite straight wires at every grid point
    ///
    /// Wires are static, so this is expected once per run
    pub fn compute_magnetic(&mut self, grid: &[Point<D>], wires: &[InfiniteWire]) -> FieldPass {
        if wires.is_empty() {
            return FieldPass::default();
        }

        let sources: Vec<(f64, NVec2, NVec3)> = wires
            .iter()
            .map(|w| (w.current, w.position, w.direction))
            .collect();

        let (samples, skipped): (Vec<_>, Vec<_>) = grid
            .par_iter()
            .map(|point| {
                let mut sample = FieldSample::zero();
                let skipped = magnetic_at(&mut sample, point, &sources);
                (sample, skipped)
            })
            .unzip();
        self.b_field = samples;

        let skipped: usize = skipped.into_iter().sum();
        if skipped > 0 {
            debug!("magnetic field: skipped {skipped} contributions at zero separation");
        }
        FieldPass { skipped }
    }
}

fn electric_at<const D: usize>(
    sample: &mut FieldSample<D>,
    point: &Point<D>,
    sources: &[(f64, Point<D>)],
    boundary: Boundary,
    bound: f64,
) -> usize {
    let mut skipped = 0;
    for (charge, position) in sources {
        let r_prime = boundary.minimum_image(point, position, bound);
        let r = r_prime.norm();
        if r == 0.0 {
            skipped += 1;
            continue;
        }
        // field points away from positive charges and toward negative ones
        let sign = if *charge < 0.0 { -1.0 } else { 1.0 };
        sample.magnitude += charge / (r * r);
        sample.direction += r_prime * (sign / r);
    }
    normalize(sample);
    skipped
}

fn magnetic_at<const D: usize>(
    sample: &mut FieldSample<D>,
    point: &Point<D>,
    sources: &[(f64, NVec2, NVec3)],
) -> usize {
    let mut skipped = 0;
    for (current, position, direction) in sources {
        // in-plane offset only: the wire is infinite along its own axis
        let r_prime = NVec3::new(point[0] - position.x, point[1] - position.y, 0.0);
        let r = r_prime.norm();
        if r == 0.0 {
            skipped += 1;
            continue;
        }
        // Biot-Savart for an infinite straight wire, per unit length
        let components = direction.cross(&(r_prime / r));
        sample.magnitude += current / (2.0 * PI * r) * components.norm();
        sample.direction += project::<D>(&components) / r;
    }
    normalize(sample);
    skipped
}

fn normalize<const D: usize>(sample: &mut FieldSample<D>) {
    if let Some(unit) = sample.direction.try_normalize(0.0) {
        sample.direction = unit;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::simulation::grid::GridPoints;
    use crate::simulation::states::NVec2;

    fn charge(q: f64, x: f64, y: f64) -> ChargedParticle {
        ChargedParticle::at_rest(q, NVec2::new(x, y))
    }

    #[test]
    fn single_charge_matches_inverse_square() {
        let grid = GridPoints::<2>::build(1.0, 2).unwrap();
        let mut solver = FieldSolver::<2>::new(1.0, Boundary::Reflective);
        let pass = solver.compute_electric(grid.points(), &[charge(1.0, 0.0, 0.0)]);

        // centre point coincides with the charge
        assert_eq!(pass.skipped, 1);
        assert_eq!(solver.e_field()[4], FieldSample::zero());

        let corner = solver.e_field()[8];
        assert_relative_eq!(corner.magnitude, 0.5, epsilon = 1.0e-12);
        let inv_sqrt2 = 1.0 / 2f64.sqrt();
        assert_relative_eq!(corner.direction.x, inv_sqrt2, epsilon = 1.0e-12);
        assert_relative_eq!(corner.direction.y, inv_sqrt2, epsilon = 1.0e-12);
    }

    #[test]
    fn negative_charge_points_inward() {
        let grid = GridPoints::<2>::build(1.0, 2).unwrap();
        let mut solver = FieldSolver::<2>::new(1.0, Boundary::Reflective);
        solver.compute_electric(grid.points(), &[charge(-2.0, 0.0, 0.0)]);
        let right = solver.e_field()[7]; // (1, 0)
        assert_relative_eq!(right.magnitude, -2.0, epsilon = 1.0e-12);
        assert_relative_eq!(right.direction.x, -1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn directions_are_unit_where_field_is_nonzero() {
        let grid = GridPoints::<2>::build(2.0, 16).unwrap();
        let mut solver = FieldSolver::<2>::new(2.0, Boundary::Periodic);
        let charges = [charge(1.0, 0.3, -0.2), charge(-0.5, -1.1, 0.7), charge(2.0, 1.3, 1.3)];
        solver.compute_electric(grid.points(), &charges);
        for s in solver.e_field() {
            if s.magnitude != 0.0 {
                assert_relative_eq!(s.direction.norm(), 1.0, epsilon = 1.0e-9);
            }
        }
    }

    #[test]
    fn recompute_resets_in_place() {
        let grid = GridPoints::<2>::build(1.0, 4).unwrap();
        let mut solver = FieldSolver::<2>::new(1.0, Boundary::Reflective);
        let charges = [charge(1.0, 0.1, 0.1)];
        solver.compute_electric(grid.points(), &charges);
        let first: Vec<_> = solver.e_field().to_vec();
        let ptr = solver.e_field().as_ptr();
        solver.compute_electric(grid.points(), &charges);
        assert_eq!(solver.e_field().as_ptr(), ptr);
        assert_eq!(solver.e_field(), first.as_slice());
    }

    #[test]
    fn wire_field_circulates_with_inverse_distance() {
        let grid = GridPoints::<2>::build(2.0, 4).unwrap();
        let mut solver = FieldSolver::<2>::new(2.0, Boundary::Reflective);
        let wire = InfiniteWire::new(3.0, NVec2::zeros(), NVec3::z()).unwrap();
        let pass = solver.compute_magnetic(grid.points(), &[wire]);
        assert_eq!(pass.skipped, 1);
        assert_eq!(solver.b_field().len(), grid.len());

        // (1, 0): r = 1, z x x_hat = y_hat
        let idx = grid.nearest_index(&NVec2::new(1.0, 0.0));
        let s = solver.b_field()[idx];
        assert_relative_eq!(s.magnitude, 3.0 / (2.0 * PI), epsilon = 1.0e-12);
        assert_relative_eq!(s.direction.x, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(s.direction.y, 1.0, epsilon = 1.0e-12);

        // (0, 2): r = 2, z x y_hat = -x_hat
        let idx = grid.nearest_index(&NVec2::new(0.0, 2.0));
        let s = solver.b_field()[idx];
        assert_relative_eq!(s.magnitude, 3.0 / (4.0 * PI), epsilon = 1.0e-12);
        assert_relative_eq!(s.direction.x, -1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn three_d_grid_embeds_sources_in_plane() {
        let grid = GridPoints::<3>::build(1.0, 2).unwrap();
        let mut solver = FieldSolver::<3>::new(1.0, Boundary::Reflective);
        solver.compute_electric(grid.points(), &[charge(1.0, 0.0, 0.0)]);
        let idx = grid.nearest_index(&NVec3::new(0.0, 0.0, 1.0));
        let s = solver.e_field()[idx];
        assert_relative_eq!(s.magnitude, 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(s.direction.z, 1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn three_d_wire_field_is_uniform_along_the_wire() {
        let grid = GridPoints::<3>::build(1.0, 2).unwrap();
        let mut solver = FieldSolver::<3>::new(1.0, Boundary::Reflective);
        let wire = InfiniteWire::new(1.0, NVec2::zeros(), NVec3::z()).unwrap();
        let pass = solver.compute_magnetic(grid.points(), &[wire]);
        // the whole column above and below the wire is skipped
        assert_eq!(pass.skipped, 3);

        let expected = 1.0 / (2.0 * PI);
        for z in [-1.0, 0.0, 1.0] {
            let s = solver.b_field()[grid.nearest_index(&NVec3::new(1.0, 0.0, z))];
            assert_relative_eq!(s.magnitude, expected, epsilon = 1.0e-12);
            assert_relative_eq!(s.direction.y, 1.0, epsilon = 1.0e-12);
            assert_relative_eq!(s.direction.z, 0.0, epsilon = 1.0e-12);
        }
    }
}
