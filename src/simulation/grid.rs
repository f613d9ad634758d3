//! Regular sample grid over the square/cubic domain `[-bound, bound]^dim`
//!
//! The grid is enumerated once with the first axis varying slowest. Field
//! arrays are indexed positionally against this order, so it must never
//! change after construction

use log::info;

use crate::error::{EmError, EmResult};
use crate::simulation::states::Point;

#[derive(Debug, Clone, PartialEq)]
pub enum DomainGrid {
    Grid2D(GridPoints<2>),
    Grid3D(GridPoints<3>),
}

/// Enumerated points of a grid of fixed dimension
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoints<const D: usize> {
    bound: f64,
    num_points: usize,
    points: Vec<Point<D>>,
}

impl DomainGrid {
    /// Build the grid for `dim` axes with `num_points + 1` samples per axis
    pub fn build(dim: usize, bound: f64, num_points: usize) -> EmResult<Self> {
        let grid = match dim {
            2 => Self::Grid2D(GridPoints::build(bound, num_points)?),
            3 => Self::Grid3D(GridPoints::build(bound, num_points)?),
            other => return Err(EmError::InvalidDimension(other)),
        };
        info!("constructed {dim}D world ({} grid points)", grid.len());
        Ok(grid)
    }

    pub fn dim(&self) -> usize {
        match self {
            Self::Grid2D(_) => 2,
            Self::Grid3D(_) => 3,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Grid2D(g) => g.len(),
            Self::Grid3D(g) => g.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bound(&self) -> f64 {
        match self {
            Self::Grid2D(g) => g.bound,
            Self::Grid3D(g) => g.bound,
        }
    }

    pub fn as_2d(&self) -> Option<&GridPoints<2>> {
        match self {
            Self::Grid2D(g) => Some(g),
            Self::Grid3D(_) => None,
        }
    }

    pub fn as_3d(&self) -> Option<&GridPoints<3>> {
        match self {
            Self::Grid3D(g) => Some(g),
            Self::Grid2D(_) => None,
        }
    }
}

impl<const D: usize> GridPoints<D> {
    /// Fails when `(num_points + 1)^D` does not fit in `usize`
    pub fn build(bound: f64, num_points: usize) -> EmResult<Self> {
        let too_many = || {
            EmError::ConfigLoad(format!(
                "numPoints {} gives too many grid points for a {}D domain",
                num_points, D
            ))
        };
        let per_axis = num_points.checked_add(1).ok_or_else(too_many)?;
        let total = per_axis.checked_pow(D as u32).ok_or_else(too_many)?;
        let dx = spacing(bound, num_points);

        // Row-major: axis 0 is the most significant digit of the flat index.
        let points = (0..total)
            .map(|flat| {
                let mut rem = flat;
                let mut p = Point::<D>::zeros();
                for axis in (0..D).rev() {
                    let step = rem % per_axis;
                    rem /= per_axis;
                    p[axis] = -bound + step as f64 * dx;
                }
                p
            })
            .collect();

        Ok(Self { bound, num_points, points })
    }

    pub fn points(&self) -> &[Point<D>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn spacing(&self) -> f64 {
        spacing(self.bound, self.num_points)
    }

    /// Index of the grid point closest to `p`; coordinates outside the domain snap to the edge
    pub fn nearest_index(&self, p: &Point<D>) -> usize {
        if self.num_points == 0 {
            return 0;
        }
        let dx = self.spacing();
        let per_axis = self.num_points + 1;
        (0..D).fold(0, |flat, axis| {
            let step = ((p[axis] + self.bound) / dx).round();
            let step = step.clamp(0.0, self.num_points as f64) as usize;
            flat * per_axis + step
        })
    }
}

fn spacing(bound: f64, num_points: usize) -> f64 {
    if num_points == 0 {
        0.0
    } else {
        2.0 * bound / num_points as f64
    }
}
