//! Fixed-step velocity-Verlet integrator for the charged-particle system
//!
//! One call to [`verlet_integrator`] advances every particle by `params.dt`,
//! applying the boundary policy and the velocity ceiling, and leaves the
//! accelerations at the new positions in `accel` for the next step

use rayon::prelude::*;

use super::forces::AccelSet;
use super::params::Parameters;
use super::states::{ChargedParticle, NVec2, System};

/// Advance the system by one step using velocity-Verlet
///
/// `accel` must hold the accelerations at the current positions (a_n)
/// On return it holds a_n+1 and `sys.iteration` has been incremented
/// Returns the number of coincident pairs skipped by the force evaluation
pub fn verlet_integrator(sys: &mut System, forces: &AccelSet, params: &Parameters, accel: &mut Vec<NVec2>) -> usize {
    let n = sys.len();
    if n == 0 {
        sys.iteration += 1;
        return 0;
    }
    let mut skipped = 0;
    if accel.len() != n {
        let (initial, s) = forces.accelerations(sys);
        *accel = initial;
        skipped += s;
    }

    let dt = params.dt;

    // Drift: x_n+1 = x_n + dt v_n + 1/2 dt^2 a_n, then confine to the domain
    sys.particles
        .par_iter_mut()
        .zip(accel.par_iter())
        .for_each(|(p, a)| drift(p, a, dt, params));

    // a_n+1 from x_n+1
    let (a_new, s) = forces.accelerations(sys);
    skipped += s;

    // Kick: v_n+1 = v_n + 1/2 dt (a_n + a_n+1), walls bounce, speed capped
    let v_limit = params.v_limit();
    sys.particles
        .par_iter_mut()
        .zip(accel.par_iter().zip(a_new.par_iter()))
        .for_each(|(p, (a, a1))| kick(p, a, a1, dt, v_limit, params));

    *accel = a_new;
    sys.iteration += 1;
    skipped
}

fn drift(p: &mut ChargedParticle, a: &NVec2, dt: f64, params: &Parameters) {
    for axis in 0..2 {
        let next = p.position[axis] + p.velocity[axis] * dt + 0.5 * a[axis] * dt * dt;
        p.position[axis] = params.boundary.confine(next, params.bound);
    }
}

fn kick(p: &mut ChargedParticle, a: &NVec2, a1: &NVec2, dt: f64, v_limit: f64, params: &Parameters) {
    for axis in 0..2 {
        if params.boundary.on_wall(p.position[axis], params.bound) {
            p.velocity[axis] = clamp_speed(-p.velocity[axis], v_limit);
        } else {
            let v = p.velocity[axis] + 0.5 * (a[axis] + a1[axis]) * dt;
            p.velocity[axis] = clamp_speed(v, v_limit);
        }
    }
}

/// Caps `|v|` at `v_limit`, keeping the sign
pub fn clamp_speed(v: f64, v_limit: f64) -> f64 {
    if v.abs() < v_limit { v } else { v.signum() * v_limit }
}

/// True when every particle lies inside `[-bound, bound]` on both axes
pub fn within_domain(sys: &System, bound: f64) -> bool {
    sys.particles
        .iter()
        .all(|p| p.position.x.abs() <= bound && p.position.y.abs() <= bound)
}
