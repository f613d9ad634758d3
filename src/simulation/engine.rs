//! Run controller
//!
//! Drives one simulation from a built [`Scenario`]: the magnetic pass (once),
//! the initial electric pass, then in dynamic mode exactly `num_steps`
//! integration steps, each followed by an electric recomputation and a
//! snapshot. Phases run strictly in order; parallelism lives inside them

use log::{info, warn};

use crate::error::EmResult;
use crate::output::snapshot::{Snapshot, SnapshotSink};
use crate::simulation::fields::FieldSolver;
use crate::simulation::forces::AccelSet;
use crate::simulation::grid::DomainGrid;
use crate::simulation::integrator::{verlet_integrator, within_domain};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::{RunMode, Scenario};
use crate::simulation::states::{InfiniteWire, Point, System};

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: RunMode,
    pub steps: usize, // integration steps taken
    pub snapshots: Vec<String>, // names emitted, in order
    pub skipped_contributions: usize, // zero-separation field contributions dropped
    pub skipped_pairs: usize, // coincident particle pairs dropped by the force evaluation
}

pub struct Engine<S: SnapshotSink> {
    scenario: Scenario,
    sink: S,
}

impl<S: SnapshotSink> Engine<S> {
    pub fn new(scenario: Scenario, sink: S) -> Self {
        Self { scenario, sink }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn into_parts(self) -> (Scenario, S) {
        (self.scenario, self.sink)
    }

    /// Write the bare grid coordinates to `<name>_grid`
    pub fn write_grid(&mut self) -> EmResult<String> {
        let name = format!("{}_grid", self.scenario.name);
        match &self.scenario.grid {
            DomainGrid::Grid2D(g) => self.sink.write(&name, &Snapshot::grid_only(g.points()))?,
            DomainGrid::Grid3D(g) => self.sink.write(&name, &Snapshot::grid_only(g.points()))?,
        }
        Ok(name)
    }

    pub fn run(&mut self) -> EmResult<RunSummary> {
        let mode = self.scenario.mode();
        info!(
            "run starting: {:?} mode, {} grid points, {} particles, {} wires",
            mode,
            self.scenario.grid.len(),
            self.scenario.system.len(),
            self.scenario.wires.len()
        );

        let Scenario { name, grid, parameters, system, wires, forces } = &mut self.scenario;
        let ctx = RunContext { name, parameters, wires, forces, mode };
        let summary = match grid {
            DomainGrid::Grid2D(g) => run_on_grid(g.points(), system, &ctx, &mut self.sink)?,
            DomainGrid::Grid3D(g) => run_on_grid(g.points(), system, &ctx, &mut self.sink)?,
        };

        info!("run complete: {} steps, {} snapshots", summary.steps, summary.snapshots.len());
        Ok(summary)
    }
}

/// Fixed inputs of one run, borrowed from the scenario
struct RunContext<'a> {
    name: &'a str,
    parameters: &'a Parameters,
    wires: &'a [InfiniteWire],
    forces: &'a AccelSet,
    mode: RunMode,
}

fn run_on_grid<S: SnapshotSink, const D: usize>(
    points: &[Point<D>],
    system: &mut System,
    ctx: &RunContext<'_>,
    sink: &mut S,
) -> EmResult<RunSummary> {
    let RunContext { name, parameters, wires, forces, mode } = *ctx;

    let mut solver = FieldSolver::<D>::new(parameters.bound, parameters.boundary);
    let mut skipped = solver.compute_magnetic(points, wires).skipped;
    skipped += solver.compute_electric(points, &system.particles).skipped;

    let mut snapshots = Vec::new();
    let mut emit = |label: String, solver: &FieldSolver<D>| -> EmResult<()> {
        let snap = Snapshot {
            grid: points,
            e_field: solver.e_field(),
            b_field: solver.b_field(),
        };
        sink.write(&label, &snap)?;
        snapshots.push(label);
        Ok(())
    };

    if mode == RunMode::Static {
        emit(name.to_string(), &solver)?;
        return Ok(RunSummary {
            mode,
            steps: 0,
            snapshots,
            skipped_contributions: skipped,
            skipped_pairs: 0,
        });
    }

    emit(format!("{name}_{}", system.iteration), &solver)?;

    let (mut accel, mut skipped_pairs) = forces.accelerations(system);
    for _ in 0..parameters.num_steps {
        skipped_pairs += verlet_integrator(system, forces, parameters, &mut accel);
        if !within_domain(system, parameters.bound) {
            warn!("iteration {}: a particle left the domain", system.iteration);
        }
        skipped += solver.compute_electric(points, &system.particles).skipped;
        emit(format!("{name}_{}", system.iteration), &solver)?;
        info!("iteration {} / {}", system.iteration, parameters.num_steps);
    }

    Ok(RunSummary {
        mode,
        steps: system.iteration,
        snapshots,
        skipped_contributions: skipped,
        skipped_pairs,
    })
}
