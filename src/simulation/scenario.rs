//! Build a fully-initialized simulation scenario from configuration
//!
//! Takes a validated [`SimulationConfig`] and produces the runtime bundle
//! consumed by the run controller:
//! - the sample grid (`DomainGrid`)
//! - numerical parameters (`Parameters`)
//! - particle state (`System` at iteration 0)
//! - static sources (`InfiniteWire`s)
//! - active force set (`AccelSet`)

use log::info;

use crate::configuration::config::SimulationConfig;
use crate::error::EmResult;
use crate::simulation::forces::{AccelSet, CoulombInteraction};
use crate::simulation::grid::DomainGrid;
use crate::simulation::params::Parameters;
use crate::simulation::states::{InfiniteWire, System};

/// Whether the run evolves particles or samples the fields once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One field computation, written to `<name>`
    Static,
    /// `num_steps` integration steps, written to `<name>_<iteration>`
    Dynamic,
}

/// Runtime bundle for one simulation
///
/// Constructed once from a [`SimulationConfig`]; the grid, parameters,
/// wires and forces are fixed for the run, only `system` evolves
pub struct Scenario {
    pub name: String,
    pub grid: DomainGrid,
    pub parameters: Parameters,
    pub system: System,
    pub wires: Vec<InfiniteWire>,
    pub forces: AccelSet,
}

impl Scenario {
    pub fn build_scenario(cfg: &SimulationConfig) -> EmResult<Self> {
        let grid = DomainGrid::build(cfg.dim, cfg.bound(), cfg.num_points)?;

        // Forces: direct pairwise Coulomb under the configured boundary convention
        let forces = AccelSet::new().with(CoulombInteraction {
            bound: cfg.bound(),
            boundary: cfg.boundary(),
        });

        Ok(Self {
            name: cfg.output_filename.clone(),
            grid,
            parameters: cfg.parameters.clone(),
            system: System::new(cfg.particles.clone()),
            wires: cfg.wires.clone(),
            forces,
        })
    }

    /// Static when there is nothing to integrate, or the domain is 3D
    pub fn mode(&self) -> RunMode {
        if self.grid.dim() == 3 {
            if !self.system.is_empty() && self.parameters.num_steps > 0 {
                info!("3D domains are sampled statically; particles will not be evolved");
            }
            return RunMode::Static;
        }
        if self.system.is_empty() || self.parameters.num_steps == 0 {
            RunMode::Static
        } else {
            RunMode::Dynamic
        }
    }
}
