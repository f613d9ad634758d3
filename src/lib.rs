pub mod error;
pub mod simulation;
pub mod configuration;
pub mod output;

pub use error::{EmError, EmResult};

pub use simulation::states::{ChargedParticle, InfiniteWire, FieldSample, System, NVec2, NVec3, Point};
pub use simulation::params::{Boundary, Parameters};
pub use simulation::grid::{DomainGrid, GridPoints};
pub use simulation::fields::{FieldPass, FieldSolver};
pub use simulation::forces::{Acceleration, AccelSet, CoulombInteraction};
pub use simulation::integrator::verlet_integrator;
pub use simulation::scenario::{RunMode, Scenario};
pub use simulation::engine::{Engine, RunSummary};

pub use configuration::config::{SimulationConfig, ScenarioConfig, ParticleConfig, WireConfig};

pub use output::snapshot::{FileSink, MemorySink, Snapshot, SnapshotRow, SnapshotSink, read_snapshot, read_snapshot_file, write_snapshot};
