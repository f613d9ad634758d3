pub mod states;
pub mod params;
pub mod grid;
pub mod fields;
pub mod forces;
pub mod integrator;
pub mod scenario;
pub mod engine;
