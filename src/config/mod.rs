/*!
 * Configuration
 * Simulation input documents, their loading and validation
 */

mod builder;
mod loader;
mod model;

pub use loader::{load, ConfigFormat};
pub use model::{
    EventAction, ProcessConfig, ProcessResourceConfig, ResourceConfig, SchedulingConfig,
    SimulationConfig, SimulationEvent, SimulationSettings,
};
