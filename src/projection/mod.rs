pub mod breakthrough;
pub mod engine;
pub mod policy;
pub mod portfolio;

pub use engine::ScenarioProjectionEngine;
pub use policy::{PolicySchedule, YearRange};
pub use portfolio::DEFAULT_CLEAN_BUFFER;
