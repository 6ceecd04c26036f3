pub mod adoption;
pub mod capacity;
pub mod efficiency;
pub mod learning_curve;

pub use adoption::{calibrate_midpoint, AdoptionSCurveModel, LogisticCurve};
pub use capacity::{CapacityConstraintResolver, DeploymentCap};
pub use efficiency::EfficiencyProfile;
pub use learning_curve::{wright_cost, wright_exponent, LearningCurveParams};
