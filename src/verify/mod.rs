//! Post-publish verification: typed reports and the stress fan-out

pub mod report;
pub mod stress;

pub use report::{RunReport, StepStatus};
pub use stress::run_stress;
