pub mod model;
pub mod render;

pub use model::{Finding, MachineIssues, Report};
