pub mod deterministic;
pub mod duration;
