pub mod ai;
pub mod cv;
