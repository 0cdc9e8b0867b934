pub mod commands;
pub mod state;
pub mod tracker;

pub use state::{StudyState, StudyStatus};
pub use tracker::{StudySnapshot, StudyTracker};
