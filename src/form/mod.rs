pub mod commands;
pub mod controller;
pub mod draft;

pub use controller::{DraftRefs, FormController};
pub use draft::{derive_draft, display_date, DraftPatch, TaskDraft, ValidationError};
