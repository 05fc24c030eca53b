//! View models for the patient page.

mod severity;
mod timeline;

pub use severity::*;
pub use timeline::*;
