//! Domain models for the dose tracker.

mod entry;
mod medicine;
mod patient;
mod user;

pub use entry::*;
pub use medicine::*;
pub use patient::*;
pub use user::*;
