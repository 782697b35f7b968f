//! Small helpers shared across modules

pub mod filename;
pub mod mime;
