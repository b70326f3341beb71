//! Step definitions for story review scenarios.

pub mod then;
pub mod world;
