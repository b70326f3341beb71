//! Story review workflow for the editorial desk.
//!
//! Writers submit stories, reviewers claim and resolve them and admins
//! curate the archive through soft deletion, restoration and purging. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
