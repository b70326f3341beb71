//! Storydesk: editorial story review workflow.
//!
//! This crate provides the core of a story review desk: writers submit
//! stories, reviewers claim and resolve them, and admins curate the archive.
//! Every transition is gated by role capabilities and persisted through a
//! compare-and-set so concurrent reviewers cannot both win a claim.
//!
//! # Architecture
//!
//! Storydesk follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, logging, memory)
//!
//! # Modules
//!
//! - [`story`]: Story workflow domain, ports, adapters and services
//! - [`config`]: Layered runtime configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod story;
pub mod telemetry;
