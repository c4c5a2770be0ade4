//! Strata Core
//!
//! Core types and abstractions for the Strata analysis job scheduler.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, Tier, backend references)
//! - DTOs: Data transfer objects for the scheduler's external surface
//! - Estimation: Pure priority and duration heuristics applied at submission

pub mod domain;
pub mod dto;
pub mod estimate;
