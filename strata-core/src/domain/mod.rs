//! Core domain types
//!
//! This module contains the core domain structures used across Strata.
//! These types represent the fundamental business entities and are shared
//! between the scheduler (persists, admits, polls) and its API surface.

pub mod backend;
pub mod job;
pub mod tier;
