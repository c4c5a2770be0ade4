//! Strata Scheduler
//!
//! The tiered background job scheduler service. Accepts long-running
//! analysis jobs, admits them under per-tier concurrency limits, dispatches
//! them to external compute backends, polls each in-flight execution until
//! it is terminal, and applies bounded retry semantics on failure.
//!
//! Architecture:
//! - Config: environment-driven settings, tier table, backend endpoints
//! - Store: the job record store (Postgres in production, in-memory for tests)
//! - Backend: compute backend adapters and the job-type registry
//! - Scheduler: admission loop, dispatcher, per-job status pollers, retries
//! - Service + API: submission and read surface over the store

pub mod api;
pub mod backend;
pub mod config;
pub mod db;
pub mod scheduler;
pub mod service;
pub mod store;
