//! Service layer
//!
//! Business logic between the API surface and the job store.

pub mod job;

pub use job::{JobError, get_job, list_jobs, list_queued_jobs, submit_job};
