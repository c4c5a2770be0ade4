//! DTOs for the scheduler's external surface

pub mod job;
