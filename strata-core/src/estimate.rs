//! Priority and duration estimation
//!
//! Pure, deterministic heuristics computed exactly once at submission.
//! Priority is an informational ordinal (higher tier, higher value) and is
//! never used for preemption. Duration estimates are linear in a job-type
//! specific unit count with a per-type floor.

use crate::domain::job::JobType;
use crate::domain::tier::Tier;

/// Minimum estimate for a training run, minutes.
const TRAINING_FLOOR_MINUTES: u32 = 15;
/// Training cost: one minute per thousand dataset rows.
const TRAINING_ROWS_PER_MINUTE: u64 = 1000;
/// Minimum estimate for a bulk scoring run, minutes.
const SCORING_FLOOR_MINUTES: u32 = 10;
/// Scoring cost: two minutes per scoring batch.
const SCORING_MINUTES_PER_BATCH: u64 = 2;
/// Quick insights run in a function backend; the estimate is flat.
const INSIGHTS_MINUTES: u32 = 5;

/// Fixed ordinal per tier, used for observability and sorting only.
pub fn priority(tier: Tier) -> i32 {
    match tier {
        Tier::Basic => 1,
        Tier::Advanced => 2,
        Tier::Professional => 3,
    }
}

/// Estimated wall-clock duration in minutes for the given work.
///
/// Identical `(job_type, params)` always yield identical estimates. A
/// missing or non-numeric size field falls back to the job type's floor.
pub fn estimated_duration_minutes(
    job_type: JobType,
    params: &std::collections::HashMap<String, serde_json::Value>,
) -> u32 {
    match job_type {
        JobType::ModelTraining => {
            let rows = unit_count(params, "dataset_rows");
            let minutes = rows / TRAINING_ROWS_PER_MINUTE;
            (minutes as u32).max(TRAINING_FLOOR_MINUTES)
        }
        JobType::BulkScoring => {
            let batches = unit_count(params, "batch_count");
            let minutes = batches * SCORING_MINUTES_PER_BATCH;
            (minutes as u32).max(SCORING_FLOOR_MINUTES)
        }
        JobType::QuickInsights => INSIGHTS_MINUTES,
    }
}

fn unit_count(
    params: &std::collections::HashMap<String, serde_json::Value>,
    key: &str,
) -> u64 {
    params.get(key).and_then(|v| v.as_u64()).unwrap_or(0)
}
