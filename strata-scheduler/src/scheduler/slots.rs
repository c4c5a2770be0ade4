//! Per-tier running-job slot table
//!
//! The one piece of truly shared mutable state in the scheduler. The
//! admission loop reserves a slot before transitioning a job to running;
//! pollers and the retry handler release it on any terminal transition or
//! recycle. Reserve-and-check happens under a single lock, so two admission
//! attempts can never both admit into the same spare capacity slot.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use uuid::Uuid;

use strata_core::domain::tier::Tier;

#[derive(Default)]
pub struct TierSlots {
    running: Mutex<HashMap<Tier, HashSet<Uuid>>>,
}

impl TierSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically reserve a slot for `job_id` if the tier has spare
    /// capacity. Re-reserving an already held slot is a no-op success.
    pub fn try_admit(&self, tier: Tier, limit: usize, job_id: Uuid) -> bool {
        let mut running = self.running.lock().expect("slot table poisoned");
        let slots = running.entry(tier).or_default();
        if slots.contains(&job_id) {
            return true;
        }
        if slots.len() >= limit {
            return false;
        }
        slots.insert(job_id);
        true
    }

    /// Record a slot as held regardless of the limit. Used when rebuilding
    /// the table from persisted running jobs at startup; a tier that ends up
    /// over a shrunk limit simply admits nothing until slots free up.
    pub fn occupy(&self, tier: Tier, job_id: Uuid) {
        let mut running = self.running.lock().expect("slot table poisoned");
        running.entry(tier).or_default().insert(job_id);
    }

    /// Release the slot held by `job_id`. Idempotent.
    pub fn release(&self, tier: Tier, job_id: Uuid) {
        let mut running = self.running.lock().expect("slot table poisoned");
        if let Some(slots) = running.get_mut(&tier) {
            slots.remove(&job_id);
        }
    }

    pub fn running_count(&self, tier: Tier) -> usize {
        let running = self.running.lock().expect("slot table poisoned");
        running.get(&tier).map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_up_to_limit() {
        let slots = TierSlots::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        assert!(slots.try_admit(Tier::Professional, 2, a));
        assert!(slots.try_admit(Tier::Professional, 2, b));
        assert!(!slots.try_admit(Tier::Professional, 2, c));
        assert_eq!(slots.running_count(Tier::Professional), 2);
    }

    #[test]
    fn test_limits_are_per_tier() {
        let slots = TierSlots::new();
        assert!(slots.try_admit(Tier::Basic, 1, Uuid::new_v4()));
        assert!(!slots.try_admit(Tier::Basic, 1, Uuid::new_v4()));
        // A saturated basic tier does not block advanced capacity.
        assert!(slots.try_admit(Tier::Advanced, 1, Uuid::new_v4()));
    }

    #[test]
    fn test_release_frees_capacity() {
        let slots = TierSlots::new();
        let a = Uuid::new_v4();
        assert!(slots.try_admit(Tier::Basic, 1, a));
        assert!(!slots.try_admit(Tier::Basic, 1, Uuid::new_v4()));

        slots.release(Tier::Basic, a);
        assert_eq!(slots.running_count(Tier::Basic), 0);
        assert!(slots.try_admit(Tier::Basic, 1, Uuid::new_v4()));
    }

    #[test]
    fn test_release_is_idempotent() {
        let slots = TierSlots::new();
        let a = Uuid::new_v4();
        assert!(slots.try_admit(Tier::Basic, 1, a));
        slots.release(Tier::Basic, a);
        slots.release(Tier::Basic, a);
        assert_eq!(slots.running_count(Tier::Basic), 0);
    }

    #[test]
    fn test_occupy_ignores_limit() {
        let slots = TierSlots::new();
        slots.occupy(Tier::Basic, Uuid::new_v4());
        slots.occupy(Tier::Basic, Uuid::new_v4());
        assert_eq!(slots.running_count(Tier::Basic), 2);
        // Over-occupied tier admits nothing further.
        assert!(!slots.try_admit(Tier::Basic, 1, Uuid::new_v4()));
    }

    #[test]
    fn test_readmitting_held_slot_is_noop() {
        let slots = TierSlots::new();
        let a = Uuid::new_v4();
        assert!(slots.try_admit(Tier::Basic, 1, a));
        assert!(slots.try_admit(Tier::Basic, 1, a));
        assert_eq!(slots.running_count(Tier::Basic), 1);
    }
}
