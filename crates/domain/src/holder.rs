use chrono::{DateTime, Utc};

/// Last accepted lease holder and its change generation.
///
/// The state starts empty with generation zero. The first accepted observation
/// always counts as a change, so `generation` equals the number of accepted
/// observations and `ever_observed` never reverts once set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolderState {
    holder: String,
    acquire_time: Option<DateTime<Utc>>,
    generation: u64,
    ever_observed: bool,
}

impl HolderState {
    /// Creates the initial, never observed state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current holder identity, empty before the first observation.
    #[must_use]
    pub fn holder(&self) -> &str {
        self.holder.as_str()
    }

    /// Returns the acquire time of the current holder.
    #[must_use]
    pub fn acquire_time(&self) -> Option<DateTime<Utc>> {
        self.acquire_time
    }

    /// Returns the number of accepted holder changes.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns whether the lease has been read successfully at least once.
    #[must_use]
    pub fn ever_observed(&self) -> bool {
        self.ever_observed
    }

    /// Returns true when the observed holder or acquire time differs from the
    /// current state.
    #[must_use]
    pub fn is_genuine_change(&self, holder: &str, acquire_time: Option<DateTime<Utc>>) -> bool {
        !self.ever_observed || self.holder != holder || self.acquire_time != acquire_time
    }

    /// Applies an observation and returns the new generation, or `None` when the
    /// observation duplicates the current state.
    pub fn accept(&mut self, holder: &str, acquire_time: Option<DateTime<Utc>>) -> Option<u64> {
        if !self.is_genuine_change(holder, acquire_time) {
            return None;
        }

        holder.clone_into(&mut self.holder);
        self.acquire_time = acquire_time;
        self.generation = self.generation.saturating_add(1);
        self.ever_observed = true;
        Some(self.generation)
    }

    /// Returns a point-in-time view for status reporting.
    #[must_use]
    pub fn info(&self) -> HolderInfo {
        HolderInfo {
            holder_identity: self.holder.clone(),
            acquire_time: self.acquire_time.map_or(0, |time| time.timestamp()),
            generation: self.generation,
        }
    }
}

/// Status view of the tracked holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderInfo {
    /// Current holder identity.
    pub holder_identity: String,
    /// Acquire time in epoch seconds, zero when unknown.
    pub acquire_time: i64,
    /// Number of accepted holder changes.
    pub generation: u64,
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;

    use super::HolderState;

    fn at(seconds: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(seconds, 0).single()
    }

    fn observation() -> impl Strategy<Value = (String, Option<DateTime<Utc>>)> {
        (
            prop::sample::select(vec!["node-1", "node-2", "node-3"]),
            prop::option::of(0_i64..4),
        )
            .prop_map(|(holder, seconds)| (holder.to_owned(), seconds.and_then(at)))
    }

    #[test]
    fn first_observation_is_always_accepted() {
        let mut state = HolderState::new();
        assert!(!state.ever_observed());

        assert_eq!(state.accept("", None), Some(1));
        assert!(state.ever_observed());
        assert_eq!(state.holder(), "");
    }

    #[test]
    fn acquire_time_absent_versus_present_is_a_change() {
        let mut state = HolderState::new();
        assert_eq!(state.accept("node-1", None), Some(1));
        assert_eq!(state.accept("node-1", None), None);
        assert_eq!(state.accept("node-1", at(10)), Some(2));
        assert_eq!(state.accept("node-1", None), Some(3));
    }

    #[test]
    fn info_reports_epoch_seconds_and_zero_when_unknown() {
        let mut state = HolderState::new();
        assert_eq!(state.info().acquire_time, 0);

        state.accept("node-1", at(1_700_000_000));
        let info = state.info();
        assert_eq!(info.holder_identity, "node-1");
        assert_eq!(info.acquire_time, 1_700_000_000);
        assert_eq!(info.generation, 1);
    }

    proptest! {
        #[test]
        fn duplicate_observations_never_mutate_state(
            (holder, acquire_time) in observation(),
            repeats in 1_usize..8,
        ) {
            let mut state = HolderState::new();
            state.accept(holder.as_str(), acquire_time);
            let accepted = state.clone();

            for _ in 0..repeats {
                prop_assert_eq!(state.accept(holder.as_str(), acquire_time), None);
            }
            prop_assert_eq!(state, accepted);
        }

        #[test]
        fn generation_counts_genuine_changes_exactly(
            observations in prop::collection::vec(observation(), 1..32),
        ) {
            let mut state = HolderState::new();
            let mut expected_generation = 0_u64;

            for (holder, acquire_time) in observations {
                let genuine = state.is_genuine_change(holder.as_str(), acquire_time);
                let before = state.generation();
                let accepted = state.accept(holder.as_str(), acquire_time);

                if genuine {
                    expected_generation += 1;
                    prop_assert_eq!(accepted, Some(before + 1));
                    prop_assert_eq!(state.holder(), holder.as_str());
                    prop_assert_eq!(state.acquire_time(), acquire_time);
                } else {
                    prop_assert_eq!(accepted, None);
                }
                prop_assert_eq!(state.generation(), expected_generation);
                prop_assert!(state.ever_observed());
            }
        }
    }
}
