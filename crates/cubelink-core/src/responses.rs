//! Last-observed response values.
//!
//! The protocol carries no request IDs. A request/response call snapshots
//! the observation version of a slot, sends its command, then waits for the
//! version to advance. Any notification of that kind advances it, solicited
//! or not, so concurrent callers waiting on the same slot are all satisfied
//! by the same update.

use cubelink_proto::{CubeState, CubeType};

/// A cached value and how many times it has been observed.
#[derive(Debug, Clone, PartialEq)]
pub struct Observed<T> {
    value: Option<T>,
    version: u64,
}

impl<T> Default for Observed<T> {
    fn default() -> Self {
        Self { value: None, version: 0 }
    }
}

impl<T: Clone> Observed<T> {
    /// Store a fresh observation. The version advances even when the value
    /// is equal to the previous one.
    pub fn record(&mut self, value: T) {
        self.value = Some(value);
        self.version = self.version.wrapping_add(1);
    }

    /// Observation counter; 0 means never observed.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Latest value, if any.
    pub fn value(&self) -> Option<T> {
        self.value.clone()
    }

    /// The value if it was observed after `version`.
    pub fn newer_than(&self, version: u64) -> Option<T> {
        if self.version != version { self.value.clone() } else { None }
    }
}

/// Every response slot a request/response call can wait on.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    /// Battery percentage, already clamped.
    pub battery: Observed<u8>,
    /// Full sticker state.
    pub state: Observed<CubeState>,
    /// Hardware variant.
    pub cube_type: Observed<CubeType>,
    /// Offline statistics text.
    pub offline_stats: Observed<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_advances_on_equal_values() {
        let mut slot = Observed::default();
        assert_eq!(slot.version(), 0);
        assert_eq!(slot.value(), None);

        slot.record(50u8);
        let seen = slot.version();
        slot.record(50u8);
        assert_eq!(slot.newer_than(seen), Some(50));
        assert_eq!(slot.newer_than(slot.version()), None);
    }

    #[test]
    fn cache_slots_are_independent() {
        let mut cache = ResponseCache::default();
        let before = cache.state.version();
        cache.battery.record(80);
        cache.cube_type.record(CubeType::Edge);
        assert_eq!(cache.state.newer_than(before), None);
        assert_eq!(cache.cube_type.value(), Some(CubeType::Edge));
    }
}
