#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn default_min_update_interval_ms() -> u32 {
    5000
}

fn default_talker_constellation() -> bool {
    true
}

/// [Source](crate::prelude::Source) and [Aggregator](crate::prelude::Aggregator) parametrization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Minimal update interval (in milliseconds). Fresh satellites data
    /// cannot be produced faster than the receiver cadence, so any
    /// update request with a shorter timeout fails immediately.
    #[cfg_attr(feature = "serde", serde(default = "default_min_update_interval_ms"))]
    pub min_update_interval_ms: u32,
    /// Resolve the [Constellation](crate::prelude::Constellation) from the
    /// sentence talker ID. When turned off, every satellite is reported as GPS.
    #[cfg_attr(feature = "serde", serde(default = "default_talker_constellation"))]
    pub talker_constellation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_update_interval_ms: default_min_update_interval_ms(),
            talker_constellation: default_talker_constellation(),
        }
    }
}

impl Config {
    /// Copies and returns [Config] with updated minimal update interval.
    pub fn with_min_update_interval_ms(&self, interval_ms: u32) -> Self {
        let mut s = *self;
        s.min_update_interval_ms = interval_ms;
        s
    }

    /// Copies and returns [Config] with talker to constellation resolution
    /// turned on or off.
    pub fn with_talker_constellation(&self, enabled: bool) -> Self {
        let mut s = *self;
        s.talker_constellation = enabled;
        s
    }
}
