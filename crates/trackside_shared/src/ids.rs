//! Domain identifiers.
//!
//! The UI never interprets these beyond equality; the timing backend owns
//! what a race or a pilot actually is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a race known to the timing backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RaceId(pub u64);

impl RaceId {
    /// Creates a race ID.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "race#{}", self.0)
    }
}

/// Identifier of a pilot registered with the timing backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PilotId(pub u64);

impl PilotId {
    /// Creates a pilot ID.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PilotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pilot#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(RaceId::new(3).to_string(), "race#3");
        assert_eq!(PilotId::new(12).to_string(), "pilot#12");
    }
}
