//! Joint handles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arena::Index;

/// Handle to a joint stored in a joint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointId(pub Index);

impl JointId {
    /// Create a joint ID from raw slot and generation values.
    #[must_use]
    pub const fn from_raw_parts(slot: u32, generation: u32) -> Self {
        Self(Index::from_raw_parts(slot, generation))
    }

    /// Get the underlying arena index.
    #[must_use]
    pub const fn index(self) -> Index {
        self.0
    }

    /// Raw value suitable for error messages and logs.
    #[must_use]
    pub const fn raw(self) -> u64 {
        let (slot, generation) = self.0.into_raw_parts();
        ((generation as u64) << 32) | slot as u64
    }
}

impl From<Index> for JointId {
    fn from(index: Index) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "Joint({slot}v{generation})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_id_roundtrip() {
        let id = JointId::from_raw_parts(2, 5);
        assert_eq!(id.index().into_raw_parts(), (2, 5));
        assert_eq!(id.to_string(), "Joint(2v5)");
    }
}
