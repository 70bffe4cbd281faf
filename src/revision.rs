//! Hard-fork ontology and block/time mapping.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// An ordered enumeration of hard forks, newest-last.
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Serialize, Deserialize,
)]
pub enum Revision {
    Istanbul,
    Berlin,
    London,
    Paris,
    Shanghai,
    Cancun,
    #[serde(rename = "UnknownNextRevision")]
    #[strum(serialize = "UnknownNextRevision")]
    UnknownNext,
}

impl Revision {
    pub const NEWEST_SUPPORTED: Revision = Revision::Cancun;

    /// The deterministic fork block used by this conformance model (not a
    /// real-chain block number).
    pub fn fork_block(&self) -> u64 {
        match self {
            Revision::Istanbul => 0,
            Revision::Berlin => 1000,
            Revision::London => 2000,
            Revision::Paris => 3000,
            Revision::Shanghai => 4000,
            Revision::Cancun => 5000,
            Revision::UnknownNext => 6000,
        }
    }

    /// The deterministic fork time used by this conformance model.
    pub fn fork_time(&self) -> u64 {
        self.fork_block()
    }

    fn ordered() -> [Revision; 7] {
        [
            Revision::Istanbul,
            Revision::Berlin,
            Revision::London,
            Revision::Paris,
            Revision::Shanghai,
            Revision::Cancun,
            Revision::UnknownNext,
        ]
    }

    /// The maximal revision `r` with `fork_block(r) <= block`, saturating to
    /// `UnknownNext` beyond the newest supported revision.
    pub fn for_block(block: u64) -> Revision {
        let mut best = Revision::Istanbul;
        for rev in Self::ordered() {
            if rev.fork_block() <= block {
                best = rev;
            }
        }
        best
    }

    /// `u64::MAX` for the newest supported revision (and for the
    /// `UnknownNext` sentinel, which has no successor); otherwise the gap to
    /// the next revision's fork block.
    ///
    /// `Revision` is a closed Rust enum, so every value is one of the
    /// variants above; `Error::UnknownRevision` in the crate's error
    /// taxonomy documents the contract for non-Rust callers but has no
    /// reachable call site here.
    pub fn block_range_length(&self) -> u64 {
        if *self == Self::NEWEST_SUPPORTED || *self == Revision::UnknownNext {
            return u64::MAX;
        }
        let next = match self {
            Revision::Istanbul => Revision::Berlin,
            Revision::Berlin => Revision::London,
            Revision::London => Revision::Paris,
            Revision::Paris => Revision::Shanghai,
            Revision::Shanghai => Revision::Cancun,
            Revision::Cancun | Revision::UnknownNext => unreachable!(),
        };
        next.fork_block() - self.fork_block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_lookup_scenario_s7() {
        assert_eq!(Revision::for_block(1500), Revision::Berlin);
        assert_eq!(Revision::for_block(5500), Revision::Cancun);
        assert_eq!(Revision::for_block(9_999_999), Revision::UnknownNext);
    }

    #[test]
    fn newest_supported_has_unbounded_range() {
        assert_eq!(Revision::Cancun.block_range_length(), u64::MAX);
    }

    #[test]
    fn block_range_length_is_gap_to_next_fork() {
        assert_eq!(Revision::Berlin.block_range_length(), 1000);
    }
}
