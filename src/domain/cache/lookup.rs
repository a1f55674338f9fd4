//! Lookup parameters and outcomes

use super::CachedValue;

/// Per-lookup tuning knobs.
///
/// Both values are deployment configuration, not fixed constants:
/// stricter deployments raise the threshold, recall-hungry ones lower it.
#[derive(Debug, Clone, Copy)]
pub struct LookupOptions {
    /// Minimum similarity in `[0, 1]` for a neighbor to count as a hit.
    /// The comparison is inclusive.
    pub threshold: f32,
    /// Number of neighbors fetched from the index.
    pub k: usize,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            threshold: 0.75,
            k: 3,
        }
    }
}

impl LookupOptions {
    pub fn new(threshold: f32, k: usize) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            k,
        }
    }
}

/// Why a lookup came back empty.
///
/// Misses carry their cause so callers and tests can distinguish "the
/// index had nothing close enough" from "the index was unreachable and
/// we failed open".
#[derive(Debug, Clone, PartialEq)]
pub enum MissReason {
    /// The query returned no neighbors at all.
    NoNeighbors,
    /// The nearest neighbor fell below the similarity threshold.
    BelowThreshold { best_similarity: f32 },
    /// The index query failed; treated as a miss rather than an error.
    SearchFailed { cause: String },
    /// The embed/query phase exceeded the operation timeout.
    TimedOut,
}

/// Result of a semantic lookup.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    /// A neighbor at or above the threshold was found.
    Hit {
        /// Decoded cached payload.
        value: CachedValue,
        /// Similarity of the matched entry.
        similarity: f32,
        /// Key of the matched entry.
        key: String,
    },
    /// Nothing usable in the cache, with the reason why.
    Miss(MissReason),
}

impl LookupOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    /// The cached value, if this was a hit.
    pub fn into_value(self) -> Option<CachedValue> {
        match self {
            Self::Hit { value, .. } => Some(value),
            Self::Miss(_) => None,
        }
    }
}
