// Substring search back-ends for the encoder.
//
// The encoder asks two questions at every output position: where does
// the longest prefix of the remaining target occur in the source, and
// where does it recur in the target already written. All back-ends
// answer both through one trait and must agree on match lengths
// (start positions may differ when several matches tie):
//
// - `linear`  — exhaustive scan, best for small inputs
// - `rolling` — Rabin-Karp, best for medium and large inputs
// - `suffix`  — precomputed suffix array over the source, best when
//               many targets are encoded against one source
//
// Scratch state lives inside the backend instance and is rebuilt for
// every encode call; nothing persists between calls.

pub mod lcp;
pub mod linear;
pub mod rolling;
pub mod suffix;

use suffix::SuffixArray;

/// A located match: `haystack[start..start + len]` equals the first
/// `len` bytes of the needle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found {
    pub start: usize,
    pub len: usize,
}

/// Substring search over a fixed source and a growing target prefix.
pub trait SubstringSearch {
    /// Longest prefix of `needle` occurring anywhere in the source this
    /// backend was built over. Only matches strictly longer than
    /// `min_len` are reported.
    fn find_in_source(&mut self, needle: &[u8], min_len: usize) -> Option<Found>;

    /// Longest prefix of `target[pos..]` starting before `pos` within
    /// `target` itself. The match may extend past `pos`: an overlapping
    /// copy repeats the bytes it writes.
    fn find_in_target(&mut self, target: &[u8], pos: usize, min_len: usize) -> Option<Found>;
}

// ---------------------------------------------------------------------------
// Back-end implementations
// ---------------------------------------------------------------------------

/// Exhaustive scan backend.
pub struct LinearSearch<'a> {
    source: &'a [u8],
}

impl<'a> LinearSearch<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self { source }
    }
}

impl SubstringSearch for LinearSearch<'_> {
    fn find_in_source(&mut self, needle: &[u8], min_len: usize) -> Option<Found> {
        linear::scan(self.source, self.source.len(), needle, min_len)
    }

    fn find_in_target(&mut self, target: &[u8], pos: usize, min_len: usize) -> Option<Found> {
        linear::scan(target, pos, &target[pos..], min_len)
    }
}

/// Rabin-Karp backend.
pub struct RollingSearch<'a> {
    source: &'a [u8],
}

impl<'a> RollingSearch<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self { source }
    }
}

impl SubstringSearch for RollingSearch<'_> {
    fn find_in_source(&mut self, needle: &[u8], min_len: usize) -> Option<Found> {
        rolling::scan(self.source, self.source.len(), needle, min_len)
    }

    fn find_in_target(&mut self, target: &[u8], pos: usize, min_len: usize) -> Option<Found> {
        rolling::scan(target, pos, &target[pos..], min_len)
    }
}

/// Suffix-array backend.
///
/// The array indexes the immutable source only; the growing target
/// prefix cannot be pre-indexed, so target-side queries use the
/// rolling-hash scan.
pub struct SuffixSearch<'a> {
    index: SuffixArray<'a>,
}

impl<'a> SuffixSearch<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            index: SuffixArray::new(source),
        }
    }
}

impl SubstringSearch for SuffixSearch<'_> {
    fn find_in_source(&mut self, needle: &[u8], min_len: usize) -> Option<Found> {
        self.index.find_longest(needle, min_len)
    }

    fn find_in_target(&mut self, target: &[u8], pos: usize, min_len: usize) -> Option<Found> {
        rolling::scan(target, pos, &target[pos..], min_len)
    }
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// Inputs up to this size use the exhaustive scan.
const LINEAR_CUTOFF: usize = 64 * 1024;

/// Which substring-search implementation an encode call uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// Exhaustive scan. Mandatory baseline, best for small inputs.
    Linear,
    /// Rabin-Karp rolling hash. Best general-purpose choice.
    #[default]
    RollingHash,
    /// Suffix array over the source. Amortizes when one source is
    /// encoded against many targets; per call it pays an index build.
    SuffixArray,
}

impl Backend {
    /// Pick a backend from the source size: linear below 64 KiB,
    /// rolling hash above.
    pub fn auto(source_len: usize) -> Backend {
        if source_len <= LINEAR_CUTOFF {
            Backend::Linear
        } else {
            Backend::RollingHash
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
