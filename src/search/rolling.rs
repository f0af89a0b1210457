// Rabin-Karp substring scan.
//
// A polynomial rolling hash slides a window of `best + 1` bytes over
// the haystack; only hash hits are verified with the prefix matcher,
// and every verified improvement widens the window. A candidate whose
// window hash never matched cannot hold a longer match than the best at
// the time it was passed, so restarting the slide after an improvement
// loses nothing. Expected O(n + m).

use super::Found;
use super::lcp;

/// Modulus 2^31 - 1 (Mersenne prime) and base 257.
const MOD: u64 = (1 << 31) - 1;
const BASE: u64 = 257;

/// Polynomial hash state for one window width.
#[derive(Clone, Copy)]
struct RollingHash {
    window: usize,
    /// BASE^(window-1) mod MOD, for removing the outgoing byte.
    msb_weight: u64,
}

impl RollingHash {
    fn new(window: usize) -> Self {
        debug_assert!(window >= 1);
        let mut msb_weight = 1u64;
        for _ in 1..window {
            msb_weight = (msb_weight * BASE) % MOD;
        }
        Self { window, msb_weight }
    }

    /// Full hash of `data[..window]`.
    fn hash(&self, data: &[u8]) -> u64 {
        debug_assert!(data.len() >= self.window);
        let mut h = 0u64;
        for &b in &data[..self.window] {
            h = (h * BASE + u64::from(b)) % MOD;
        }
        h
    }

    /// Slide one byte: remove `out`, append `inc`.
    #[inline]
    fn roll(&self, h: u64, out: u8, inc: u8) -> u64 {
        let without = h + MOD * BASE - (u64::from(out) * self.msb_weight) % MOD;
        (without % MOD * BASE + u64::from(inc)) % MOD
    }
}

/// Longest prefix of `needle` beginning at some `start < candidate_end`
/// in `haystack`, if one strictly longer than `min_len` exists.
///
/// Same contract as the linear scan, including extension past
/// `candidate_end`.
pub(crate) fn scan(
    haystack: &[u8],
    candidate_end: usize,
    needle: &[u8],
    min_len: usize,
) -> Option<Found> {
    let mut best = None;
    let mut best_len = min_len;
    let mut start = 0usize;

    'rebuild: loop {
        // Window must fit in the needle and at the current start.
        let window = best_len + 1;
        if window > needle.len() || start >= candidate_end || start + window > haystack.len() {
            break;
        }

        let rh = RollingHash::new(window);
        let needle_hash = rh.hash(needle);
        let mut h = rh.hash(&haystack[start..]);

        loop {
            if h == needle_hash {
                // Hash hit: verify and extend.
                let (len, _) = lcp::common_prefix(&haystack[start..], needle);
                if len > best_len {
                    best_len = len;
                    best = Some(Found { start, len });
                    if len == needle.len() {
                        break 'rebuild;
                    }
                    start += 1;
                    continue 'rebuild; // widen the window
                }
            }
            if start + 1 >= candidate_end || start + 1 + window > haystack.len() {
                break 'rebuild;
            }
            h = rh.roll(h, haystack[start], haystack[start + window]);
            start += 1;
        }
    }
    best
}
