// Exhaustive substring scan.
//
// Tries every candidate start and extends with the prefix matcher. The
// one optimization that matters: once a match of length L is known, no
// start past `haystack.len() - L` can improve it, so the scan range
// shrinks as matches grow. Worst case O(n*m); the right choice for
// small inputs where building index structures costs more than it saves.

use super::Found;
use super::lcp;

/// Longest prefix of `needle` beginning at some `start < candidate_end`
/// in `haystack`, if one strictly longer than `min_len` exists.
///
/// Extension is not limited by `candidate_end`: a match may run past it
/// to the end of `haystack`. Ties keep the leftmost start.
pub(crate) fn scan(
    haystack: &[u8],
    candidate_end: usize,
    needle: &[u8],
    min_len: usize,
) -> Option<Found> {
    let mut best = None;
    let mut best_len = min_len;

    for start in 0..candidate_end {
        // Starts this far right cannot beat the current best.
        if start + best_len >= haystack.len() {
            break;
        }
        let (len, _) = lcp::common_prefix(&haystack[start..], needle);
        if len > best_len {
            best_len = len;
            best = Some(Found { start, len });
            if len == needle.len() {
                break;
            }
        }
    }
    best
}
