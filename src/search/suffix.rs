// Suffix-array substring search.
//
// A sorted array of all suffix start indices of the source, built once
// per encode call and queried for every output position. The query
// binary-searches the band of suffixes sharing the needle's first byte,
// then extends each with the prefix matcher and keeps the maximum.
// Construction is sort-based (quadratic-log worst case on degenerate
// inputs); queries are O(log n + band). Pays off when one source is
// searched many times.

use super::Found;
use super::lcp;

/// Sorted suffix index over one immutable byte range.
pub struct SuffixArray<'a> {
    data: &'a [u8],
    sa: Vec<u32>,
}

impl<'a> SuffixArray<'a> {
    /// Build the index. `data` must be within the 2^31-1 size limit so
    /// indices fit in u32.
    pub fn new(data: &'a [u8]) -> Self {
        debug_assert!(data.len() <= u32::MAX as usize);
        let mut sa: Vec<u32> = (0..data.len() as u32).collect();
        sa.sort_unstable_by(|&a, &b| data[a as usize..].cmp(&data[b as usize..]));
        Self { data, sa }
    }

    /// Longest prefix of `needle` occurring anywhere in the indexed
    /// data, if one strictly longer than `min_len` exists.
    pub fn find_longest(&self, needle: &[u8], min_len: usize) -> Option<Found> {
        let Some(&first) = needle.first() else {
            return None;
        };

        // Band of suffixes whose first byte equals needle[0].
        let lo = self
            .sa
            .partition_point(|&i| self.data[i as usize] < first);
        let hi = self
            .sa
            .partition_point(|&i| self.data[i as usize] <= first);

        let mut best = None;
        let mut best_len = min_len;
        for &i in &self.sa[lo..hi] {
            let start = i as usize;
            if self.data.len() - start <= best_len {
                continue; // too close to the end to improve
            }
            let (len, _) = lcp::common_prefix(&self.data[start..], needle);
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::linear;

    #[test]
    fn index_is_sorted() {
        let data = b"banana";
        let sa = SuffixArray::new(data);
        for w in sa.sa.windows(2) {
            assert!(data[w[0] as usize..] < data[w[1] as usize..]);
        }
    }

    #[test]
    fn finds_longest_occurrence() {
        let data = b"ab_abcd_abcdef";
        let found = SuffixArray::new(data).find_longest(b"abcdefgh", 0).unwrap();
        assert_eq!((found.start, found.len), (8, 6));
    }

    #[test]
    fn empty_needle_and_empty_data() {
        assert!(SuffixArray::new(b"").find_longest(b"abc", 0).is_none());
        assert!(SuffixArray::new(b"abc").find_longest(b"", 0).is_none());
    }

    #[test]
    fn agrees_with_linear_on_pseudorandom_data() {
        let mut state = 0x1234_5678u64;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 33) as u8
        };
        for round in 0..50 {
            let data: Vec<u8> = (0..300).map(|_| next() & 3).collect();
            let needle: Vec<u8> = (0..20).map(|_| next() & 3).collect();
            let sa = SuffixArray::new(&data);
            let a = sa.find_longest(&needle, 3);
            let b = linear::scan(&data, data.len(), &needle, 3);
            assert_eq!(
                a.as_ref().map(|f| f.len),
                b.as_ref().map(|f| f.len),
                "round {round}"
            );
        }
    }
}
