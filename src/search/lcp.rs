// Longest-common-prefix byte matcher.
//
// Compares two byte ranges in SIMD-vector strides and falls back to
// scalar comparison to pinpoint the first mismatch. Platform dispatch:
// AVX2 (32 bytes) then SSE2 (16 bytes) on x86_64, NEON (16 bytes) on
// aarch64, u64-XOR scalar everywhere else. The dispatched and scalar
// paths must return identical results for any input; the property tests
// cross-validate them.

/// Function type for prefix-compare routines.
type LcpFn = fn(&[u8], &[u8], usize) -> usize;

/// Length of the longest common prefix of `a` and `b`, and whether `b`
/// was exhausted (the match covers all of `b`).
#[inline]
pub fn common_prefix(a: &[u8], b: &[u8]) -> (usize, bool) {
    let n = a.len().min(b.len());
    let len = lcp_fn()(a, b, n);
    (len, len == b.len())
}

/// Scalar reference implementation of [`common_prefix`].
///
/// Kept public so tests can cross-validate the dispatched path.
#[inline]
pub fn common_prefix_scalar(a: &[u8], b: &[u8]) -> (usize, bool) {
    let n = a.len().min(b.len());
    let len = lcp_scalar(a, b, n);
    (len, len == b.len())
}

/// Pick the best prefix-compare implementation for the current CPU.
#[inline]
fn lcp_fn() -> LcpFn {
    #[cfg(target_arch = "x86_64")]
    {
        return lcp_x86_dispatch();
    }

    #[cfg(target_arch = "aarch64")]
    {
        return lcp_neon_call;
    }

    #[allow(unreachable_code)]
    lcp_scalar
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn lcp_x86_dispatch() -> LcpFn {
    use std::sync::OnceLock;
    static DISPATCH: OnceLock<LcpFn> = OnceLock::new();
    *DISPATCH.get_or_init(|| {
        if is_x86_feature_detected!("avx2") {
            lcp_avx2_call
        } else if is_x86_feature_detected!("sse2") {
            lcp_sse2_call
        } else {
            lcp_scalar
        }
    })
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn lcp_avx2_call(a: &[u8], b: &[u8], n: usize) -> usize {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { lcp_avx2(a, b, n) }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn lcp_sse2_call(a: &[u8], b: &[u8], n: usize) -> usize {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { lcp_sse2(a, b, n) }
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn lcp_neon_call(a: &[u8], b: &[u8], n: usize) -> usize {
    // Safety: NEON is mandatory on aarch64.
    unsafe { lcp_neon(a, b, n) }
}

/// Scalar fallback: compare 8 bytes at a time using u64 XOR.
#[inline]
fn lcp_scalar(a: &[u8], b: &[u8], n: usize) -> usize {
    let mut i = 0;
    let p1 = a.as_ptr();
    let p2 = b.as_ptr();

    while i + 8 <= n {
        // Safety: loop guard ensures i..i+8 in bounds for both slices.
        let x = unsafe { std::ptr::read_unaligned(p1.add(i) as *const u64) };
        // Safety: loop guard ensures i..i+8 in bounds for both slices.
        let y = unsafe { std::ptr::read_unaligned(p2.add(i) as *const u64) };
        let xor = x ^ y;
        if xor != 0 {
            let diff_byte = if cfg!(target_endian = "little") {
                (xor.trailing_zeros() / 8) as usize
            } else {
                (xor.leading_zeros() / 8) as usize
            };
            return i + diff_byte;
        }
        i += 8;
    }

    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn lcp_avx2(a: &[u8], b: &[u8], n: usize) -> usize {
    use std::arch::x86_64::*;
    let mut i = 0;

    unsafe {
        while i + 32 <= n {
            let x = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
            let y = _mm256_loadu_si256(b.as_ptr().add(i) as *const __m256i);
            let cmp = _mm256_cmpeq_epi8(x, y);
            let mask = _mm256_movemask_epi8(cmp) as u32;
            if mask != 0xFFFF_FFFF {
                return i + (!mask).trailing_zeros() as usize;
            }
            i += 32;
        }

        if i + 16 <= n {
            let x = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
            let y = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
            let cmp = _mm_cmpeq_epi8(x, y);
            let mask = _mm_movemask_epi8(cmp) as u32;
            if mask != 0xFFFF {
                return i + (!(mask as u16)).trailing_zeros() as usize;
            }
            i += 16;
        }
    }

    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn lcp_sse2(a: &[u8], b: &[u8], n: usize) -> usize {
    use std::arch::x86_64::*;
    let mut i = 0;

    unsafe {
        while i + 16 <= n {
            let x = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
            let y = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
            let cmp = _mm_cmpeq_epi8(x, y);
            let mask = _mm_movemask_epi8(cmp) as u32;
            if mask != 0xFFFF {
                return i + (!(mask as u16)).trailing_zeros() as usize;
            }
            i += 16;
        }
    }

    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

#[cfg(target_arch = "aarch64")]
unsafe fn lcp_neon(a: &[u8], b: &[u8], n: usize) -> usize {
    use std::arch::aarch64::*;
    let mut i = 0;

    unsafe {
        while i + 16 <= n {
            let x = vld1q_u8(a.as_ptr().add(i));
            let y = vld1q_u8(b.as_ptr().add(i));
            let cmp = vceqq_u8(x, y);
            if vminvq_u8(cmp) == 0 {
                let not_eq = vmvnq_u8(cmp);
                let mut arr = [0u8; 16];
                vst1q_u8(arr.as_mut_ptr(), not_eq);
                for (j, &v) in arr.iter().enumerate() {
                    if v != 0 {
                        return i + j;
                    }
                }
            }
            i += 16;
        }
    }

    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
