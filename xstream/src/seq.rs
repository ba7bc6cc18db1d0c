//! Wrap-safe frame-number comparison (spec.md §9).
//!
//! `frameNumber` is a `u16` that wraps from `0xFFFF` back to `0x0000`.
//! Comparing frame numbers with plain signed subtraction misbehaves exactly
//! at the wrap boundary; this module is the fix, used by both the sender's
//! pre-emption check and the reader's frame-boundary detection.

/// True if `a` is strictly later in sequence than `b`, tolerating wraparound
/// by treating the `u16` space as a half-open ring: `a` is "after" `b` when
/// the forward distance from `b` to `a` is nonzero and less than half the
/// ring (`0x8000`).
pub fn is_after(a: u16, b: u16) -> bool {
    let diff = a.wrapping_sub(b);
    diff != 0 && diff < 0x8000
}

/// Forward distance from `from` to `to`, i.e. how many increments of `from`
/// (wrapping) reach `to`. Used to count frames skipped between two
/// completions.
pub fn forward_distance(from: u16, to: u16) -> u16 {
    to.wrapping_sub(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_ordering() {
        assert!(is_after(5, 4));
        assert!(!is_after(4, 5));
        assert!(!is_after(4, 4));
    }

    #[test]
    fn wraps_past_max() {
        assert!(is_after(0x0000, 0xFFFF));
        assert!(!is_after(0xFFFF, 0x0000));
    }

    #[test]
    fn halfway_point_is_not_after() {
        // Exactly opposite points on the ring: neither is "after" the other
        // under this definition (diff == 0x8000 fails the strict `<`).
        assert!(!is_after(0x8000, 0x0000));
    }

    #[test]
    fn forward_distance_wraps() {
        assert_eq!(forward_distance(0xFFFE, 0x0001), 3);
        assert_eq!(forward_distance(10, 10), 0);
    }
}
