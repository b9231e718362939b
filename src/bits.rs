// =============================================================================
// Key splitting
// =============================================================================

/// Width of the key space covered by a base node.
pub(crate) const BASE_BITS: u32 = 8;

/// Number of keys covered by a base node.
pub(crate) const BASE_SIZE: usize = 1 << BASE_BITS;

/// Number of `u64` words in a base node bitmap.
pub(crate) const BITMAP_WORDS: usize = BASE_SIZE / 64;

/// Mask selecting the low `bit_width / 2` bits.
#[inline]
pub(crate) fn half_mask(bit_width: u32) -> u64 {
    debug_assert!(bit_width > BASE_BITS && bit_width <= u64::BITS);
    (1u64 << (bit_width / 2)) - 1
}

/// High half of `x`: the index of the cluster holding it.
#[inline]
pub(crate) fn cluster_of(x: u64, bit_width: u32) -> u64 {
    x >> (bit_width / 2)
}

/// Low half of `x`: its position inside its cluster.
#[inline]
pub(crate) fn offset_of(x: u64, bit_width: u32) -> u64 {
    x & half_mask(bit_width)
}

#[inline]
pub(crate) fn combine(cluster: u64, offset: u64, bit_width: u32) -> u64 {
    debug_assert!(offset <= half_mask(bit_width));
    (cluster << (bit_width / 2)) | offset
}

// =============================================================================
// 256-bit bitmap scans
// =============================================================================

#[inline]
pub(crate) fn first_set_bit(bitmap: &[u64; BITMAP_WORDS]) -> Option<u64> {
    for (word_idx, &word) in bitmap.iter().enumerate() {
        if word != 0 {
            return Some((word_idx * 64) as u64 + word.trailing_zeros() as u64);
        }
    }
    None
}

#[inline]
pub(crate) fn last_set_bit(bitmap: &[u64; BITMAP_WORDS]) -> Option<u64> {
    for (word_idx, &word) in bitmap.iter().enumerate().rev() {
        if word != 0 {
            return Some((word_idx * 64) as u64 + 63 - word.leading_zeros() as u64);
        }
    }
    None
}

/// Largest set bit strictly below `before`. `before` may be `BASE_SIZE`.
#[inline]
pub(crate) fn prev_set_bit(bitmap: &[u64; BITMAP_WORDS], before: u64) -> Option<u64> {
    if before == 0 {
        return None;
    }
    let last = (before - 1).min(BASE_SIZE as u64 - 1) as usize;
    let start_word = last / 64;
    let bit = last % 64;

    // Keep bits 0..=bit of the start word.
    let mask = if bit == 63 { u64::MAX } else { (1u64 << (bit + 1)) - 1 };
    let masked = bitmap[start_word] & mask;
    if masked != 0 {
        return Some((start_word * 64) as u64 + 63 - masked.leading_zeros() as u64);
    }

    for word_idx in (0..start_word).rev() {
        let word = bitmap[word_idx];
        if word != 0 {
            return Some((word_idx * 64) as u64 + 63 - word.leading_zeros() as u64);
        }
    }
    None
}
