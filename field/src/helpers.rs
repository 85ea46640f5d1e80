use alloc::vec::Vec;

use itertools::Itertools;

use crate::Field;

/// Computes `ceil(log_2(n))`, the number of bits needed to write down any integer below `n`.
#[must_use]
pub const fn log2_ceil_u64(n: u64) -> usize {
    (u64::BITS - n.saturating_sub(1).leading_zeros()) as usize
}

/// Compute the dot product of two equal length slices.
pub fn dot_product<F: Field>(lhs: &[F], rhs: &[F]) -> F {
    lhs.iter().zip_eq(rhs).map(|(&x, &y)| x * y).sum()
}

/// Multiply a dense row-major matrix by a vector.
pub fn matrix_vector_product<F: Field>(matrix: &[Vec<F>], vector: &[F]) -> Vec<F> {
    matrix.iter().map(|row| dot_product(row, vector)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log2_ceil() {
        assert_eq!(log2_ceil_u64(0), 0);
        assert_eq!(log2_ceil_u64(1), 0);
        assert_eq!(log2_ceil_u64(101), 7);
        assert_eq!(log2_ceil_u64(256), 8);
        assert_eq!(log2_ceil_u64(257), 9);
        assert_eq!(log2_ceil_u64(0x7f00_0001), 31);
        assert_eq!(log2_ceil_u64(0xffff_ffff_0000_0001), 64);
    }
}
