use core::fmt::{Debug, Display};
use core::hash::Hash;
use core::iter::{Product, Sum};
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::log2_ceil_u64;

/// A field `F`. Elements are public values; secret values live in share types built on top.
pub trait Field:
    'static
    + Copy
    + Default
    + Eq
    + Hash
    + Debug
    + Display
    + Send
    + Sync
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + Neg<Output = Self>
    + Mul<Output = Self>
    + MulAssign
    + Sum
    + Product
    + Serialize
    + DeserializeOwned
{
    const ZERO: Self;
    const ONE: Self;
    const TWO: Self;
    const NEG_ONE: Self;

    /// Reduce an arbitrary `u64` into the field.
    fn from_u64(int: u64) -> Self;

    #[inline]
    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    #[inline]
    fn double(&self) -> Self {
        *self + *self
    }

    #[inline]
    fn square(&self) -> Self {
        *self * *self
    }

    #[inline]
    fn cube(&self) -> Self {
        self.square() * *self
    }

    /// Square-and-multiply exponentiation.
    fn exp_u64(&self, power: u64) -> Self {
        let mut current = *self;
        let mut product = Self::ONE;

        for j in 0..bits_u64(power) {
            if (power >> j) & 1 != 0 {
                product *= current;
            }
            current = current.square();
        }
        product
    }

    /// Exponentiation by a small constant, unrolled for the degrees used as S-boxes.
    #[must_use]
    #[inline(always)]
    fn exp_const_u64<const POWER: u64>(&self) -> Self {
        match POWER {
            0 => Self::ONE,
            1 => *self,
            2 => self.square(),
            3 => self.cube(),
            5 => self.square().square() * *self,
            7 => {
                let x2 = self.square();
                x2.cube() * *self
            }
            _ => self.exp_u64(POWER),
        }
    }

    /// The multiplicative inverse, or `None` for zero.
    fn try_inverse(&self) -> Option<Self>;

    fn inverse(&self) -> Self {
        self.try_inverse().expect("Tried to invert zero")
    }
}

/// A prime field whose order fits in a `u64`.
pub trait PrimeField64: Field + Ord {
    const ORDER_U64: u64;

    /// Return the representative of `self` in `[0, ORDER_U64)`.
    fn as_canonical_u64(&self) -> u64;

    /// Interpret `int` as a field element, or `None` if it is not below the order.
    fn from_canonical_checked(int: u64) -> Option<Self>;

    /// The number of bits needed to write down an element, `ceil(log2(p))`.
    fn bits() -> usize {
        log2_ceil_u64(Self::ORDER_U64)
    }
}

const fn bits_u64(n: u64) -> usize {
    (64 - n.leading_zeros()) as usize
}
