//! A prime field `F_p` for any odd prime `p < 2^64`, stored in canonical form.
//!
//! Multiplication goes through a `u128` product and a single reduction. This is not the
//! fastest representation for any particular prime, but it lets the same code serve 31-bit
//! primes, 64-bit primes and the tiny primes used to check algebraic identities in tests.

use core::cmp::Ordering;
use core::fmt::{self, Debug, Display, Formatter};
use core::hash::Hash;
use core::iter::{Product, Sum};
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Field, PrimeField64};

/// The data which defines a prime field.
pub trait FieldParameters:
    Copy + Clone + Default + Debug + Eq + PartialEq + Hash + Send + Sync + 'static
{
    /// An odd prime below `2^64`.
    const PRIME: u64;
}

#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
#[repr(transparent)] // Important for reasoning about memory layout.
pub struct Fp64<FP: FieldParameters> {
    /// The canonical representative, always less than `FP::PRIME`.
    value: u64,
    _phantom: PhantomData<FP>,
}

impl<FP: FieldParameters> Fp64<FP> {
    /// Create a new field element, reducing `value` modulo `P`.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self {
            value: value % FP::PRIME,
            _phantom: PhantomData,
        }
    }

    /// Convert a constant u64 array into a constant array of field elements.
    /// Constant version of array.map(Fp64::new).
    #[inline]
    pub const fn new_array<const N: usize>(input: [u64; N]) -> [Self; N] {
        let mut output = [Self::new(0); N];
        let mut i = 0;
        while i < N {
            output[i] = Self::new(input[i]);
            i += 1;
        }
        output
    }

    /// Convert a constant 2d u64 array into a constant 2d array of field elements.
    #[inline]
    pub const fn new_2d_array<const N: usize, const M: usize>(
        input: [[u64; N]; M],
    ) -> [[Self; N]; M] {
        let mut output = [[Self::new(0); N]; M];
        let mut i = 0;
        while i < M {
            output[i] = Self::new_array(input[i]);
            i += 1;
        }
        output
    }
}

impl<FP: FieldParameters> Ord for Fp64<FP> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<FP: FieldParameters> PartialOrd for Fp64<FP> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<FP: FieldParameters> Display for Fp64<FP> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

impl<FP: FieldParameters> Debug for Fp64<FP> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.value, f)
    }
}

impl<FP: FieldParameters> Distribution<Fp64<FP>> for StandardUniform {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fp64<FP> {
        // Rejection sampling on the smallest power of two above P, so every element is equally likely.
        let mask = u64::MAX >> (FP::PRIME - 1).leading_zeros();
        loop {
            let candidate = rng.next_u64() & mask;
            if candidate < FP::PRIME {
                return Fp64::new(candidate);
            }
        }
    }
}

impl<FP: FieldParameters> Serialize for Fp64<FP> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.value)
    }
}

impl<'de, FP: FieldParameters> Deserialize<'de> for Fp64<FP> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let val = u64::deserialize(d)?;
        Self::from_canonical_checked(val).ok_or_else(|| {
            serde::de::Error::custom(format_args!(
                "{val} is not a canonical element of F_{}",
                FP::PRIME
            ))
        })
    }
}

impl<FP: FieldParameters> Field for Fp64<FP> {
    const ZERO: Self = Self::new(0);
    const ONE: Self = Self::new(1);
    const TWO: Self = Self::new(2);
    const NEG_ONE: Self = Self::new(FP::PRIME - 1);

    #[inline]
    fn from_u64(int: u64) -> Self {
        Self::new(int)
    }

    fn try_inverse(&self) -> Option<Self> {
        // Fermat: x^(p - 2) = x^(-1) for x != 0.
        (!self.is_zero()).then(|| self.exp_u64(FP::PRIME - 2))
    }
}

impl<FP: FieldParameters> PrimeField64 for Fp64<FP> {
    const ORDER_U64: u64 = FP::PRIME;

    #[inline]
    fn as_canonical_u64(&self) -> u64 {
        self.value
    }

    #[inline]
    fn from_canonical_checked(int: u64) -> Option<Self> {
        (int < FP::PRIME).then(|| Self::new(int))
    }
}

impl<FP: FieldParameters> Add for Fp64<FP> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        // Both inputs are below P < 2^64, so a single conditional subtraction suffices
        // even when the u64 addition wraps.
        let (sum, over) = self.value.overflowing_add(rhs.value);
        let value = if over || sum >= FP::PRIME {
            sum.wrapping_sub(FP::PRIME)
        } else {
            sum
        };
        Self {
            value,
            _phantom: PhantomData,
        }
    }
}

impl<FP: FieldParameters> AddAssign for Fp64<FP> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<FP: FieldParameters> Sum for Fp64<FP> {
    #[inline]
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

impl<FP: FieldParameters> Sub for Fp64<FP> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let (diff, under) = self.value.overflowing_sub(rhs.value);
        let value = if under {
            diff.wrapping_add(FP::PRIME)
        } else {
            diff
        };
        Self {
            value,
            _phantom: PhantomData,
        }
    }
}

impl<FP: FieldParameters> SubAssign for Fp64<FP> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<FP: FieldParameters> Neg for Fp64<FP> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::ZERO - self
    }
}

impl<FP: FieldParameters> Mul for Fp64<FP> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let prod = u128::from(self.value) * u128::from(rhs.value);
        Self {
            value: (prod % u128::from(FP::PRIME)) as u64,
            _phantom: PhantomData,
        }
    }
}

impl<FP: FieldParameters> MulAssign for Fp64<FP> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<FP: FieldParameters> Product for Fp64<FP> {
    #[inline]
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, |acc, x| acc * x)
    }
}
