//! The secret-sharing substrate the Poseidon2 permutation runs on.
//!
//! The permutation only ever needs a handful of operations on shares: local linear
//! combinations with public scalars, a batched opening and a batched secure multiplication.
//! Everything a real protocol has to do over the network is hidden behind [`MpcEngine`] and
//! [`RandomSquares`].
//!
//! Two in-process backends are provided:
//! - [`Cleartext`] where a "share" is the value itself and opening is a copy.
//! - [`LocalAdditive`] which simulates every party of an additive sharing scheme, with a
//!   trusted dealer supplying Beaver triples and random squares.

mod additive;
mod cleartext;
mod stats;

use std::fmt::Debug;
use std::slice;

pub use additive::*;
pub use cleartext::*;
use itertools::Itertools;
use p2mpc_field::{Field, PrimeField64};
pub use stats::*;

/// A secret-sharing backend over the prime field `Self::F`.
///
/// Local operations never communicate. [`MpcEngine::open_many`] and [`MpcEngine::mul_many`]
/// each cost one network round regardless of the batch size. The security model is
/// abort-on-fault: implementations must panic if the underlying transport fails.
pub trait MpcEngine: Sync {
    type F: PrimeField64;
    type Share: Clone + Debug + Send + Sync;

    /// A sharing of a public value.
    fn share_public(&self, value: Self::F) -> Self::Share;

    fn add(&self, lhs: &Self::Share, rhs: &Self::Share) -> Self::Share;

    fn sub(&self, lhs: &Self::Share, rhs: &Self::Share) -> Self::Share;

    fn add_public(&self, lhs: &Self::Share, rhs: Self::F) -> Self::Share;

    fn mul_public(&self, lhs: &Self::Share, rhs: Self::F) -> Self::Share;

    /// Reveal every share in the batch to all parties, in a single round.
    fn open_many(&self, shares: &[Self::Share]) -> Vec<Self::F>;

    /// Multiply the batches element-wise, in a single round.
    fn mul_many(&self, lhs: &[Self::Share], rhs: &[Self::Share]) -> Vec<Self::Share>;

    fn neg(&self, share: &Self::Share) -> Self::Share {
        self.mul_public(share, Self::F::NEG_ONE)
    }

    fn open(&self, share: &Self::Share) -> Self::F {
        self.open_many(slice::from_ref(share))[0]
    }

    fn mul(&self, lhs: &Self::Share, rhs: &Self::Share) -> Self::Share {
        let mut product = self.mul_many(slice::from_ref(lhs), slice::from_ref(rhs));
        product.swap_remove(0)
    }

    /// Sum a collection of shares. The empty sum is a sharing of zero.
    fn sum<'a, I>(&self, shares: I) -> Self::Share
    where
        I: IntoIterator<Item = &'a Self::Share>,
        Self::Share: 'a,
    {
        let mut iter = shares.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first.clone(), |acc, s| self.add(&acc, s)),
            None => self.share_public(Self::F::ZERO),
        }
    }

    /// `sum_i coeffs[i] * shares[i]` for public coefficients. Purely local.
    fn dot_public(&self, coeffs: &[Self::F], shares: &[Self::Share]) -> Self::Share {
        coeffs
            .iter()
            .zip_eq(shares)
            .map(|(&c, s)| self.mul_public(s, c))
            .reduce(|acc, term| self.add(&acc, &term))
            .unwrap_or_else(|| self.share_public(Self::F::ZERO))
    }
}

/// A source of correlated randomness: sharings of a uniformly random `r` together with `r^2`.
///
/// Where the pairs come from (a dealer, an offline phase, a dedicated sub-protocol) is up to the
/// backend. No party may learn `r`.
pub trait RandomSquares: MpcEngine {
    fn random_squares(&self, n: usize) -> Vec<(Self::Share, Self::Share)>;
}

/// The input phase: turning a value one party knows into a sharing.
pub trait InputSharing: MpcEngine {
    fn share_secret(&self, value: Self::F) -> Self::Share;

    fn share_secrets<const N: usize>(&self, values: [Self::F; N]) -> [Self::Share; N] {
        values.map(|v| self.share_secret(v))
    }
}
