use std::marker::PhantomData;
use std::sync::{Mutex, PoisonError};

use itertools::Itertools;
use p2mpc_field::PrimeField64;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{CommunicationCounter, CommunicationStats, InputSharing, MpcEngine, RandomSquares};

/// A single-party backend where shares are plain field elements.
///
/// Opening is a copy and multiplication is local, but both are still counted as rounds so that
/// the communication shape of a protocol can be checked without a real sharing scheme.
/// The random squares are genuinely random so that masking code paths are exercised.
#[derive(Debug)]
pub struct Cleartext<F> {
    rng: Mutex<SmallRng>,
    counter: CommunicationCounter,
    _phantom: PhantomData<F>,
}

impl<F> Cleartext<F> {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
            counter: CommunicationCounter::default(),
            _phantom: PhantomData,
        }
    }

    pub fn stats(&self) -> CommunicationStats {
        self.counter.snapshot()
    }
}

impl<F: PrimeField64> MpcEngine for Cleartext<F> {
    type F = F;
    type Share = F;

    #[inline]
    fn share_public(&self, value: F) -> F {
        value
    }

    #[inline]
    fn add(&self, lhs: &F, rhs: &F) -> F {
        *lhs + *rhs
    }

    #[inline]
    fn sub(&self, lhs: &F, rhs: &F) -> F {
        *lhs - *rhs
    }

    #[inline]
    fn add_public(&self, lhs: &F, rhs: F) -> F {
        *lhs + rhs
    }

    #[inline]
    fn mul_public(&self, lhs: &F, rhs: F) -> F {
        *lhs * rhs
    }

    fn open_many(&self, shares: &[F]) -> Vec<F> {
        self.counter.record_opening(shares.len());
        shares.to_vec()
    }

    fn mul_many(&self, lhs: &[F], rhs: &[F]) -> Vec<F> {
        // Account for the masked openings a real multiplication would need.
        self.counter.record_opening(2 * lhs.len());
        self.counter.record_multiplications(lhs.len());
        lhs.iter().zip_eq(rhs).map(|(&x, &y)| x * y).collect()
    }
}

impl<F: PrimeField64> RandomSquares for Cleartext<F>
where
    StandardUniform: Distribution<F>,
{
    fn random_squares(&self, n: usize) -> Vec<(F, F)> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        (0..n)
            .map(|_| {
                let r: F = rng.random();
                (r, r.square())
            })
            .collect()
    }
}

impl<F: PrimeField64> InputSharing for Cleartext<F> {
    #[inline]
    fn share_secret(&self, value: F) -> F {
        value
    }
}
