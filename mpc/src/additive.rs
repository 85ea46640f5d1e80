use std::array;
use std::marker::PhantomData;
use std::sync::{Mutex, PoisonError};

use itertools::{Itertools, izip};
use p2mpc_field::{Field, PrimeField64};
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::{CommunicationCounter, CommunicationStats, InputSharing, MpcEngine, RandomSquares};

/// An additive sharing of a field element among `PARTIES` parties: the value is the sum of
/// the parts, and party `i` holds `parts[i]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdditiveShare<F, const PARTIES: usize> {
    parts: [F; PARTIES],
}

impl<F: Field, const PARTIES: usize> AdditiveShare<F, PARTIES> {
    pub const fn from_parts(parts: [F; PARTIES]) -> Self {
        Self { parts }
    }

    pub const fn parts(&self) -> &[F; PARTIES] {
        &self.parts
    }

    /// Recombine the parts. Only meaningful once every party has published its part.
    fn reconstruct(&self) -> F {
        self.parts.iter().copied().sum()
    }

    fn map_parts(&self, f: impl Fn(F) -> F) -> Self {
        Self {
            parts: self.parts.map(f),
        }
    }

    fn zip_parts(&self, other: &Self, f: impl Fn(F, F) -> F) -> Self {
        Self {
            parts: array::from_fn(|i| f(self.parts[i], other.parts[i])),
        }
    }
}

/// Every party of an additive secret-sharing scheme, simulated in one process.
///
/// Secure multiplication uses Beaver triples; triples and random squares come from a simulated
/// trusted dealer. Opening a share means every party broadcasting its part, which is one round.
#[derive(Debug)]
pub struct LocalAdditive<F, const PARTIES: usize> {
    dealer: Mutex<SmallRng>,
    counter: CommunicationCounter,
    _phantom: PhantomData<F>,
}

impl<F, const PARTIES: usize> LocalAdditive<F, PARTIES>
where
    F: PrimeField64,
    StandardUniform: Distribution<F>,
{
    pub fn new(seed: u64) -> Self {
        assert!(PARTIES > 0, "An additive sharing needs at least one party");
        Self {
            dealer: Mutex::new(SmallRng::seed_from_u64(seed)),
            counter: CommunicationCounter::default(),
            _phantom: PhantomData,
        }
    }

    pub fn stats(&self) -> CommunicationStats {
        self.counter.snapshot()
    }

    /// Split each value into fresh random parts using the given randomness.
    fn deal<R: Rng>(rng: &mut R, value: F) -> AdditiveShare<F, PARTIES> {
        let mut parts: [F; PARTIES] = array::from_fn(|_| rng.random());
        let others: F = parts[1..].iter().copied().sum();
        parts[0] = value - others;
        AdditiveShare { parts }
    }

    /// Dealer output: sharings of `(a, b, a * b)` for uniformly random `a, b`.
    fn beaver_triples(&self, n: usize) -> Vec<[AdditiveShare<F, PARTIES>; 3]> {
        let mut rng = self.dealer.lock().unwrap_or_else(PoisonError::into_inner);
        (0..n)
            .map(|_| {
                let a: F = rng.random();
                let b: F = rng.random();
                [
                    Self::deal(&mut *rng, a),
                    Self::deal(&mut *rng, b),
                    Self::deal(&mut *rng, a * b),
                ]
            })
            .collect()
    }
}

impl<F, const PARTIES: usize> MpcEngine for LocalAdditive<F, PARTIES>
where
    F: PrimeField64,
    StandardUniform: Distribution<F>,
{
    type F = F;
    type Share = AdditiveShare<F, PARTIES>;

    fn share_public(&self, value: F) -> Self::Share {
        // By convention party 0 holds public values.
        let mut parts = [F::ZERO; PARTIES];
        parts[0] = value;
        AdditiveShare { parts }
    }

    #[inline]
    fn add(&self, lhs: &Self::Share, rhs: &Self::Share) -> Self::Share {
        lhs.zip_parts(rhs, |x, y| x + y)
    }

    #[inline]
    fn sub(&self, lhs: &Self::Share, rhs: &Self::Share) -> Self::Share {
        lhs.zip_parts(rhs, |x, y| x - y)
    }

    #[inline]
    fn add_public(&self, lhs: &Self::Share, rhs: F) -> Self::Share {
        let mut out = *lhs;
        out.parts[0] += rhs;
        out
    }

    #[inline]
    fn mul_public(&self, lhs: &Self::Share, rhs: F) -> Self::Share {
        lhs.map_parts(|x| x * rhs)
    }

    fn open_many(&self, shares: &[Self::Share]) -> Vec<F> {
        self.counter.record_opening(shares.len());
        trace!(elements = shares.len(), "opening");
        shares.iter().map(AdditiveShare::reconstruct).collect()
    }

    fn mul_many(&self, lhs: &[Self::Share], rhs: &[Self::Share]) -> Vec<Self::Share> {
        assert_eq!(lhs.len(), rhs.len());
        let triples = self.beaver_triples(lhs.len());

        // Open d = x - a and e = y - b for the whole batch in one round.
        let masked: Vec<_> = izip!(lhs, rhs, &triples)
            .flat_map(|(x, y, [a, b, _])| [self.sub(x, a), self.sub(y, b)])
            .collect();
        let opened = self.open_many(&masked);
        self.counter.record_multiplications(lhs.len());

        // x * y = c + d * b + e * a + d * e.
        opened
            .chunks_exact(2)
            .zip_eq(&triples)
            .map(|(de, [a, b, c])| {
                let (d, e) = (de[0], de[1]);
                let db_plus_ea = self.add(&self.mul_public(b, d), &self.mul_public(a, e));
                self.add_public(&self.add(c, &db_plus_ea), d * e)
            })
            .collect()
    }
}

impl<F, const PARTIES: usize> RandomSquares for LocalAdditive<F, PARTIES>
where
    F: PrimeField64,
    StandardUniform: Distribution<F>,
{
    fn random_squares(&self, n: usize) -> Vec<(Self::Share, Self::Share)> {
        let mut rng = self.dealer.lock().unwrap_or_else(PoisonError::into_inner);
        (0..n)
            .map(|_| {
                let r: F = rng.random();
                (Self::deal(&mut *rng, r), Self::deal(&mut *rng, r.square()))
            })
            .collect()
    }
}

impl<F, const PARTIES: usize> InputSharing for LocalAdditive<F, PARTIES>
where
    F: PrimeField64,
    StandardUniform: Distribution<F>,
{
    fn share_secret(&self, value: F) -> Self::Share {
        let mut rng = self.dealer.lock().unwrap_or_else(PoisonError::into_inner);
        Self::deal(&mut *rng, value)
    }
}

#[cfg(test)]
mod tests {
    use p2mpc_field::{FieldParameters, Fp64};
    use rand_xoshiro::Xoroshiro128Plus;

    use super::*;
    use crate::Cleartext;

    #[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
    struct TestParameters;

    impl FieldParameters for TestParameters {
        const PRIME: u64 = 0x7f00_0001;
    }

    type F = Fp64<TestParameters>;
    type Engine = LocalAdditive<F, 3>;

    #[test]
    fn parts_look_random_but_reconstruct() {
        let engine = Engine::new(7);
        let x = F::new(123_456);
        let share = engine.share_secret(x);
        assert_ne!(share.parts()[1], F::ZERO);
        assert_eq!(engine.open(&share), x);
    }

    #[test]
    fn local_operations() {
        let engine = Engine::new(1);
        let mut rng = Xoroshiro128Plus::seed_from_u64(1);
        for _ in 0..50 {
            let x: F = rng.random();
            let y: F = rng.random();
            let c: F = rng.random();
            let [sx, sy] = engine.share_secrets([x, y]);

            assert_eq!(engine.open(&engine.add(&sx, &sy)), x + y);
            assert_eq!(engine.open(&engine.sub(&sx, &sy)), x - y);
            assert_eq!(engine.open(&engine.add_public(&sx, c)), x + c);
            assert_eq!(engine.open(&engine.mul_public(&sx, c)), x * c);
            assert_eq!(engine.open(&engine.neg(&sx)), -x);
            assert_eq!(engine.open(&engine.share_public(c)), c);
            assert_eq!(
                engine.open(&engine.dot_public(&[c, F::TWO], &[sx, sy])),
                c * x + y.double()
            );
        }
    }

    #[test]
    fn beaver_multiplication_is_one_round() {
        let engine = Engine::new(2);
        let mut rng = Xoroshiro128Plus::seed_from_u64(2);
        let xs: Vec<F> = (0..10).map(|_| rng.random()).collect();
        let ys: Vec<F> = (0..10).map(|_| rng.random()).collect();
        let sx: Vec<_> = xs.iter().map(|&x| engine.share_secret(x)).collect();
        let sy: Vec<_> = ys.iter().map(|&y| engine.share_secret(y)).collect();

        let before = engine.stats();
        let products = engine.mul_many(&sx, &sy);
        let cost = engine.stats().since(&before);
        assert_eq!(cost.rounds, 1);
        assert_eq!(cost.opened_elements, 20);
        assert_eq!(cost.multiplications, 10);

        let opened = engine.open_many(&products);
        for ((x, y), z) in xs.iter().zip(&ys).zip(opened) {
            assert_eq!(*x * *y, z);
        }
    }

    #[test]
    fn random_squares_are_consistent() {
        let engine = Engine::new(3);
        for (r, r2) in engine.random_squares(20) {
            let r = engine.open(&r);
            assert_eq!(engine.open(&r2), r.square());
        }
    }

    #[test]
    fn cleartext_matches_additive() {
        let clear = Cleartext::<F>::new(0);
        let additive = Engine::new(0);
        let x = F::new(99);
        let y = F::new(1_000_003);
        let clear_product = clear.mul(&x, &y);
        let [sx, sy] = additive.share_secrets([x, y]);
        assert_eq!(additive.open(&additive.mul(&sx, &sy)), clear_product);
        assert_eq!(clear.open(&clear_product), x * y);
        assert_eq!(clear.stats().rounds, 2);
    }
}
