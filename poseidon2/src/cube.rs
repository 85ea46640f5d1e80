//! Evaluating `x -> x^3` on shares in a single round.
//!
//! Given a sharing of a uniformly random `r` together with sharings of `r^2` and `r^3`, the
//! parties open `m = x - r`. Since `m` is uniform and independent of `x` it reveals nothing,
//! and the cube follows from the binomial expansion
//!
//! `x^3 = (m + r)^3 = r^3 + 3 m r^2 + 3 m^2 r + m^3`
//!
//! in which every term is either a public constant or a public scalar times a share.
//! The triples `(r, r^2, r^3)` do not depend on `x`, so they are produced ahead of time: the
//! pairs `(r, r^2)` come from the backend and `r^3 = r * r^2` costs one batched secure
//! multiplication for the whole preprocessing call.

use itertools::izip;
use p2mpc_field::Field;
use p2mpc_mpc::{MpcEngine, RandomSquares};

/// Correlated randomness for the cube gadget, consumed front to back.
#[derive(Clone, Debug)]
pub struct CubePreprocessing<S> {
    r: Vec<S>,
    r2: Vec<S>,
    r3: Vec<S>,
    offset: usize,
}

impl<S> CubePreprocessing<S> {
    /// Generate `n` triples `(r, r^2, r^3)` using one batched multiplication.
    pub fn generate<E>(engine: &E, n: usize) -> Self
    where
        E: RandomSquares<Share = S>,
    {
        if n == 0 {
            return Self::empty();
        }
        let (r, r2): (Vec<_>, Vec<_>) = engine.random_squares(n).into_iter().unzip();
        let r3 = engine.mul_many(&r, &r2);
        Self {
            r,
            r2,
            r3,
            offset: 0,
        }
    }

    pub const fn empty() -> Self {
        Self {
            r: Vec::new(),
            r2: Vec::new(),
            r3: Vec::new(),
            offset: 0,
        }
    }

    /// Total number of triples generated.
    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    /// Number of triples not yet consumed.
    pub fn remaining(&self) -> usize {
        self.len() - self.offset
    }

    pub fn is_consumed(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `n` triples.
    ///
    /// # Panics
    /// Panics if fewer than `n` triples remain. Reusing a triple would leak the input.
    fn next_batch(&mut self, n: usize) -> (&[S], &[S], &[S]) {
        assert!(
            n <= self.remaining(),
            "Cube preprocessing exhausted: {n} triples requested, {} remaining",
            self.remaining()
        );
        let range = self.offset..self.offset + n;
        self.offset += n;
        (
            &self.r[range.clone()],
            &self.r2[range.clone()],
            &self.r3[range],
        )
    }
}

/// Cube every share in `xs` with a single opening.
pub fn cube_many<E: MpcEngine>(
    engine: &E,
    xs: &[E::Share],
    preprocessing: &mut CubePreprocessing<E::Share>,
) -> Vec<E::Share> {
    if xs.is_empty() {
        return Vec::new();
    }
    let (r, r2, r3) = preprocessing.next_batch(xs.len());

    let masked: Vec<_> = xs.iter().zip(r).map(|(x, r)| engine.sub(x, r)).collect();
    let opened = engine.open_many(&masked);

    let three = E::F::from_u64(3);
    izip!(opened, r, r2, r3)
        .map(|(m, r, r2, r3)| {
            let three_m = three * m;
            let linear = engine.add(
                &engine.mul_public(r2, three_m),
                &engine.mul_public(r, three_m * m),
            );
            engine.add_public(&engine.add(&linear, r3), m.cube())
        })
        .collect()
}
