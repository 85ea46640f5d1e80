use std::array;

use p2mpc_mpc::RandomSquares;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::instrument;

use crate::{CubePreprocessing, Poseidon2Mpc};

/// A compression function built from the permutation with a feed-forward:
/// `compress(x) = permute(x) + x`, lane by lane.
#[derive(Debug)]
pub struct FeedForwardCompression<'a, E: RandomSquares, const WIDTH: usize> {
    permutation: Poseidon2Mpc<'a, E, WIDTH>,
}

impl<E: RandomSquares, const WIDTH: usize> Clone for FeedForwardCompression<'_, E, WIDTH> {
    fn clone(&self) -> Self {
        Self {
            permutation: self.permutation.clone(),
        }
    }
}

impl<'a, E: RandomSquares, const WIDTH: usize> FeedForwardCompression<'a, E, WIDTH> {
    pub const fn new(permutation: Poseidon2Mpc<'a, E, WIDTH>) -> Self {
        Self { permutation }
    }

    pub const fn permutation(&self) -> &Poseidon2Mpc<'a, E, WIDTH> {
        &self.permutation
    }

    pub fn compress_with(
        &self,
        input: &[E::Share; WIDTH],
        preprocessing: &mut CubePreprocessing<E::Share>,
    ) -> [E::Share; WIDTH] {
        let engine = self.permutation.engine();
        let output = self.permutation.permute_with(input.clone(), preprocessing);
        array::from_fn(|i| engine.add(&output[i], &input[i]))
    }

    pub fn compress(&self, input: &[E::Share; WIDTH]) -> [E::Share; WIDTH] {
        let mut preprocessing = self.permutation.preprocess(1);
        self.compress_with(input, &mut preprocessing)
    }

    /// Apply the compression `length` times in sequence. The preprocessing for the whole chain
    /// is generated up front in one batch.
    #[instrument(level = "debug", skip(self, input))]
    pub fn hash_chain(&self, input: [E::Share; WIDTH], length: usize) -> [E::Share; WIDTH] {
        if length == 0 {
            return input;
        }
        let mut preprocessing = self.permutation.preprocess(length);
        (0..length).fold(input, |state, _| {
            self.compress_with(&state, &mut preprocessing)
        })
    }

    /// Hash chains of `length` steps from each of the first `count` inputs.
    ///
    /// The chains are independent. With the `parallel` feature they run on the rayon pool.
    ///
    /// # Panics
    /// Panics if `count > inputs.len()`.
    #[instrument(level = "debug", skip(self, inputs))]
    pub fn ots(
        &self,
        inputs: &[[E::Share; WIDTH]],
        length: usize,
        count: usize,
    ) -> Vec<[E::Share; WIDTH]> {
        assert!(
            count <= inputs.len(),
            "Requested {count} chains from {} inputs",
            inputs.len()
        );
        let inputs = &inputs[..count];

        #[cfg(feature = "parallel")]
        let chains = inputs.par_iter();
        #[cfg(not(feature = "parallel"))]
        let chains = inputs.iter();

        chains
            .map(|input| self.hash_chain(input.clone(), length))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use itertools::Itertools;
    use p2mpc_field::{Field, FieldParameters, Fp64};
    use p2mpc_mpc::{Cleartext, InputSharing, LocalAdditive, MpcEngine};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::Poseidon2Params;

    #[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
    struct KoalaBearParameters;

    impl FieldParameters for KoalaBearParameters {
        const PRIME: u64 = 0x7f00_0001;
    }

    type F = Fp64<KoalaBearParameters>;

    fn params(width: usize) -> Arc<Poseidon2Params<F>> {
        Arc::new(Poseidon2Params::new_from_rng(width, &mut SmallRng::seed_from_u64(1)).unwrap())
    }

    #[test]
    fn compress_is_feed_forward() {
        let engine = Cleartext::<F>::new(0);
        let permutation = Poseidon2Mpc::<_, 8>::new(&engine, params(8));
        let compression = FeedForwardCompression::new(permutation.clone());

        let input = F::new_array([1, 2, 3, 4, 5, 6, 7, 8]);
        let permuted = permutation.permute(input);
        let expected: [F; 8] = array::from_fn(|i| permuted[i] + input[i]);
        assert_eq!(compression.compress(&input), expected);
    }

    #[test]
    fn hash_chain_is_repeated_compression() {
        let engine = Cleartext::<F>::new(0);
        let compression =
            FeedForwardCompression::new(Poseidon2Mpc::<_, 8>::new(&engine, params(8)));

        let input = F::new_array([9; 8]);
        let mut expected = input;
        for _ in 0..4 {
            expected = compression.compress(&expected);
        }
        assert_eq!(compression.hash_chain(input, 4), expected);
        assert_eq!(compression.hash_chain(input, 0), input);
    }

    #[test]
    fn hash_chain_preprocesses_once() {
        let engine = LocalAdditive::<F, 3>::new(1);
        let compression =
            FeedForwardCompression::new(Poseidon2Mpc::<_, 8>::new(&engine, params(8)));
        let input = engine.share_secrets([F::ONE; 8]);

        let before = engine.stats();
        compression.hash_chain(input, 3);
        let cost = engine.stats().since(&before);
        let per_permutation = compression.permutation().params().rounds_f()
            + compression.permutation().params().rounds_p();
        assert_eq!(cost.rounds, 1 + 3 * per_permutation);
    }

    #[test]
    fn ots_chains_are_independent() {
        let engine = LocalAdditive::<F, 3>::new(2);
        let compression =
            FeedForwardCompression::new(Poseidon2Mpc::<_, 4>::new(&engine, params(4)));

        let mut inputs: Vec<[F; 4]> = (0..5u64)
            .map(|i| F::new_array([i, i + 1, i + 2, i + 3]))
            .collect();
        let shared: Vec<_> = inputs.iter().map(|&x| engine.share_secrets(x)).collect();
        let open = |chains: Vec<[_; 4]>| {
            chains
                .iter()
                .map(|chain| engine.open_many(chain))
                .collect_vec()
        };

        let outputs = open(compression.ots(&shared, 2, 4));
        assert_eq!(outputs.len(), 4);
        assert!(outputs.iter().tuple_combinations().all(|(a, b)| a != b));

        inputs[2][1] = F::from_u64(1000);
        let shared: Vec<_> = inputs.iter().map(|&x| engine.share_secrets(x)).collect();
        let changed = open(compression.ots(&shared, 2, 4));
        for (i, (before, after)) in outputs.iter().zip(&changed).enumerate() {
            assert_eq!(before == after, i != 2, "chain {i}");
        }
    }

    #[test]
    fn ots_with_zero_count() {
        let engine = Cleartext::<F>::new(0);
        let compression =
            FeedForwardCompression::new(Poseidon2Mpc::<_, 4>::new(&engine, params(4)));
        assert!(compression.ots(&[[F::ONE; 4]], 5, 0).is_empty());
    }

    #[test]
    #[should_panic]
    fn ots_with_too_few_inputs() {
        let engine = Cleartext::<F>::new(0);
        let compression =
            FeedForwardCompression::new(Poseidon2Mpc::<_, 4>::new(&engine, params(4)));
        compression.ots(&[[F::ONE; 4]], 1, 2);
    }
}
