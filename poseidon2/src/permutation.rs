use std::array;
use std::slice;
use std::sync::Arc;

use itertools::Itertools;
use p2mpc_mpc::{MpcEngine, RandomSquares};
use tracing::instrument;

use crate::{CubePreprocessing, Poseidon2Params, external_linear_layer, internal_linear_layer};

/// The Poseidon2 permutation evaluated on a secret-shared state.
///
/// The round schedule is:
/// - the external linear layer on the input,
/// - `rounds_f / 2` full rounds (constants on every lane, S-box on every lane, external layer),
/// - `rounds_p` partial rounds (constant and S-box on lane 0 only, internal layer),
/// - `rounds_f / 2` more full rounds.
///
/// Linear layers and round constants are local. Each S-box layer is one batched call into the
/// cube gadget, so with `alpha = 3` a permutation costs `rounds_f + rounds_p` rounds online.
#[derive(Debug)]
pub struct Poseidon2Mpc<'a, E: MpcEngine, const WIDTH: usize> {
    engine: &'a E,
    params: Arc<Poseidon2Params<E::F>>,
}

impl<E: MpcEngine, const WIDTH: usize> Clone for Poseidon2Mpc<'_, E, WIDTH> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine,
            params: self.params.clone(),
        }
    }
}

impl<'a, E: RandomSquares, const WIDTH: usize> Poseidon2Mpc<'a, E, WIDTH> {
    /// # Panics
    /// Panics if the parameters were built for a width other than `WIDTH`.
    pub fn new(engine: &'a E, params: Arc<Poseidon2Params<E::F>>) -> Self {
        assert_eq!(
            params.width(),
            WIDTH,
            "Parameters for width {} used with a state of width {WIDTH}",
            params.width()
        );
        Self { engine, params }
    }

    pub const fn engine(&self) -> &'a E {
        self.engine
    }

    pub fn params(&self) -> &Poseidon2Params<E::F> {
        &self.params
    }

    /// Number of cube triples one permutation consumes.
    pub fn sbox_count(&self) -> usize {
        self.params.sbox_count()
    }

    /// Generate the correlated randomness for `permutations` evaluations in one batch.
    #[instrument(level = "debug", skip(self))]
    pub fn preprocess(&self, permutations: usize) -> CubePreprocessing<E::Share> {
        CubePreprocessing::generate(self.engine, permutations * self.sbox_count())
    }

    /// The online phase: run the permutation using previously generated randomness.
    ///
    /// # Panics
    /// Panics if `preprocessing` holds fewer than [`Self::sbox_count`] unused triples.
    pub fn permute_with(
        &self,
        mut state: [E::Share; WIDTH],
        preprocessing: &mut CubePreprocessing<E::Share>,
    ) -> [E::Share; WIDTH] {
        let params = &*self.params;
        let half_f = params.half_full_rounds();
        let (initial, rest) = params.round_constants().split_at(half_f);
        let (partial, terminal) = rest.split_at(params.rounds_p());

        external_linear_layer(self.engine, params.external_matrix(), &mut state);

        for constants in initial {
            self.full_round(&mut state, constants, preprocessing);
        }
        for constants in partial {
            self.partial_round(&mut state, constants, preprocessing);
        }
        for constants in terminal {
            self.full_round(&mut state, constants, preprocessing);
        }

        state
    }

    pub fn permute(&self, state: [E::Share; WIDTH]) -> [E::Share; WIDTH] {
        let mut preprocessing = self.preprocess(1);
        self.permute_with(state, &mut preprocessing)
    }

    pub fn permute_mut(&self, state: &mut [E::Share; WIDTH]) {
        *state = self.permute(state.clone());
    }

    /// # Panics
    /// Panics if `input.len() != WIDTH`.
    pub fn permute_slice(&self, input: &[E::Share]) -> [E::Share; WIDTH] {
        assert_eq!(
            input.len(),
            WIDTH,
            "Expected a state of {WIDTH} shares, got {}",
            input.len()
        );
        self.permute(array::from_fn(|i| input[i].clone()))
    }

    fn full_round(
        &self,
        state: &mut [E::Share; WIDTH],
        constants: &[E::F],
        preprocessing: &mut CubePreprocessing<E::Share>,
    ) {
        for (lane, &c) in state.iter_mut().zip_eq(constants) {
            *lane = self.engine.add_public(lane, c);
        }
        let output = self.params.sbox().apply(self.engine, state, preprocessing);
        for (lane, y) in state.iter_mut().zip_eq(output) {
            *lane = y;
        }
        external_linear_layer(self.engine, self.params.external_matrix(), state);
    }

    fn partial_round(
        &self,
        state: &mut [E::Share; WIDTH],
        constants: &[E::F],
        preprocessing: &mut CubePreprocessing<E::Share>,
    ) {
        let lane = self.engine.add_public(&state[0], constants[0]);
        let sbox = self.params.sbox();
        let mut output = sbox.apply(self.engine, slice::from_ref(&lane), preprocessing);
        state[0] = output.swap_remove(0);
        internal_linear_layer(self.engine, self.params.internal_diag(), state);
    }
}

#[cfg(test)]
mod tests {
    use p2mpc_field::{Field, FieldParameters, Fp64, PrimeField64, matrix_vector_product};
    use p2mpc_mpc::{Cleartext, InputSharing, LocalAdditive};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
    struct KoalaBearParameters;

    impl FieldParameters for KoalaBearParameters {
        const PRIME: u64 = 0x7f00_0001;
    }

    #[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
    struct BabyBearParameters;

    impl FieldParameters for BabyBearParameters {
        const PRIME: u64 = 0x7800_0001;
    }

    type F = Fp64<KoalaBearParameters>;

    /// A direct evaluation of the permutation on public values.
    fn plain_permutation<F: PrimeField64, const WIDTH: usize>(
        params: &Poseidon2Params<F>,
        input: [F; WIDTH],
    ) -> [F; WIDTH] {
        let external = |state: &[F]| matrix_vector_product(params.external_matrix(), state);
        let sbox = |x: F| x.exp_u64(params.alpha());

        let half_f = params.half_full_rounds();
        let mut state = external(&input[..]);
        for (round, constants) in params.round_constants().iter().enumerate() {
            if (half_f..half_f + params.rounds_p()).contains(&round) {
                state[0] = sbox(state[0] + constants[0]);
                let sum: F = state.iter().copied().sum();
                for (lane, &d) in state.iter_mut().zip(params.internal_diag()) {
                    *lane = sum + *lane * d;
                }
            } else {
                let added: Vec<F> = state
                    .iter()
                    .zip(constants)
                    .map(|(&x, &c)| sbox(x + c))
                    .collect();
                state = external(&added[..]);
            }
        }
        array::from_fn(|i| state[i])
    }

    fn random_params<F: PrimeField64>(width: usize, seed: u64) -> Arc<Poseidon2Params<F>>
    where
        rand::distr::StandardUniform: rand::distr::Distribution<F>,
    {
        Arc::new(Poseidon2Params::new_from_rng(width, &mut SmallRng::seed_from_u64(seed)).unwrap())
    }

    #[test]
    fn cleartext_matches_plain_evaluation() {
        let engine = Cleartext::<F>::new(0);
        let params = random_params::<F>(16, 1);
        let poseidon2 = Poseidon2Mpc::<_, 16>::new(&engine, params.clone());

        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..5 {
            let input: [F; 16] = rng.random();
            assert_eq!(poseidon2.permute(input), plain_permutation(&params, input));
        }
    }

    #[test]
    fn additive_matches_plain_evaluation() {
        let engine = LocalAdditive::<F, 3>::new(9);
        let params = random_params::<F>(8, 3);
        let poseidon2 = Poseidon2Mpc::<_, 8>::new(&engine, params.clone());

        let input: [F; 8] = SmallRng::seed_from_u64(4).random();
        let output = poseidon2.permute(engine.share_secrets(input));
        assert_eq!(
            engine.open_many(&output),
            plain_permutation(&params, input).to_vec()
        );
    }

    #[test]
    fn septic_sbox_permutation() {
        type G = Fp64<BabyBearParameters>;
        let engine = LocalAdditive::<G, 2>::new(5);
        let params = random_params::<G>(16, 6);
        assert_eq!(params.alpha(), 7);
        let poseidon2 = Poseidon2Mpc::<_, 16>::new(&engine, params.clone());

        let input = G::new_array([7; 16]);
        let output = poseidon2.permute(engine.share_secrets(input));
        assert_eq!(
            engine.open_many(&output),
            plain_permutation(&params, input).to_vec()
        );
    }

    #[test]
    fn online_rounds() {
        let engine = LocalAdditive::<F, 3>::new(0);
        let params = random_params::<F>(16, 7);
        let poseidon2 = Poseidon2Mpc::<_, 16>::new(&engine, params.clone());
        let state = engine.share_secrets([F::ONE; 16]);

        let mut preprocessing = poseidon2.preprocess(1);
        assert_eq!(preprocessing.len(), 16 * 8 + 20);

        let before = engine.stats();
        poseidon2.permute_with(state, &mut preprocessing);
        let online = engine.stats().since(&before);
        assert_eq!(online.rounds, params.rounds_f() + params.rounds_p());
        assert_eq!(online.opened_elements, poseidon2.sbox_count());
        assert_eq!(online.multiplications, 0);
        assert!(preprocessing.is_consumed());
    }

    #[test]
    fn result_does_not_depend_on_masks() {
        let params = random_params::<F>(4, 8);
        let input = F::new_array([1, 2, 3, 4]);
        let outputs: Vec<_> = (0..4)
            .map(|seed| {
                let engine = LocalAdditive::<F, 3>::new(seed);
                let poseidon2 = Poseidon2Mpc::<_, 4>::new(&engine, params.clone());
                engine.open_many(&poseidon2.permute(engine.share_secrets(input)))
            })
            .collect();
        assert!(outputs.iter().all_equal());
    }

    #[test]
    fn permute_mut_and_slice_agree() {
        let engine = Cleartext::<F>::new(0);
        let poseidon2 = Poseidon2Mpc::<_, 8>::new(&engine, random_params::<F>(8, 10));
        let input = F::new_array([5; 8]);
        let mut state = input;
        poseidon2.permute_mut(&mut state);
        assert_eq!(state, poseidon2.permute_slice(&input));
        assert_ne!(state, input);
    }

    #[test]
    #[should_panic]
    fn permute_slice_rejects_wrong_length() {
        let engine = Cleartext::<F>::new(0);
        let poseidon2 = Poseidon2Mpc::<_, 8>::new(&engine, random_params::<F>(8, 10));
        poseidon2.permute_slice(&[F::ZERO; 7]);
    }

    #[test]
    #[should_panic]
    fn width_mismatch_panics() {
        let engine = Cleartext::<F>::new(0);
        let _ = Poseidon2Mpc::<_, 16>::new(&engine, random_params::<F>(8, 10));
    }
}
