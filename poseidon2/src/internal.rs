//! Inside the Poseidon2 paper, they describe that the internal layers of the hash
//! function do not require the full properties of MDS matrices.
//!
//! > For the partial rounds, the MDS property is not required anymore, and
//! > we can set up the matrix MI focusing only on providing full diffusion, breaking
//! > arbitrarily long subspace trails, and ensuring that the polynomial representation
//! > of the scheme is dense. (Section 5.2)
//!
//! The internal matrix is therefore `J + diag(v)` with `J` the all-ones matrix, which costs a
//! single lane sum plus one scalar multiplication per lane.

use itertools::Itertools;
use p2mpc_mpc::MpcEngine;

/// Given a vector v compute the matrix vector product `(J + diag(v)) state`. Purely local.
pub fn internal_linear_layer<E: MpcEngine, const WIDTH: usize>(
    engine: &E,
    diag: &[E::F],
    state: &mut [E::Share; WIDTH],
) {
    let sum = engine.sum(state.iter());
    for (lane, &d) in state.iter_mut().zip_eq(diag) {
        *lane = engine.add(&sum, &engine.mul_public(lane, d));
    }
}

#[cfg(test)]
mod tests {
    use p2mpc_field::{Field, FieldParameters, Fp64, matrix_vector_product};
    use p2mpc_mpc::{Cleartext, InputSharing, LocalAdditive};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoroshiro128Plus;

    use super::*;

    #[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
    struct F101Parameters;

    impl FieldParameters for F101Parameters {
        const PRIME: u64 = 101;
    }

    type F = Fp64<F101Parameters>;

    fn dense_internal_matrix(diag: &[F]) -> Vec<Vec<F>> {
        (0..diag.len())
            .map(|i| {
                (0..diag.len())
                    .map(|j| if i == j { F::ONE + diag[i] } else { F::ONE })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn matches_dense_matrix() {
        let engine = Cleartext::<F>::new(0);
        let mut rng = Xoroshiro128Plus::seed_from_u64(1);
        for _ in 0..20 {
            let diag: [F; 8] = rng.random();
            let mut state: [F; 8] = rng.random();
            let expected = matrix_vector_product(&dense_internal_matrix(&diag), &state);
            internal_linear_layer(&engine, &diag, &mut state);
            assert_eq!(state.to_vec(), expected);
        }
        assert_eq!(engine.stats().rounds, 0);
    }

    #[test]
    fn works_on_additive_shares() {
        let engine = LocalAdditive::<F, 4>::new(2);
        let diag = F::new_array([3, 100, 7]);
        let inputs = F::new_array([1, 2, 3]);
        let mut state = engine.share_secrets(inputs);
        internal_linear_layer(&engine, &diag, &mut state);
        // sum = 6: [6 + 3, 6 + 200, 6 + 21] mod 101.
        assert_eq!(engine.open_many(&state), F::new_array([9, 4, 27]).to_vec());
    }
}
