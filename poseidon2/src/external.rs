use std::array;

use p2mpc_field::Field;
use p2mpc_mpc::MpcEngine;

use crate::ParamsError;

/// The 4x4 MDS matrix used by the Horizon Labs implementation of Poseidon2:
/// [ 5 7 1 3 ]
/// [ 4 6 1 1 ]
/// [ 1 3 5 7 ]
/// [ 1 1 4 6 ].
/// This is the matrix from the start of Appendix B in the Poseidon2 paper.
const HL_MAT4: [[u64; 4]; 4] = [[5, 7, 1, 3], [4, 6, 1, 1], [1, 3, 5, 7], [1, 1, 4, 6]];

/// The dense matrix used by the external layer for a given width.
///
/// For widths 2 and 3 this is `J + I` (the all-ones matrix plus the identity). For widths which
/// are a multiple of 4, up to 24, it is the `4N x 4N` block matrix
/// `[[2M M  ... M], [M  2M ... M], ..., [M  M ... 2M]]` with `M` the 4x4 matrix above.
pub fn external_matrix<F: Field>(width: usize) -> Result<Vec<Vec<F>>, ParamsError> {
    match width {
        2 | 3 => Ok((0..width)
            .map(|i| {
                (0..width)
                    .map(|j| if i == j { F::TWO } else { F::ONE })
                    .collect()
            })
            .collect()),
        4 | 8 | 12 | 16 | 20 | 24 => Ok((0..width)
            .map(|i| {
                (0..width)
                    .map(|j| {
                        let entry = F::from_u64(HL_MAT4[i % 4][j % 4]);
                        if i / 4 == j / 4 {
                            entry.double()
                        } else {
                            entry
                        }
                    })
                    .collect()
            })
            .collect()),
        _ => Err(ParamsError::NoDefaultExternalMatrix { width }),
    }
}

/// Multiply the state by the dense external matrix. Purely local.
pub fn external_linear_layer<E: MpcEngine, const WIDTH: usize>(
    engine: &E,
    matrix: &[Vec<E::F>],
    state: &mut [E::Share; WIDTH],
) {
    let output: [E::Share; WIDTH] = array::from_fn(|i| engine.dot_public(&matrix[i], state));
    *state = output;
}
