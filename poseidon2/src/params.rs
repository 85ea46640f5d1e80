use gcd::Gcd;
use p2mpc_field::PrimeField64;
use rand::Rng;
use rand::distr::{Distribution, StandardUniform};

use crate::{ParamsError, Sbox, external_matrix, poseidon2_round_numbers_128, resolve_alpha};

/// A complete, validated Poseidon2 instance over the field `F`.
///
/// Immutable once built. The permutation shares it through an `Arc`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poseidon2Params<F> {
    width: usize,
    alpha: u64,
    sbox: Sbox,
    rounds_f: usize,
    rounds_p: usize,
    external_matrix: Vec<Vec<F>>,
    internal_diag: Vec<F>,
    /// One row per round: `rounds_f / 2` full rounds, `rounds_p` partial rounds, then the
    /// remaining full rounds. Partial-round rows are zero outside lane 0.
    round_constants: Vec<Vec<F>>,
}

impl<F: PrimeField64> Poseidon2Params<F> {
    /// Build parameters whose exponent and round numbers are derived from the field and width:
    /// the smallest valid `alpha`, and rounds giving 128 bits of security with a margin.
    pub fn new(
        width: usize,
        external_matrix: Vec<Vec<F>>,
        internal_diag: Vec<F>,
        round_constants: Vec<Vec<F>>,
    ) -> Result<Self, ParamsError> {
        if width < 2 {
            return Err(ParamsError::WidthTooSmall(width));
        }
        let alpha = resolve_alpha(F::ORDER_U64)?;
        let (rounds_f, rounds_p) = poseidon2_round_numbers_128::<F>(width, alpha)?;
        Self::from_rounds(
            width,
            alpha,
            rounds_f,
            rounds_p,
            external_matrix,
            internal_diag,
            round_constants,
        )
    }

    /// Build parameters with explicitly chosen exponent and round numbers.
    pub fn from_rounds(
        width: usize,
        alpha: u64,
        rounds_f: usize,
        rounds_p: usize,
        external_matrix: Vec<Vec<F>>,
        internal_diag: Vec<F>,
        round_constants: Vec<Vec<F>>,
    ) -> Result<Self, ParamsError> {
        if width < 2 {
            return Err(ParamsError::WidthTooSmall(width));
        }
        if alpha.gcd(F::ORDER_U64 - 1) != 1 {
            return Err(ParamsError::ExponentNotInvertible { alpha });
        }
        let sbox = Sbox::from_alpha(alpha)?;
        if rounds_f < 4 || rounds_f % 2 != 0 {
            return Err(ParamsError::InvalidFullRounds(rounds_f));
        }
        if external_matrix.len() != width || external_matrix.iter().any(|row| row.len() != width) {
            return Err(ParamsError::ExternalMatrixShape { width });
        }
        if internal_diag.len() != width {
            return Err(ParamsError::InternalDiagLength {
                expected: width,
                found: internal_diag.len(),
            });
        }
        let rounds = total_rounds(rounds_f, rounds_p)?;
        if round_constants.len() != rounds {
            return Err(ParamsError::RoundConstantRows {
                expected: rounds,
                found: round_constants.len(),
            });
        }
        if let Some((row, constants)) = round_constants
            .iter()
            .enumerate()
            .find(|(_, constants)| constants.len() != width)
        {
            return Err(ParamsError::RoundConstantWidth {
                row,
                expected: width,
                found: constants.len(),
            });
        }
        let half_f = rounds_f / 2;
        for (round, constants) in round_constants[half_f..half_f + rounds_p].iter().enumerate() {
            if let Some(lane) = constants.iter().skip(1).position(|c| !c.is_zero()) {
                return Err(ParamsError::NonZeroPartialConstant {
                    round,
                    lane: lane + 1,
                });
            }
        }

        Ok(Self {
            width,
            alpha,
            sbox,
            rounds_f,
            rounds_p,
            external_matrix,
            internal_diag,
            round_constants,
        })
    }

    /// Create a new Poseidon2 configuration with 128 bit security, the default external matrix
    /// and random internal diagonal and round constants.
    pub fn new_from_rng<R: Rng>(width: usize, rng: &mut R) -> Result<Self, ParamsError>
    where
        StandardUniform: Distribution<F>,
    {
        if width < 2 {
            return Err(ParamsError::WidthTooSmall(width));
        }
        let alpha = resolve_alpha(F::ORDER_U64)?;
        let (rounds_f, rounds_p) = poseidon2_round_numbers_128::<F>(width, alpha)?;
        Self::new_from_rng_with_rounds(width, alpha, rounds_f, rounds_p, rng)
    }

    /// Create a new Poseidon2 configuration with the given round numbers and random constants.
    pub fn new_from_rng_with_rounds<R: Rng>(
        width: usize,
        alpha: u64,
        rounds_f: usize,
        rounds_p: usize,
        rng: &mut R,
    ) -> Result<Self, ParamsError>
    where
        StandardUniform: Distribution<F>,
    {
        let rounds = total_rounds(rounds_f, rounds_p)?;
        let external_matrix = external_matrix(width)?;
        let internal_diag = (0..width).map(|_| random_nonzero(rng)).collect();

        let half_f = rounds_f / 2;
        let round_constants = (0..rounds)
            .map(|round| {
                let partial = (half_f..half_f + rounds_p).contains(&round);
                (0..width)
                    .map(|lane| {
                        if partial && lane > 0 {
                            F::ZERO
                        } else {
                            rng.random()
                        }
                    })
                    .collect()
            })
            .collect();

        Self::from_rounds(
            width,
            alpha,
            rounds_f,
            rounds_p,
            external_matrix,
            internal_diag,
            round_constants,
        )
    }

    pub fn prime(&self) -> u64 {
        F::ORDER_U64
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn alpha(&self) -> u64 {
        self.alpha
    }

    pub const fn sbox(&self) -> Sbox {
        self.sbox
    }

    pub const fn rounds_f(&self) -> usize {
        self.rounds_f
    }

    pub const fn rounds_p(&self) -> usize {
        self.rounds_p
    }

    pub const fn half_full_rounds(&self) -> usize {
        self.rounds_f / 2
    }

    pub fn external_matrix(&self) -> &[Vec<F>] {
        &self.external_matrix
    }

    pub fn internal_diag(&self) -> &[F] {
        &self.internal_diag
    }

    pub fn round_constants(&self) -> &[Vec<F>] {
        &self.round_constants
    }

    /// Number of S-box evaluations in one permutation.
    pub const fn sbox_count(&self) -> usize {
        self.width * self.rounds_f + self.rounds_p
    }
}

fn total_rounds(rounds_f: usize, rounds_p: usize) -> Result<usize, ParamsError> {
    rounds_f
        .checked_add(rounds_p)
        .ok_or(ParamsError::RoundCountOverflow { rounds_f, rounds_p })
}

fn random_nonzero<F: PrimeField64, R: Rng>(rng: &mut R) -> F
where
    StandardUniform: Distribution<F>,
{
    loop {
        let value: F = rng.random();
        if !value.is_zero() {
            return value;
        }
    }
}
