use std::io;

use thiserror::Error;

/// Failures of the round-number search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundNumberError {
    #[error("no exponent alpha >= 3 is coprime to p - 1 for p = {prime}")]
    NoValidExponent { prime: u64 },
    #[error("width {width} is too small, Poseidon2 needs at least 2 lanes")]
    UnsupportedWidth { width: usize },
    #[error(
        "no round numbers reach {security_bits}-bit security for p = {prime}, width {width}, alpha {alpha}"
    )]
    NoSatisfyingRounds {
        prime: u64,
        width: usize,
        alpha: u64,
        security_bits: usize,
    },
}

/// Reasons a set of Poseidon2 parameters is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error(transparent)]
    Rounds(#[from] RoundNumberError),
    #[error("width {0} is too small, Poseidon2 needs at least 2 lanes")]
    WidthTooSmall(usize),
    #[error("x -> x^{alpha} is not a permutation of the field")]
    ExponentNotInvertible { alpha: u64 },
    #[error("no secure evaluation of the S-box x -> x^{alpha} is available")]
    UnsupportedSbox { alpha: u64 },
    #[error("the number of full rounds must be even and at least 4, got {0}")]
    InvalidFullRounds(usize),
    #[error("the external matrix must be {width} x {width}")]
    ExternalMatrixShape { width: usize },
    #[error("the internal diagonal must have {expected} entries, found {found}")]
    InternalDiagLength { expected: usize, found: usize },
    #[error("{rounds_f} full rounds and {rounds_p} partial rounds overflow the round count")]
    RoundCountOverflow { rounds_f: usize, rounds_p: usize },
    #[error("expected {expected} rows of round constants, found {found}")]
    RoundConstantRows { expected: usize, found: usize },
    #[error("round constant row {row} has {found} entries, expected {expected}")]
    RoundConstantWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("partial round {round} has a non-zero constant in lane {lane}")]
    NonZeroPartialConstant { round: usize, lane: usize },
    #[error("parameters are for p = {found}, but the field has p = {expected}")]
    PrimeMismatch { expected: u64, found: u64 },
    #[error("{value} is not a canonical field element")]
    NonCanonicalElement { value: u64 },
    #[error("no default external matrix is defined for width {width}")]
    NoDefaultExternalMatrix { width: usize },
}

/// Errors raised while loading or storing a parameter file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access parameter file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed parameter file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Rounds(#[from] RoundNumberError),
    #[error("rounds_f and rounds_p must either both be given or both be omitted")]
    IncompleteRounds,
}
