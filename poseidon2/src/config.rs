//! Parameter files.
//!
//! A [`Poseidon2Config`] is the JSON form of a [`Poseidon2Params`], with every field element
//! written as its canonical integer. The exponent, the round numbers and the external matrix
//! may be omitted, in which case they are derived the same way [`Poseidon2Params::new`] and
//! [`external_matrix`] derive them.

use std::fs;
use std::path::Path;

use p2mpc_field::PrimeField64;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    ConfigError, ParamsError, Poseidon2Params, Sbox, external_matrix, resolve_alpha, round_numbers,
};

const fn default_security_bits() -> usize {
    128
}

const fn default_security_margin() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Poseidon2Config {
    pub prime: u64,
    pub width: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds_f: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds_p: Option<usize>,
    /// Only used when the round numbers are derived.
    #[serde(default = "default_security_bits")]
    pub security_bits: usize,
    /// Only used when the round numbers are derived.
    #[serde(default = "default_security_margin")]
    pub security_margin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_matrix: Option<Vec<Vec<u64>>>,
    pub internal_diag: Vec<u64>,
    pub round_constants: Vec<Vec<u64>>,
}

impl Poseidon2Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// A fully explicit config describing `params`.
    pub fn from_params<F: PrimeField64>(params: &Poseidon2Params<F>) -> Self {
        Self {
            prime: params.prime(),
            width: params.width(),
            alpha: Some(params.alpha()),
            rounds_f: Some(params.rounds_f()),
            rounds_p: Some(params.rounds_p()),
            security_bits: default_security_bits(),
            security_margin: default_security_margin(),
            external_matrix: Some(to_canonical_rows(params.external_matrix())),
            internal_diag: to_canonical_row(params.internal_diag()),
            round_constants: to_canonical_rows(params.round_constants()),
        }
    }

    /// Resolve any omitted values and build validated parameters over `F`.
    #[instrument(level = "debug", skip_all, fields(prime = self.prime, width = self.width))]
    pub fn into_params<F: PrimeField64>(self) -> Result<Poseidon2Params<F>, ConfigError> {
        if self.prime != F::ORDER_U64 {
            return Err(ParamsError::PrimeMismatch {
                expected: F::ORDER_U64,
                found: self.prime,
            }
            .into());
        }
        let alpha = match self.alpha {
            Some(alpha) => alpha,
            None => resolve_alpha(self.prime)?,
        };
        // Exponents without a secure S-box never reach the round search.
        Sbox::from_alpha(alpha)?;
        let (rounds_f, rounds_p) = match (self.rounds_f, self.rounds_p) {
            (Some(rounds_f), Some(rounds_p)) => (rounds_f, rounds_p),
            (None, None) => round_numbers(
                self.prime,
                self.width,
                alpha,
                self.security_bits,
                self.security_margin,
            )?,
            _ => return Err(ConfigError::IncompleteRounds),
        };
        debug!(alpha, rounds_f, rounds_p, "loading parameters");

        let external_matrix = match self.external_matrix {
            Some(rows) => to_field_rows(&rows)?,
            None => external_matrix(self.width)?,
        };
        let params = Poseidon2Params::from_rounds(
            self.width,
            alpha,
            rounds_f,
            rounds_p,
            external_matrix,
            to_field_row(&self.internal_diag)?,
            to_field_rows(&self.round_constants)?,
        )?;
        Ok(params)
    }
}

fn to_canonical_row<F: PrimeField64>(row: &[F]) -> Vec<u64> {
    row.iter().map(F::as_canonical_u64).collect()
}

fn to_canonical_rows<F: PrimeField64>(rows: &[Vec<F>]) -> Vec<Vec<u64>> {
    rows.iter().map(|row| to_canonical_row(row)).collect()
}

fn to_field_row<F: PrimeField64>(values: &[u64]) -> Result<Vec<F>, ParamsError> {
    values
        .iter()
        .map(|&value| {
            F::from_canonical_checked(value).ok_or(ParamsError::NonCanonicalElement { value })
        })
        .collect()
}

fn to_field_rows<F: PrimeField64>(rows: &[Vec<u64>]) -> Result<Vec<Vec<F>>, ParamsError> {
    rows.iter().map(|row| to_field_row(row)).collect()
}
