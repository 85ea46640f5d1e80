use p2mpc_mpc::MpcEngine;
use serde::{Deserialize, Serialize};

use crate::{CubePreprocessing, ParamsError, cube_many};

/// The S-boxes which can be evaluated on shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sbox {
    /// `x -> x^3`, one opening per layer.
    Cube,
    /// `x -> x^7`, computed as `x * (x^2)^3`: a multiplication, a cube and another
    /// multiplication, so three rounds per layer.
    Septic,
}

impl Sbox {
    pub const fn from_alpha(alpha: u64) -> Result<Self, ParamsError> {
        match alpha {
            3 => Ok(Self::Cube),
            7 => Ok(Self::Septic),
            _ => Err(ParamsError::UnsupportedSbox { alpha }),
        }
    }

    pub const fn degree(self) -> u64 {
        match self {
            Self::Cube => 3,
            Self::Septic => 7,
        }
    }

    /// Communication rounds needed to apply one layer of S-boxes.
    pub const fn rounds_per_layer(self) -> usize {
        match self {
            Self::Cube => 1,
            Self::Septic => 3,
        }
    }

    /// Apply the S-box to every share of the batch. Each share consumes one cube triple.
    pub fn apply<E: MpcEngine>(
        self,
        engine: &E,
        xs: &[E::Share],
        preprocessing: &mut CubePreprocessing<E::Share>,
    ) -> Vec<E::Share> {
        match self {
            Self::Cube => cube_many(engine, xs, preprocessing),
            Self::Septic => {
                let x2 = engine.mul_many(xs, xs);
                let x6 = cube_many(engine, &x2, preprocessing);
                engine.mul_many(xs, &x6)
            }
        }
    }
}
