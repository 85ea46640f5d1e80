//! The Poseidon2 permutation, evaluated on secret-shared field elements.
//!
//! This implementation was based upon the following resources:
//! - https://github.com/HorizenLabs/poseidon2/blob/main/plain_implementations/src/poseidon2/poseidon2.rs
//! - https://eprint.iacr.org/2023/323.pdf
//!
//! Everything that touches secret data goes through an [`p2mpc_mpc::MpcEngine`]. The linear
//! layers and round constants are local operations on shares. The only non-linear step is the
//! S-box, which is evaluated with a preprocessed cube gadget costing a single opening per layer.

mod compression;
mod config;
mod cube;
mod error;
mod external;
mod internal;
mod params;
mod permutation;
mod round_numbers;
mod sbox;

pub use compression::*;
pub use config::*;
pub use cube::*;
pub use error::*;
pub use external::*;
pub use internal::*;
pub use params::*;
pub use permutation::*;
pub use round_numbers::*;
pub use sbox::*;
