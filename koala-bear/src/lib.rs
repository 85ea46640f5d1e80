//! The KoalaBear field and the Poseidon2 parameters defined over it.

mod koala_bear;
mod poseidon2;

pub use koala_bear::*;
pub use poseidon2::*;
