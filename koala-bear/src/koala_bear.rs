use p2mpc_field::{FieldParameters, Fp64};

/// The KoalaBear prime: 2^31 - 2^24 + 1
/// This is a 31-bit prime with the highest possible two adicity if we additionally demand that
/// the cube map (x -> x^3) is an automorphism of the multiplicative group.
#[derive(Copy, Clone, Default, Debug, Eq, Hash, PartialEq)]
pub struct KoalaBearParameters;

impl FieldParameters for KoalaBearParameters {
    const PRIME: u64 = 0x7f00_0001;
}

/// The prime field `2^31 - 2^24 + 1`, a.k.a. the Koala Bear field.
pub type KoalaBear = Fp64<KoalaBearParameters>;
