//! The width-16 Poseidon2 compression instance over KoalaBear.
//!
//! The external matrix is the block matrix built from the Horizon Labs 4x4 matrix, the internal
//! matrix is `J + diag(KOALABEAR_16_INTERNAL_DIAG)`. The exponent and the round numbers are
//! resolved from the field and width at 128-bit security, giving 8 full and 20 partial rounds.

use p2mpc_field::Field;
use p2mpc_poseidon2::{ParamsError, Poseidon2Params};

use crate::KoalaBear;

/// Degree of the chosen permutation polynomial for KoalaBear, used as the Poseidon2 S-Box.
///
/// As p - 1 = 127 * 2^{24} we have a a lot of choice in degree D satisfying gcd(p - 1, D) = 1.
/// The smallest available one, 3, is also the cheapest to evaluate on shares.
pub const KOALABEAR_S_BOX_DEGREE: u64 = 3;

pub const KOALABEAR_16_FULL_ROUNDS: usize = 8;
pub const KOALABEAR_16_PARTIAL_ROUNDS: usize = 20;

pub const KOALABEAR_16_EXTERNAL_MATRIX: [[u64; 16]; 16] = [
    [10, 14, 2, 6, 5, 7, 1, 3, 5, 7, 1, 3, 5, 7, 1, 3],
    [8, 12, 2, 2, 4, 6, 1, 1, 4, 6, 1, 1, 4, 6, 1, 1],
    [2, 6, 10, 14, 1, 3, 5, 7, 1, 3, 5, 7, 1, 3, 5, 7],
    [2, 2, 8, 12, 1, 1, 4, 6, 1, 1, 4, 6, 1, 1, 4, 6],
    [5, 7, 1, 3, 10, 14, 2, 6, 5, 7, 1, 3, 5, 7, 1, 3],
    [4, 6, 1, 1, 8, 12, 2, 2, 4, 6, 1, 1, 4, 6, 1, 1],
    [1, 3, 5, 7, 2, 6, 10, 14, 1, 3, 5, 7, 1, 3, 5, 7],
    [1, 1, 4, 6, 2, 2, 8, 12, 1, 1, 4, 6, 1, 1, 4, 6],
    [5, 7, 1, 3, 5, 7, 1, 3, 10, 14, 2, 6, 5, 7, 1, 3],
    [4, 6, 1, 1, 4, 6, 1, 1, 8, 12, 2, 2, 4, 6, 1, 1],
    [1, 3, 5, 7, 1, 3, 5, 7, 2, 6, 10, 14, 1, 3, 5, 7],
    [1, 1, 4, 6, 1, 1, 4, 6, 2, 2, 8, 12, 1, 1, 4, 6],
    [5, 7, 1, 3, 5, 7, 1, 3, 5, 7, 1, 3, 10, 14, 2, 6],
    [4, 6, 1, 1, 4, 6, 1, 1, 4, 6, 1, 1, 8, 12, 2, 2],
    [1, 3, 5, 7, 1, 3, 5, 7, 1, 3, 5, 7, 2, 6, 10, 14],
    [1, 1, 4, 6, 1, 1, 4, 6, 1, 1, 4, 6, 2, 2, 8, 12],
];

pub const KOALABEAR_16_RC_EXTERNAL_INITIAL: [[KoalaBear; 16]; 4] = KoalaBear::new_2d_array([
    [
        2128964168, 288780357, 316938561, 2126233899, 426817493, 1714118888, 1045008582,
        1738510837, 889721787, 8866516, 681576474, 419059826, 1596305521, 1583176088, 1584387047,
        1529751136,
    ],
    [
        1863858111, 1072044075, 517831365, 1464274176, 1138001621, 428001039, 245709561,
        1641420379, 1365482496, 770454828, 693167409, 757905735, 136670447, 436275702, 525466355,
        1559174242,
    ],
    [
        1030087950, 869864998, 322787870, 267688717, 948964561, 740478015, 679816114, 113662466,
        2066544572, 1744924186, 367094720, 1380455578, 1842483872, 416711434, 1342291586,
        1692058446,
    ],
    [
        1493348999, 1113949088, 210900530, 1071655077, 610242121, 1136339326, 2020858841,
        1019840479, 678147278, 1678413261, 1361743414, 61132629, 1209546658, 64412292, 1936878279,
        1980661727,
    ],
]);

pub const KOALABEAR_16_RC_INTERNAL: [KoalaBear; 20] = KoalaBear::new_array([
    1423960925, 2101391318, 1915532054, 275400051, 1168624859, 1141248885, 356546469, 1165250474,
    1320543726, 932505663, 1204226364, 1452576828, 1774936729, 926808140, 1184948056, 1186493834,
    843181003, 185193011, 452207447, 510054082,
]);

pub const KOALABEAR_16_RC_EXTERNAL_FINAL: [[KoalaBear; 16]; 4] = KoalaBear::new_2d_array([
    [
        1139268644, 630873441, 669538875, 462500858, 876500520, 1214043330, 383937013, 375087302,
        636912601, 307200505, 390279673, 1999916485, 1518476730, 1606686591, 1410677749,
        1581191572,
    ],
    [
        1004269969, 143426723, 1747283099, 1016118214, 1749423722, 66331533, 1177761275,
        1581069649, 1851371119, 852520128, 1499632627, 1820847538, 150757557, 884787840, 619710451,
        1651711087,
    ],
    [
        505263814, 212076987, 1482432120, 1458130652, 382871348, 417404007, 2066495280, 1996518884,
        902934924, 582892981, 1337064375, 1199354861, 2102596038, 1533193853, 1436311464,
        2012303432,
    ],
    [
        839997195, 1225781098, 2011967775, 575084315, 1309329169, 786393545, 995788880, 1702925345,
        1444525226, 908073383, 1811535085, 1531002367, 1635653662, 1585100155, 867006515,
        879151050,
    ],
]);

pub const KOALABEAR_16_INTERNAL_DIAG: [KoalaBear; 16] = KoalaBear::new_array([
    479859441, 1064293388, 236801731, 325174860, 162067567, 64109119, 278581903, 683867015,
    996448497, 1960361558, 1782740945, 415413203, 1649591051, 130819423, 547348826, 1386569643,
]);

/// The KoalaBear width-16 compression parameters, with the exponent and the round numbers
/// resolved at 128-bit security.
pub fn koala_bear_16_compression() -> Result<Poseidon2Params<KoalaBear>, ParamsError> {
    let external_matrix = KOALABEAR_16_EXTERNAL_MATRIX
        .iter()
        .map(|row| KoalaBear::new_array(*row).to_vec())
        .collect();

    // Partial rounds only add a constant to lane 0.
    let internal_rows = KOALABEAR_16_RC_INTERNAL.iter().map(|&c| {
        let mut row = vec![KoalaBear::ZERO; 16];
        row[0] = c;
        row
    });
    let round_constants = KOALABEAR_16_RC_EXTERNAL_INITIAL
        .iter()
        .map(|row| row.to_vec())
        .chain(internal_rows)
        .chain(KOALABEAR_16_RC_EXTERNAL_FINAL.iter().map(|row| row.to_vec()))
        .collect();

    Poseidon2Params::new(
        16,
        external_matrix,
        KOALABEAR_16_INTERNAL_DIAG.to_vec(),
        round_constants,
    )
}
