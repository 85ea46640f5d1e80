//! As the security analysis of Poseidon2 is identical to that of Poseidon,
//! the constraints on the number of full/partial rounds can be found in
//! the original paper: https://eprint.iacr.org/2019/458.pdf and the associated codebase:
//! https://extgit.iaik.tugraz.at/krypto/hadeshash (See generate_params_poseidon.sage)
//!
//! These constraints are broken down into 6 equations:
//! statistical, interpolation, groebner 1, 2, 3 and
//! an extra binomial constraint coming from the paper https://eprint.iacr.org/2023/537.pdf.
//!
//! Rather than tabulating results for a few fields, the round numbers are found by a brute-force
//! search over `R_P in [1, 500)` and even `R_F in [4, 100)`, keeping the candidate with the lowest
//! cost. Every field in this workspace needs the search at most once per configuration, so the
//! results are memoized for the lifetime of the process.

use std::sync::{LazyLock, Mutex, PoisonError};

use gcd::Gcd;
use hashbrown::HashMap;
use num_bigint::BigUint;
use p2mpc_field::{PrimeField64, log2_ceil_u64};
use tracing::{debug, instrument};

use crate::RoundNumberError;

/// Additional full rounds added on top of the minimum when a security margin is requested.
const FULL_ROUND_MARGIN: usize = 2;

/// Multiplicative margin applied to the minimal number of partial rounds.
const PARTIAL_ROUND_MARGIN: f64 = 1.075;

const MAX_PARTIAL_ROUNDS: usize = 500;
const MAX_FULL_ROUNDS: usize = 100;

type CacheKey = (u64, usize, u64, usize, bool);

static ROUND_NUMBER_CACHE: LazyLock<Mutex<HashMap<CacheKey, (usize, usize)>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// A cost function for the search: `(rounds_f, rounds_p, n, width) -> cost` where `n` is the
/// bit size of the state, `ceil(log2(p)) * width`.
pub type RoundCost = fn(usize, usize, usize, usize) -> usize;

/// The number of S-boxes evaluated by one permutation.
pub const fn sbox_cost(rounds_f: usize, rounds_p: usize, _n: usize, width: usize) -> usize {
    width * rounds_f + rounds_p
}

/// The smallest `alpha >= 3` for which `x -> x^alpha` is a permutation of `F_p`.
pub fn resolve_alpha(prime: u64) -> Result<u64, RoundNumberError> {
    (3..prime)
        .find(|&alpha| alpha.gcd(prime - 1) == 1)
        .ok_or(RoundNumberError::NoValidExponent { prime })
}

/// The largest of the five closed-form lower bounds on `R_F` for the given `R_P`.
///
/// All logarithms are evaluated as `f64` and every bound is rounded up before the maximum is
/// taken, so the result may be negative when `R_P` alone already defeats the algebraic attacks.
pub fn full_round_lower_bound(
    prime: u64,
    width: usize,
    rounds_p: usize,
    alpha: u64,
    security_bits: usize,
) -> f64 {
    let m = security_bits as f64;
    let t = width as f64;
    let r_p = rounds_p as f64;
    let log2_p = (prime as f64).ln() / 2f64.ln();
    let log_alpha_2 = 2f64.ln() / (alpha as f64).ln();
    let log_alpha_t = t.ln() / (alpha as f64).ln();
    let log2_alpha = (alpha as f64).ln() / 2f64.ln();

    let statistical = if m <= (log2_p - (alpha as f64 - 1.0) / 2.0).floor() * (t + 1.0) {
        6.0
    } else {
        10.0
    };
    let interpolation = 1.0 + (log_alpha_2 * m.min(log2_p)).ceil() + log_alpha_t.ceil() - r_p;
    let groebner_1 = log_alpha_2 * m.min(log2_p) - r_p;
    let groebner_2 = t - 1.0 + log_alpha_2 * (m / (t + 1.0)).min(log2_p / 2.0) - r_p;
    let groebner_3 = (t - 2.0 + m / (2.0 * log2_alpha) - r_p) / (t - 1.0);

    [
        statistical,
        interpolation,
        groebner_1,
        groebner_2,
        groebner_3,
    ]
    .into_iter()
    .map(f64::ceil)
    .fold(f64::NEG_INFINITY, f64::max)
}

/// The binomial bound of https://eprint.iacr.org/2023/537.pdf.
///
/// Requires `ceil(2 * log2(C(over, under))) >= M`, which for integer `M` is the exact test
/// `C(over, under)^2 > 2^(M - 1)`. The binomial is built up incrementally and the test stops as
/// soon as the partial product crosses the threshold, since it only grows from there.
pub fn binomial_bound_holds(
    width: usize,
    rounds_f: usize,
    rounds_p: usize,
    alpha: u64,
    security_bits: usize,
) -> bool {
    if security_bits == 0 {
        return true;
    }
    let width = width as u64;
    let rounds_f = rounds_f as u64;
    let rounds_p = rounds_p as u64;
    let r = width / 3;

    let over = (rounds_f - 1) * width + 2 * rounds_p + r + r * (rounds_f / 2) + alpha;
    let under = r * (rounds_f / 2) + rounds_p + alpha;
    let threshold = BigUint::from(1u32) << (security_bits - 1);

    let mut binomial = BigUint::from(1u32);
    for i in 1..=under {
        binomial *= over - under + i;
        binomial /= i;
        if &binomial * &binomial > threshold {
            return true;
        }
    }
    false
}

/// Whether `(rounds_f, rounds_p)` defeats every known attack at `security_bits` bits of security.
pub fn is_secure(
    prime: u64,
    width: usize,
    rounds_f: usize,
    rounds_p: usize,
    alpha: u64,
    security_bits: usize,
) -> bool {
    rounds_f as f64 >= full_round_lower_bound(prime, width, rounds_p, alpha, security_bits)
        && binomial_bound_holds(width, rounds_f, rounds_p, alpha, security_bits)
}

/// Search for the cheapest `(rounds_f, rounds_p)` pair reaching `security_bits` bits of security.
///
/// With `apply_margin`, every secure candidate is inflated to
/// `(R_F + 2, ceil(R_P * 1.075))` before its cost is computed, and the returned pair is the
/// inflated pair. Ties in cost go to the candidate with fewer full rounds.
///
/// # Panics
/// Panics if `alpha < 3`.
#[instrument(level = "debug", skip(cost))]
pub fn resolve_rounds(
    prime: u64,
    width: usize,
    alpha: u64,
    security_bits: usize,
    cost: RoundCost,
    apply_margin: bool,
) -> Result<(usize, usize), RoundNumberError> {
    assert!(alpha >= 3, "Invalid S-box exponent {alpha}");
    if width < 2 {
        return Err(RoundNumberError::UnsupportedWidth { width });
    }

    let n = log2_ceil_u64(prime) * width;
    // (cost, rounds_f, rounds_p)
    let mut best: Option<(usize, usize, usize)> = None;

    for rounds_p in 1..MAX_PARTIAL_ROUNDS {
        for rounds_f in (4..MAX_FULL_ROUNDS).step_by(2) {
            if !is_secure(prime, width, rounds_f, rounds_p, alpha, security_bits) {
                continue;
            }
            let (rounds_f, rounds_p) = if apply_margin {
                (
                    rounds_f + FULL_ROUND_MARGIN,
                    (rounds_p as f64 * PARTIAL_ROUND_MARGIN).ceil() as usize,
                )
            } else {
                (rounds_f, rounds_p)
            };
            let candidate_cost = cost(rounds_f, rounds_p, n, width);
            let improves = best.is_none_or(|(best_cost, best_f, _)| {
                candidate_cost < best_cost || (candidate_cost == best_cost && rounds_f < best_f)
            });
            if improves {
                best = Some((candidate_cost, rounds_f, rounds_p));
            }
        }
    }

    let (_, rounds_f, rounds_p) = best.ok_or(RoundNumberError::NoSatisfyingRounds {
        prime,
        width,
        alpha,
        security_bits,
    })?;
    debug!(rounds_f, rounds_p, "resolved round numbers");
    Ok((rounds_f, rounds_p))
}

/// [`resolve_rounds`] with the S-box cost function, memoized per
/// `(prime, width, alpha, security_bits, apply_margin)`.
pub fn round_numbers(
    prime: u64,
    width: usize,
    alpha: u64,
    security_bits: usize,
    apply_margin: bool,
) -> Result<(usize, usize), RoundNumberError> {
    let key = (prime, width, alpha, security_bits, apply_margin);
    let cached = ROUND_NUMBER_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .copied();
    if let Some(rounds) = cached {
        debug!(prime, width, alpha, "round numbers cache hit");
        return Ok(rounds);
    }

    // The lock is not held during the search; two threads racing on the same key compute
    // the same answer.
    let rounds = resolve_rounds(prime, width, alpha, security_bits, sbox_cost, apply_margin)?;
    ROUND_NUMBER_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, rounds);
    Ok(rounds)
}

/// Given a field, a width and an S-box degree return the number of full and partial rounds
/// needed to achieve 128 bit security, including the security margin.
pub fn poseidon2_round_numbers_128<F: PrimeField64>(
    width: usize,
    alpha: u64,
) -> Result<(usize, usize), RoundNumberError> {
    round_numbers(F::ORDER_U64, width, alpha, 128, true)
}
