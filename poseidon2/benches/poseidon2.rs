use std::any::type_name;
use std::sync::Arc;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use p2mpc_koala_bear::{KoalaBear, koala_bear_16_compression};
use p2mpc_mpc::{Cleartext, InputSharing, LocalAdditive, RandomSquares};
use p2mpc_poseidon2::{
    FeedForwardCompression, Poseidon2Mpc, Poseidon2Params, is_secure, resolve_rounds, sbox_cost,
};

type F = KoalaBear;

fn bench_poseidon2(c: &mut Criterion) {
    let params = Arc::new(koala_bear_16_compression().expect("valid preset"));

    poseidon2_online(c, &Cleartext::<F>::new(0), params.clone());
    poseidon2_online(c, &LocalAdditive::<F, 3>::new(0), params.clone());
    poseidon2_preprocess(c, &LocalAdditive::<F, 3>::new(0), params.clone());
    hash_chain(c, &LocalAdditive::<F, 3>::new(0), params, 16);
}

fn poseidon2_online<E>(c: &mut Criterion, engine: &E, params: Arc<Poseidon2Params<F>>)
where
    E: RandomSquares<F = F> + InputSharing,
{
    let poseidon2 = Poseidon2Mpc::<_, 16>::new(engine, params);
    let input = engine.share_secrets([F::new(7); 16]);
    let id = BenchmarkId::new("poseidon2_online", type_name::<E>());
    c.bench_function(&id.to_string(), |b| {
        b.iter_batched(
            || poseidon2.preprocess(1),
            |mut preprocessing| poseidon2.permute_with(input.clone(), &mut preprocessing),
            BatchSize::SmallInput,
        )
    });
}

fn poseidon2_preprocess<E>(c: &mut Criterion, engine: &E, params: Arc<Poseidon2Params<F>>)
where
    E: RandomSquares<F = F>,
{
    let poseidon2 = Poseidon2Mpc::<_, 16>::new(engine, params);
    let id = BenchmarkId::new("poseidon2_preprocess", type_name::<E>());
    c.bench_function(&id.to_string(), |b| b.iter(|| poseidon2.preprocess(1)));
}

fn hash_chain<E>(c: &mut Criterion, engine: &E, params: Arc<Poseidon2Params<F>>, length: usize)
where
    E: RandomSquares<F = F> + InputSharing,
{
    let compression = FeedForwardCompression::new(Poseidon2Mpc::<_, 16>::new(engine, params));
    let input = engine.share_secrets([F::new(1); 16]);
    let id = BenchmarkId::new("hash_chain", length);
    c.bench_with_input(id, &length, |b, &length| {
        b.iter(|| compression.hash_chain(input.clone(), length))
    });
}

fn bench_round_numbers(c: &mut Criterion) {
    // The uncached search, as run once per configuration.
    for width in [8, 16, 24] {
        let id = BenchmarkId::new("resolve_rounds_koala_bear", width);
        c.bench_with_input(id, &width, |b, &width| {
            b.iter(|| resolve_rounds(0x7f00_0001, width, 3, 128, sbox_cost, true))
        });
    }
    c.bench_function("is_secure", |b| {
        b.iter(|| is_secure(0x7f00_0001, 16, 6, 18, 3, 128))
    });
}

criterion_group!(benches, bench_poseidon2, bench_round_numbers);
criterion_main!(benches);
