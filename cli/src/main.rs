mod parsers;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use p2mpc_field::PrimeField64;
use p2mpc_koala_bear::{KoalaBear, koala_bear_16_compression};
use p2mpc_mpc::{Cleartext, CommunicationStats, InputSharing, LocalAdditive, RandomSquares};
use p2mpc_poseidon2::{
    ConfigError, FeedForwardCompression, ParamsError, Poseidon2Config, Poseidon2Mpc,
    Poseidon2Params, RoundNumberError, resolve_alpha, round_numbers,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::info_span;
use tracing_forest::ForestLayer;
use tracing_forest::util::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::parsers::{BackendOptions, PresetOptions};

type F = KoalaBear;

/// Number of lanes of each chain output printed.
const PRINTED_LANES: usize = 4;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the S-box exponent and the round numbers for a prime and a width.
    Rounds {
        #[arg(short, long)]
        prime: u64,

        #[arg(short, long)]
        width: usize,

        #[arg(long, default_value_t = 128)]
        security_bits: usize,

        /// Return the minimal round numbers without the security margin.
        #[arg(long)]
        no_margin: bool,
    },

    /// Write a named parameter set as JSON.
    Export {
        #[arg(long, ignore_case = true, value_enum, default_value_t = PresetOptions::KoalaBear16)]
        preset: PresetOptions,

        /// Where to write the parameters. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate hash chains on secret-shared random inputs and report the communication.
    Hash(HashArgs),
}

#[derive(Args, Debug)]
struct HashArgs {
    /// A JSON parameter file over KoalaBear. Overrides the preset.
    #[arg(long, conflicts_with = "preset")]
    params: Option<PathBuf>,

    #[arg(long, ignore_case = true, value_enum, default_value_t = PresetOptions::KoalaBear16)]
    preset: PresetOptions,

    #[arg(short, long, ignore_case = true, value_enum, default_value_t = BackendOptions::Additive)]
    backend: BackendOptions,

    /// Number of parties for the additive backend.
    #[arg(long, default_value_t = 3)]
    parties: usize,

    /// Number of compressions per chain.
    #[arg(short = 'l', long, default_value_t = 1)]
    chain_length: usize,

    /// Number of independent chains.
    #[arg(short = 'n', long, default_value_t = 1)]
    chains: usize,

    /// Seed for the inputs and the backend's randomness.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Rounds(#[from] RoundNumberError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("no permutation is compiled for width {0}")]
    UnsupportedWidth(usize),
    #[error("the additive backend supports 2 to 5 parties, got {0}")]
    UnsupportedParties(usize),
}

fn main() -> Result<(), CliError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(ForestLayer::default())
        .init();

    match Cli::parse().command {
        Command::Rounds {
            prime,
            width,
            security_bits,
            no_margin,
        } => {
            let alpha = resolve_alpha(prime)?;
            let (rounds_f, rounds_p) =
                round_numbers(prime, width, alpha, security_bits, !no_margin)?;
            println!("alpha = {alpha}, rounds_f = {rounds_f}, rounds_p = {rounds_p}");
            println!("S-boxes per permutation: {}", width * rounds_f + rounds_p);
        }
        Command::Export { preset, output } => {
            let config = Poseidon2Config::from_params(&load_preset(preset)?);
            match output {
                Some(path) => config.write_to_path(path)?,
                None => println!("{}", config.to_json_string()?),
            }
        }
        Command::Hash(args) => {
            let params = match &args.params {
                Some(path) => Poseidon2Config::from_path(path)?.into_params::<F>()?,
                None => load_preset(args.preset)?,
            };
            dispatch_width(&args, Arc::new(params))?;
        }
    }
    Ok(())
}

fn load_preset(preset: PresetOptions) -> Result<Poseidon2Params<F>, ParamsError> {
    match preset {
        PresetOptions::KoalaBear16 => koala_bear_16_compression(),
    }
}

fn dispatch_width(args: &HashArgs, params: Arc<Poseidon2Params<F>>) -> Result<(), CliError> {
    match params.width() {
        2 => dispatch_backend::<2>(args, params),
        3 => dispatch_backend::<3>(args, params),
        4 => dispatch_backend::<4>(args, params),
        8 => dispatch_backend::<8>(args, params),
        12 => dispatch_backend::<12>(args, params),
        16 => dispatch_backend::<16>(args, params),
        20 => dispatch_backend::<20>(args, params),
        24 => dispatch_backend::<24>(args, params),
        width => Err(CliError::UnsupportedWidth(width)),
    }
}

fn dispatch_backend<const WIDTH: usize>(
    args: &HashArgs,
    params: Arc<Poseidon2Params<F>>,
) -> Result<(), CliError> {
    let stats = match args.backend {
        BackendOptions::Cleartext => {
            let engine = Cleartext::<F>::new(args.seed);
            run_chains::<_, WIDTH>(&engine, params, args);
            engine.stats()
        }
        BackendOptions::Additive => match args.parties {
            2 => run_additive::<2, WIDTH>(args, params),
            3 => run_additive::<3, WIDTH>(args, params),
            4 => run_additive::<4, WIDTH>(args, params),
            5 => run_additive::<5, WIDTH>(args, params),
            parties => return Err(CliError::UnsupportedParties(parties)),
        },
    };
    println!(
        "communication: {}",
        serde_json::to_string(&stats).map_err(ConfigError::from)?
    );
    Ok(())
}

fn run_additive<const PARTIES: usize, const WIDTH: usize>(
    args: &HashArgs,
    params: Arc<Poseidon2Params<F>>,
) -> CommunicationStats {
    let engine = LocalAdditive::<F, PARTIES>::new(args.seed);
    run_chains::<_, WIDTH>(&engine, params, args);
    engine.stats()
}

fn run_chains<E, const WIDTH: usize>(engine: &E, params: Arc<Poseidon2Params<F>>, args: &HashArgs)
where
    E: RandomSquares<F = F> + InputSharing,
{
    let _span = info_span!("hash chains", chains = args.chains, length = args.chain_length)
        .entered();

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let inputs: Vec<[E::Share; WIDTH]> = (0..args.chains)
        .map(|_| engine.share_secrets(rng.random::<[F; WIDTH]>()))
        .collect();

    let permutation = Poseidon2Mpc::<_, WIDTH>::new(engine, params);
    let compression = FeedForwardCompression::new(permutation);
    let outputs = compression.ots(&inputs, args.chain_length, args.chains);

    for (i, output) in outputs.iter().enumerate() {
        let opened: Vec<u64> = engine
            .open_many(output)
            .iter()
            .take(PRINTED_LANES)
            .map(F::as_canonical_u64)
            .collect();
        println!("chain {i}: {opened:?}");
    }
}
