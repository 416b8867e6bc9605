use std::{
    io::{self, Write},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use findhash::{config::Config, keys, Result, SearchError, SearchParams, Searcher};
use log::{info, warn, LevelFilter};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn main() -> ExitCode {
    match Config::load(Config::parse()).and_then(|config| run(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(config: &Config) -> Result<()> {
    init_logging(config.verbose.unwrap_or_default());
    if let Some(path) = config.missing_config_file() {
        warn!("Provided config file does not exist: '{path}'");
    }

    if config.dump_config.unwrap_or_default() {
        eprintln!("{config}");
    }

    let params = SearchParams::try_from(config)?;
    let keys = keys::read_keys(&config.inputs)?;
    info!(
        "read {} keys, seed '{}'",
        keys.len(),
        config.seed.as_deref().unwrap_or_default()
    );

    let searcher = Searcher::new(&keys, params)?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_error = None;

    let start = Instant::now();
    let best = searcher.run(&mut rng, |best| {
        if write_error.is_none() {
            write_error = writeln!(out, "{best}").and_then(|_| out.flush()).err();
        }
    });
    let duration = start.elapsed();

    if let Some(err) = write_error {
        return Err(SearchError::io("<stdout>", err));
    }
    writeln!(out, "{}", best.score)
        .and_then(|_| writeln!(out, "{}", best.parameter_tuple()))
        .map_err(|err| SearchError::io("<stdout>", err))?;

    info!(
        "Done! Took {:.3?} (~ {} trials / sec)",
        duration,
        with_thousands((params.trial_count as f64 / duration.as_secs_f64()) as u64)
    );

    Ok(())
}

fn with_thousands(value: u64) -> String {
    value
        .to_string()
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}
