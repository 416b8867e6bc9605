use std::{
    fmt::Display,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use clap::Parser;
use rand::distributions::{Alphanumeric, DistString};

use crate::error::{Result, SearchError};
use crate::hasher::SeedHasher;
use crate::searcher::SearchParams;

pub const DEFAULT_TRIAL_COUNT: usize = 10_000;
pub const DEFAULT_PARAM_MIN: u64 = 10;
pub const DEFAULT_PARAM_MAX: u64 = 500;
pub const DEFAULT_MODULUS: u64 = 16384;
const DEFAULT_DUMP_CONFIG: bool = false;
const DEFAULT_VERBOSE: bool = false;
const SEED_LENGTH: usize = 32;

/// Searches for a hash parameter that spreads a set of keys over as many
/// distinct hash codes as possible.
#[derive(serde::Serialize, serde::Deserialize, Parser, Clone, Debug, Default)]
#[command(
    version,
    about,
    long_about = None,
)]
pub struct Config {
    /// Path to configuration JSON file
    #[serde(skip)]
    #[arg(short = 'i', long)]
    pub config_file: Option<String>,

    /// Print the resolved configuration to stderr before searching
    #[serde(skip_serializing)]
    #[arg(short, long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub dump_config: Option<bool>,

    /// Seed for the parameter draws; random if not given
    #[arg(short, long)]
    pub seed: Option<String>,

    /// Number of random trials to run
    #[arg(short, long, value_parser = trial_count_in_range)]
    pub trial_count: Option<usize>,

    /// Smallest parameter value drawn (inclusive)
    #[arg(long)]
    pub param_min: Option<u64>,

    /// Largest parameter value drawn (inclusive)
    #[arg(long)]
    pub param_max: Option<u64>,

    /// Modulus the key hashes are reduced by
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub modulus: Option<u64>,

    /// Number of threads used to score trials
    #[arg(short = 'j', long, value_parser = thread_count_in_range)]
    pub thread_count: Option<usize>,

    /// Log progress details to stderr
    #[serde(skip_serializing)]
    #[arg(short, long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub verbose: Option<bool>,

    /// Files to read keys from, one per line; stdin if none or `-`
    #[serde(skip)]
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,
}

fn trial_count_in_range(s: &str) -> std::result::Result<usize, String> {
    let trial_count = s.parse().map_err(|_| format!("{s} is not a number."))?;

    if trial_count >= 1 {
        Ok(trial_count)
    } else {
        Err("Trial count must be at least 1!".to_string())
    }
}

fn thread_count_in_range(s: &str) -> std::result::Result<usize, String> {
    let thread_count = s.parse().map_err(|_| format!("{s} is not a number."))?;

    if (1..=256).contains(&thread_count) {
        Ok(thread_count)
    } else {
        Err("Thread count must be between 1 and 256!".to_string())
    }
}

impl Config {
    /// Command line values win over the config file, which wins over defaults.
    pub fn load(config_args: Config) -> Result<Self> {
        let Some(config_path) = &config_args.config_file else {
            return Ok(config_args.merge_with_defaults(&config_args));
        };

        let path = PathBuf::from(config_path);
        if !path.exists() {
            return Ok(config_args.merge_with_defaults(&config_args));
        }

        let config_file = File::open(&path).map_err(|err| SearchError::io(&path, err))?;
        let config_json: Config = serde_json::from_reader(BufReader::new(config_file))
            .map_err(|source| SearchError::ConfigParse { path, source })?;

        Ok(config_args.merge_with_defaults(&config_json))
    }

    fn merge_with_defaults(&self, other: &Config) -> Self {
        Config {
            dump_config: self
                .dump_config
                .or(other.dump_config.or(Some(DEFAULT_DUMP_CONFIG))),
            seed: self.seed.clone().or(other.seed.clone().or_else(|| {
                Some(Alphanumeric.sample_string(&mut rand::thread_rng(), SEED_LENGTH))
            })),
            trial_count: self
                .trial_count
                .or(other.trial_count.or(Some(DEFAULT_TRIAL_COUNT))),
            param_min: self
                .param_min
                .or(other.param_min.or(Some(DEFAULT_PARAM_MIN))),
            param_max: self
                .param_max
                .or(other.param_max.or(Some(DEFAULT_PARAM_MAX))),
            modulus: self.modulus.or(other.modulus.or(Some(DEFAULT_MODULUS))),
            thread_count: self
                .thread_count
                .or(other.thread_count.or_else(|| Some(default_thread_count()))),
            verbose: self.verbose.or(other.verbose.or(Some(DEFAULT_VERBOSE))),
            config_file: self.config_file.clone(),
            inputs: self.inputs.clone(),
        }
    }

    /// The config file that was asked for but not found, if any.
    pub fn missing_config_file(&self) -> Option<&str> {
        self.config_file
            .as_deref()
            .filter(|path| !Path::new(path).exists())
    }

    /// Generator seed derived from the seed string.
    pub fn rng_seed(&self) -> u64 {
        SeedHasher::seed_of(self.seed.as_deref().unwrap_or_default())
    }
}

fn default_thread_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

impl TryFrom<&Config> for SearchParams {
    type Error = SearchError;

    fn try_from(config: &Config) -> Result<Self> {
        fn required<T: Copy>(value: Option<T>, name: &str) -> Result<T> {
            value.ok_or_else(|| SearchError::InvalidConfig(format!("{name} is not set")))
        }

        let params = SearchParams {
            trial_count: required(config.trial_count, "trial_count")?,
            param_min: required(config.param_min, "param_min")?,
            param_max: required(config.param_max, "param_max")?,
            modulus: required(config.modulus, "modulus")?,
            thread_count: required(config.thread_count, "thread_count")?,
        };
        params.validate()?;
        Ok(params)
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{json}")
    }
}
