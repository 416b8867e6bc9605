use std::{collections::HashSet, fmt::Display};

use log::{debug, info};
use rand::Rng;

use crate::config::{DEFAULT_MODULUS, DEFAULT_PARAM_MAX, DEFAULT_PARAM_MIN, DEFAULT_TRIAL_COUNT};
use crate::error::{Result, SearchError};
use crate::hasher::KeyWeights;

const TRIALS_PER_THREAD: usize = 1024;

/// Resolved settings for one search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub trial_count: usize,
    pub param_min: u64,
    pub param_max: u64,
    pub modulus: u64,
    pub thread_count: usize,
}

impl SearchParams {
    pub fn validate(&self) -> Result<()> {
        if self.trial_count == 0 {
            return Err(SearchError::InvalidConfig(
                "trial count must be at least 1".into(),
            ));
        }
        if self.param_min > self.param_max {
            return Err(SearchError::InvalidConfig(format!(
                "parameter range is empty: min {} > max {}",
                self.param_min, self.param_max
            )));
        }
        if self.modulus == 0 {
            return Err(SearchError::InvalidConfig("modulus must be at least 1".into()));
        }
        if self.thread_count == 0 {
            return Err(SearchError::InvalidConfig(
                "thread count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            trial_count: DEFAULT_TRIAL_COUNT,
            param_min: DEFAULT_PARAM_MIN,
            param_max: DEFAULT_PARAM_MAX,
            modulus: DEFAULT_MODULUS,
            thread_count: 1,
        }
    }
}

/// Best spread seen so far and the trial that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Best {
    pub score: usize,
    pub parameter: u64,
    pub trial: usize,
}

impl Best {
    /// Folds scored trials, numbered from `first_trial`, into this record.
    ///
    /// Only a strictly higher score replaces the record, so the earliest trial
    /// with the highest score wins.
    pub fn update<F>(
        &mut self,
        first_trial: usize,
        parameters: &[u64],
        scores: &[usize],
        on_improve: &mut F,
    ) where
        F: FnMut(&Best),
    {
        for (offset, (&parameter, &score)) in parameters.iter().zip(scores).enumerate() {
            if score > self.score {
                let trial = first_trial + offset;
                *self = Best {
                    score,
                    parameter,
                    trial,
                };
                debug!("trial {trial}: new best spread {score} with parameter {parameter}");
                on_improve(self);
            }
        }
    }

    /// The parameter as a one-element tuple, e.g. `(123,)`.
    pub fn parameter_tuple(&self) -> String {
        format!("({},)", self.parameter)
    }
}

/// Progress line format: `<score> (<parameter>,)`.
impl Display for Best {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.score, self.parameter_tuple())
    }
}

/// Random search for the trial parameter with the largest spread over a key set.
pub struct Searcher {
    weights: Vec<KeyWeights>,
    params: SearchParams,
}

impl Searcher {
    pub fn new(keys: &[String], params: SearchParams) -> Result<Self> {
        if keys.is_empty() {
            return Err(SearchError::EmptyKeySet);
        }
        params.validate()?;

        let weights = keys
            .iter()
            .map(|key| KeyWeights::new(key, params.modulus))
            .collect();

        Ok(Self { weights, params })
    }

    pub fn key_count(&self) -> usize {
        self.weights.len()
    }

    /// Draws `count` parameters in order.
    pub fn draw_parameters<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<u64> {
        let range = self.params.param_min..=self.params.param_max;
        (0..count).map(|_| rng.gen_range(range.clone())).collect()
    }

    /// Spread of every parameter, split across `thread_count` workers.
    pub fn score_trials(&self, parameters: &[u64]) -> Vec<usize> {
        let mut scores = vec![0; parameters.len()];
        let modulus = self.params.modulus;
        let thread_count = self.params.thread_count.max(1);

        if thread_count == 1 || parameters.len() < 2 {
            job(&mut scores, parameters, &self.weights, modulus);
            return scores;
        }

        let chunk_size = parameters.len().div_ceil(thread_count);
        let weights = &self.weights[..];

        let result = crossbeam::scope(|scope| {
            for (scores, parameters) in scores
                .chunks_mut(chunk_size)
                .zip(parameters.chunks(chunk_size))
            {
                scope.spawn(move |_| job(scores, parameters, weights, modulus));
            }
        });
        if let Err(panic) = result {
            std::panic::resume_unwind(panic);
        }

        scores
    }

    /// Runs every trial and returns the best one.
    ///
    /// Parameters are drawn from `rng` in trial order, one batch at a time, and
    /// each batch is folded into the best record before the next is drawn. The
    /// result depends only on the generator state, never on the thread count.
    /// `on_improve` sees each strict improvement as soon as its batch is scored;
    /// ties keep the earlier trial.
    pub fn run<R, F>(&self, rng: &mut R, mut on_improve: F) -> Best
    where
        R: Rng,
        F: FnMut(&Best),
    {
        info!(
            "running {} trials over {} keys, parameter in [{}, {}], modulus {}, {} thread(s)",
            self.params.trial_count,
            self.key_count(),
            self.params.param_min,
            self.params.param_max,
            self.params.modulus,
            self.params.thread_count
        );

        let batch_size = match self.params.thread_count {
            0 | 1 => 1,
            threads => threads * TRIALS_PER_THREAD,
        };
        let mut best = Best::default();
        let mut first_trial = 0;

        while first_trial < self.params.trial_count {
            let count = batch_size.min(self.params.trial_count - first_trial);
            let parameters = self.draw_parameters(rng, count);
            let scores = self.score_trials(&parameters);
            best.update(first_trial, &parameters, &scores, &mut on_improve);
            first_trial += count;
        }

        best
    }
}

/// Number of distinct hash codes the keys produce for parameter `a`.
pub fn spread(weights: &[KeyWeights], a: u64, modulus: u64) -> usize {
    spread_into(&mut HashSet::with_capacity(weights.len()), weights, a, modulus)
}

fn spread_into(codes: &mut HashSet<u64>, weights: &[KeyWeights], a: u64, modulus: u64) -> usize {
    codes.clear();
    codes.extend(weights.iter().map(|w| w.hash(a, modulus)));
    codes.len()
}

fn job(scores: &mut [usize], parameters: &[u64], weights: &[KeyWeights], modulus: u64) {
    let mut codes = HashSet::with_capacity(weights.len());

    for (score, &a) in scores.iter_mut().zip(parameters) {
        *score = spread_into(&mut codes, weights, a, modulus);
    }
}
