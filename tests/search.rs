//! End-to-end searches over the public API.

use findhash::{
    config::Config,
    hasher::key_hash,
    keys::{read_keys, read_lines},
    Best, SearchError, SearchParams, Searcher,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::{collections::HashSet, io::Cursor, path::Path};

const STATIONS: &str = "Hamburg
Bulawayo
Palembang
St. John's
Cracow
Bridgetown
Istanbul
Roseau
Conakry
Lodwar
Abha
Jos
Yaoundé
Zürich
";

fn stations() -> Vec<String> {
    let mut keys = Vec::new();
    read_lines(Cursor::new(STATIONS), Path::new("stations"), &mut keys).unwrap();
    keys
}

fn search(keys: &[String], params: SearchParams, seed: &str) -> (Best, Vec<String>) {
    let searcher = Searcher::new(keys, params).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(findhash::hasher::SeedHasher::seed_of(seed));
    let mut lines = Vec::new();
    let best = searcher.run(&mut rng, |b| lines.push(b.to_string()));
    (best, lines)
}

#[test]
fn best_matches_a_direct_recount() {
    let keys = stations();
    let (best, lines) = search(&keys, SearchParams::default(), "stations");

    let codes: HashSet<u64> = keys
        .iter()
        .map(|k| key_hash(k, best.parameter, 16384))
        .collect();
    assert_eq!(codes.len(), best.score);
    assert!((10..=500).contains(&best.parameter));
    assert_eq!(lines.last(), Some(&format!("{} ({},)", best.score, best.parameter)));
}

#[test]
fn seeded_runs_are_reproducible() {
    let keys = stations();
    let first = search(&keys, SearchParams::default(), "replay");
    let threaded = SearchParams {
        thread_count: 5,
        ..SearchParams::default()
    };
    assert_eq!(search(&keys, SearchParams::default(), "replay"), first);
    assert_eq!(search(&keys, threaded, "replay"), first);
}

#[test]
fn one_and_two_character_boundaries() {
    let keys: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
    let (best, lines) = search(&keys, SearchParams::default(), "ab");
    assert_eq!(best.score, 1);
    assert_eq!(best.trial, 0);
    assert_eq!(lines.len(), 1);
}

#[test]
fn empty_input_runs_no_trials() {
    let mut keys = Vec::new();
    read_lines(Cursor::new(""), Path::new("empty"), &mut keys).unwrap();
    assert!(matches!(
        Searcher::new(&keys, SearchParams::default()),
        Err(SearchError::EmptyKeySet)
    ));
}

#[test]
fn keys_are_read_from_files_in_order() {
    let dir = std::env::temp_dir();
    let first = dir.join(format!("findhash-{}-first.txt", std::process::id()));
    let second = dir.join(format!("findhash-{}-second.txt", std::process::id()));
    std::fs::write(&first, "Lodwar\n Abha \n").unwrap();
    std::fs::write(&second, "Jos\n").unwrap();

    let inputs = [first.clone(), second.clone()].map(|p| p.to_string_lossy().into_owned());
    let keys = read_keys(&inputs).unwrap();
    std::fs::remove_file(first).unwrap();
    std::fs::remove_file(second).unwrap();

    assert_eq!(keys, vec!["Lodwar", "Abha", "Jos"]);
}

#[test]
fn config_resolves_to_search_params() {
    use clap::Parser;

    let args = Config::try_parse_from(["findhash", "-t", "200", "-m", "97", "-j", "2"]).unwrap();
    let config = Config::load(args).unwrap();
    let params = SearchParams::try_from(&config).unwrap();

    assert_eq!(
        params,
        SearchParams {
            trial_count: 200,
            param_min: 10,
            param_max: 500,
            modulus: 97,
            thread_count: 2,
        }
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn score_is_bounded_by_unique_keys(
        keys in prop::collection::vec("[a-zA-Z ]{0,12}", 1..40),
        seed in any::<u64>(),
    ) {
        let params = SearchParams { trial_count: 200, ..SearchParams::default() };
        let searcher = Searcher::new(&keys, params).unwrap();
        let mut scores = Vec::new();
        let best = searcher.run(&mut ChaCha8Rng::seed_from_u64(seed), |b| scores.push(b.score));

        let unique = keys.iter().collect::<HashSet<_>>().len();
        prop_assert!(best.score >= 1 && best.score <= unique);
        prop_assert!(scores.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn repeated_key_scores_one(key in "\\PC{0,16}", copies in 1usize..20, seed in any::<u64>()) {
        let keys = vec![key; copies];
        let params = SearchParams { trial_count: 50, ..SearchParams::default() };
        let searcher = Searcher::new(&keys, params).unwrap();
        let best = searcher.run(&mut ChaCha8Rng::seed_from_u64(seed), |_| {});
        prop_assert_eq!(best.score, 1);
    }
}
