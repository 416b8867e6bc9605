pub mod config;
pub mod error;
pub mod hasher;
pub mod keys;
pub mod searcher;

pub use error::{Result, SearchError};
pub use searcher::{Best, SearchParams, Searcher};
