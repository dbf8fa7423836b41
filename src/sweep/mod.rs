pub mod grid;
pub mod runner;
pub mod trade_log;

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub use grid::{combination_count, expand, write_grid_file, ParameterCombination};
pub use runner::{SweepFailure, SweepOutcome, SweepRecord, SweepRunner};
pub use trade_log::{format_line, TradeLogWriter};

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[source] rayon::ThreadPoolBuildError),
    #[error("Combination {test_id} has invalid parameters: {source}")]
    Parameters {
        test_id: usize,
        #[source]
        source: ConfigError,
    },
    #[error("Failed to write trade log {path:?}: {source}")]
    TradeLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Trade log lock was poisoned by a panicking worker")]
    PoisonedLog,
}
