use crate::config::ConfigError;
use crate::data::PriceSeries;
use crate::engine::{simulate, TradeRecord};
use crate::metrics::BacktestReport;
use crate::sweep::grid::ParameterCombination;
use crate::sweep::trade_log::TradeLogWriter;
use crate::sweep::SweepError;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

//one successful unit
#[derive(Debug, Clone)]
pub struct SweepRecord {
    pub index: usize,
    pub report: BacktestReport,
    //only kept when the runner was asked to
    pub trades: Option<Vec<TradeRecord>>,
}

//one unit that could not run
#[derive(Debug)]
pub struct SweepFailure {
    pub index: usize,
    pub error: SweepError,
}

#[derive(Debug, Default)]
pub struct SweepOutcome {
    //in grid order
    pub records: Vec<SweepRecord>,
    pub failures: Vec<SweepFailure>,
}

//runs every parameter combination on a dedicated worker pool
#[derive(Debug, Default)]
pub struct SweepRunner {
    //zero means one thread per cpu
    threads: usize,
    trade_log: Option<TradeLogWriter>,
    keep_trades: bool,
}

impl SweepRunner {
    pub fn new(threads: usize) -> Self {
        SweepRunner {
            threads,
            trade_log: None,
            keep_trades: false,
        }
    }

    pub fn with_trade_log(mut self, writer: TradeLogWriter) -> Self {
        self.trade_log = Some(writer);
        self
    }

    //keep each unit's trades in memory, e.g. for a monthly report
    pub fn keep_trades(mut self, keep: bool) -> Self {
        self.keep_trades = keep;
        self
    }

    pub fn run(
        &self,
        series: &PriceSeries,
        combinations: &[ParameterCombination],
    ) -> Result<SweepOutcome, SweepError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(SweepError::ThreadPool)?;

        let total = combinations.len();
        let step = (total / 10).max(1);
        let done = AtomicUsize::new(0);

        info!(
            units = total,
            threads = pool.current_num_threads(),
            rows = series.len(),
            "starting sweep"
        );

        let results: Vec<Result<SweepRecord, SweepFailure>> = pool.install(|| {
            combinations
                .par_iter()
                .map(|combination| {
                    let result = self.run_unit(series, combination);

                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if finished % step == 0 || finished == total {
                        info!(
                            finished,
                            total,
                            percent = finished * 100 / total,
                            "sweep progress"
                        );
                    }

                    result.map_err(|error| {
                        warn!(test_id = combination.test_id(), %error, "skipping combination");
                        SweepFailure {
                            index: combination.index,
                            error,
                        }
                    })
                })
                .collect()
        });

        let mut outcome = SweepOutcome::default();
        for result in results {
            match result {
                Ok(record) => outcome.records.push(record),
                Err(failure) => outcome.failures.push(failure),
            }
        }

        info!(
            succeeded = outcome.records.len(),
            failed = outcome.failures.len(),
            "sweep finished"
        );
        Ok(outcome)
    }

    fn run_unit(
        &self,
        series: &PriceSeries,
        combination: &ParameterCombination,
    ) -> Result<SweepRecord, SweepError> {
        let params = combination.resolve().map_err(|source| SweepError::Parameters {
            test_id: combination.test_id(),
            source,
        })?;

        let log_trades = self.trade_log.is_some() || self.keep_trades;
        let output = simulate(series, &params, log_trades);
        debug!(
            test_id = combination.test_id(),
            final_balance = output.final_balance,
            trades = output.counters.total_trades,
            "unit finished"
        );

        if let Some(writer) = &self.trade_log {
            writer.append(combination.test_id(), &output.trades)?;
        }

        let report = BacktestReport::from_output(combination.index, &output, series, &params);
        let trades = if self.keep_trades {
            Some(output.trades)
        } else {
            None
        };

        Ok(SweepRecord {
            index: combination.index,
            report,
            trades,
        })
    }
}

impl SweepFailure {
    //the configuration error behind a parameter failure
    pub fn config_error(&self) -> Option<&ConfigError> {
        match &self.error {
            SweepError::Parameters { source, .. } => Some(source),
            _ => None,
        }
    }
}
