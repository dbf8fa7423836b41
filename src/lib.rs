//parameter sweep backtester for a fear index driven leveraged long strategy

pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod portfolio;
pub mod sweep;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigError, StrategyParams, SweepConfig, DISABLED_TRIGGER};
    pub use crate::data::{
        align, load_candles, load_fear_index, Candle, FearReading, PriceSeries, NO_FEAR_DATA,
    };
    pub use crate::engine::{
        simulate, Counters, EntryReason, ExitReason, KernelOutput, Regime, TradeRecord,
    };
    pub use crate::metrics::{
        print_top_table, rank_by_final_balance, write_json_report, write_trades_csv,
        BacktestReport, MonthlyPerformance,
    };
    pub use crate::portfolio::{Account, OpenPosition};
    pub use crate::sweep::{
        write_grid_file, ParameterCombination, SweepError, SweepOutcome, SweepRunner,
        TradeLogWriter,
    };
}
