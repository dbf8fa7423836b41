pub mod export;
pub mod monthly;
pub mod summary;

pub use export::{write_json_report, write_trades_csv};
pub use monthly::{MonthRow, MonthlyPerformance, TradeStats};
pub use summary::{print_top_table, rank_by_final_balance, BacktestReport};
