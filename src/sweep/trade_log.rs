use crate::engine::TradeRecord;
use crate::sweep::SweepError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

//formats one trade as a semicolon delimited NAME:value line
pub fn format_line(test_id: usize, trade: &TradeRecord) -> String {
    format!(
        "ID:{};ENTRY:{};EXIT:{};E_PRICE:{:.4};X_PRICE:{:.4};PROFIT:{:.4};E_REASON:{};X_REASON:{};FEAR_ENTRY:{}",
        test_id,
        trade.entry_time_str(),
        trade.exit_time_str(),
        trade.entry_price,
        trade.exit_price,
        trade.profit,
        trade.entry_reason.code(),
        trade.exit_reason.code(),
        trade.fear_index_at_entry,
    )
}

//append only trade log shared by every sweep worker
//the mutex only serializes writers inside this process, two processes
//appending to the same path can interleave their batches
#[derive(Debug)]
pub struct TradeLogWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl TradeLogWriter {
    //opens the log in append mode, creating it when missing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SweepError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SweepError::TradeLog {
                path: path.clone(),
                source,
            })?;

        Ok(TradeLogWriter {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    //appends every trade of one run as a single batch
    //lines are formatted before the lock is taken
    pub fn append(&self, test_id: usize, trades: &[TradeRecord]) -> Result<(), SweepError> {
        if trades.is_empty() {
            return Ok(());
        }

        let mut batch = String::new();
        for trade in trades {
            batch.push_str(&format_line(test_id, trade));
            batch.push('\n');
        }

        let mut file = self.file.lock().map_err(|_| SweepError::PoisonedLog)?;
        file.write_all(batch.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| SweepError::TradeLog {
                path: self.path.clone(),
                source,
            })
    }
}
