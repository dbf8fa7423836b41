pub mod exits;
pub mod kernel;
pub mod reasons;
pub mod regime;
pub mod signals;
pub mod state;
pub mod take_profit;
pub mod trade;

pub use kernel::{simulate, Kernel, KernelOutput};
pub use reasons::{EntryReason, ExitReason, ENTRY_CATEGORIES, HIT_SLOTS};
pub use regime::{Regime, RegimeProfile, RegimeProfiles, Trigger, REGIME_COUNT};
pub use state::{Counters, SimulationState};
pub use trade::TradeRecord;
