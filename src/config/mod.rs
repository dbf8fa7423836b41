pub mod error;
pub mod params;
pub mod sweep_config;

pub use error::ConfigError;
pub use params::{StrategyParams, DISABLED_TRIGGER, REQUIRED_KEYS};
pub use sweep_config::SweepConfig;
