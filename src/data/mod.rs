pub mod align;
pub mod candle;
pub mod loader;
pub mod series;

pub use align::align;
pub use candle::{parse_timestamp, Candle, FearReading};
pub use loader::{load_candles, load_fear_index};
pub use series::{PriceSeries, SeriesError, NO_FEAR_DATA};
