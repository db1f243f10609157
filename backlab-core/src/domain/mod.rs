//! Domain types for BackLab

pub mod account;
pub mod bar;
pub mod fill;
pub mod frame;
pub mod signal;
pub mod trade;

pub use account::AccountState;
pub use bar::Bar;
pub use fill::{Fill, TradeSide};
pub use frame::{FrameError, SeriesFrame};
pub use signal::{Signal, SignalSeries};
pub use trade::RoundTrip;
