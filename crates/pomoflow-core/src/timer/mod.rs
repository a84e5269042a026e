mod engine;
mod mode;
mod settings;
pub mod controller;
pub mod ticker;

pub use controller::{DispatchResult, TimerController};
pub use engine::{TimerEngine, TimerState};
pub use mode::TimerMode;
pub use settings::{duration_secs, TimerSettings};
pub use ticker::{SharedController, Ticker};
