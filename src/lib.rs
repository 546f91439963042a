pub mod cadence;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod output;
pub mod processing;
pub mod sensor;
pub mod signal_processing;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::CadenceConfig;
pub use error::{CadenceError, Result};
pub use processing::{ActivityState, CadenceProcessor, ResetMode, TickOutput};
