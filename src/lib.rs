pub mod config;
pub mod error;
pub mod qf;
pub mod report;
pub mod session;
pub mod share;
pub mod utils;

pub use config::Config;
pub use error::{CalculatorError, Result};
pub use qf::{CalculatorState, Grant, MatchEngine};
