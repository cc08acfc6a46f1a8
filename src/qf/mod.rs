pub mod engine;
pub mod parse;
pub mod state;
pub mod types;

pub use engine::{GrantSummary, MatchEngine, MatchSummary};
pub use parse::{parse_amount, parse_contribution, split_tokens, ContributionPolicy};
pub use state::{CalculatorState, GrantSnapshot, StateSnapshot};
pub use types::{Contribution, Grant};
