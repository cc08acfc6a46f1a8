use tracing::{debug, warn};

use super::types::Contribution;

/// How contribution tokens are turned into amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContributionPolicy {
    /// Any parseable number is accepted. Negative values reach the engine and
    /// turn into NaN under the square root.
    #[default]
    Propagate,
    /// Negative values are treated like non-numeric input
    Reject,
}

/// Parse a free-form token into an amount. Anything that is not a finite
/// number (including `inf` and `nan`) yields NaN so the bad value stays
/// visible instead of aborting the update.
pub fn parse_amount(token: &str) -> f64 {
    let trimmed = token.trim().trim_start_matches('$');
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            debug!("Token {:?} is not a number", token);
            f64::NAN
        }
    }
}

/// Parse a single contribution token under the given policy
pub fn parse_contribution(token: &str, policy: ContributionPolicy) -> Contribution {
    let value = parse_amount(token);
    if policy == ContributionPolicy::Reject && value < 0.0 {
        warn!("Rejecting negative contribution {}", value);
        return f64::NAN;
    }
    value
}

pub fn parse_contributions<S: AsRef<str>>(tokens: &[S], policy: ContributionPolicy) -> Vec<Contribution> {
    tokens
        .iter()
        .map(|token| parse_contribution(token.as_ref(), policy))
        .collect()
}

/// Split a comma- or whitespace-separated list into tokens, dropping empty pieces
pub fn split_tokens(input: &str) -> Vec<&str> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|piece| !piece.is_empty())
        .collect()
}
