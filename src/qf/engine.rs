use serde::Serialize;

use super::types::{Contribution, Grant};

/// Quadratic funding match calculation.
///
/// A grant's weight is the square of the sum of the square roots of its
/// contributions. The match budget is split across grants proportionally to
/// their weights, so broad support from many small contributors earns more
/// matching than one large contribution of the same total.
pub struct MatchEngine;

impl MatchEngine {
    /// `Σ sqrt(c)` over a list of contributions
    fn root_sum(contributions: &[Contribution]) -> f64 {
        contributions.iter().map(|c| c.sqrt()).sum()
    }

    /// `(Σ sqrt(c))^2` over a list of contributions
    pub fn weight(contributions: &[Contribution]) -> f64 {
        let root_sum = Self::root_sum(contributions);
        root_sum * root_sum
    }

    /// Sum of the weights that can take part in the split. May overflow to
    /// infinity for huge contributions; `compute_matches` does not use it.
    pub fn total_weight(grants: &[Grant]) -> f64 {
        grants
            .iter()
            .map(|grant| Self::weight(grant.contributions()))
            .filter(|weight| weight.is_finite())
            .sum()
    }

    /// Match amount for every grant, in input order.
    ///
    /// Grants whose root sum is not a finite number (NaN from bad input or a
    /// negative contribution) get a NaN match and are left out of the total,
    /// so the remaining grants still share the whole budget. When the total
    /// weight is zero every valid grant gets zero.
    ///
    /// Root sums are scaled by the largest one before squaring, so weights
    /// stay in `[0, 1]` and their total cannot overflow.
    pub fn compute_matches(grants: &[Grant], match_budget: f64) -> Vec<f64> {
        let roots: Vec<f64> = grants
            .iter()
            .map(|grant| Self::root_sum(grant.contributions()))
            .collect();

        let largest = roots
            .iter()
            .copied()
            .filter(|r| r.is_finite())
            .fold(0.0, f64::max);

        if largest == 0.0 {
            return roots
                .iter()
                .map(|r| if r.is_finite() { 0.0 } else { f64::NAN })
                .collect();
        }

        let scaled: Vec<Option<f64>> = roots
            .iter()
            .map(|r| r.is_finite().then(|| (r / largest).powi(2)))
            .collect();
        let total: f64 = scaled.iter().flatten().sum();

        scaled
            .iter()
            .map(|s| s.map_or(f64::NAN, |s| s / total * match_budget))
            .collect()
    }

    /// Per-grant breakdown plus set totals, for reporting
    pub fn summarize(grants: &[Grant], match_budget: f64) -> MatchSummary {
        let matches = Self::compute_matches(grants, match_budget);

        let grants: Vec<GrantSummary> = grants
            .iter()
            .zip(matches)
            .enumerate()
            .map(|(index, (grant, match_amount))| {
                let funding_amount = grant.funding_amount();
                let match_multiplier = if funding_amount > 0.0 && match_amount.is_finite() {
                    Some(match_amount / funding_amount)
                } else {
                    None
                };
                GrantSummary {
                    number: index + 1,
                    contributors: grant.contributions().len(),
                    weight: Self::weight(grant.contributions()),
                    funding_amount,
                    match_amount,
                    match_multiplier,
                }
            })
            .collect();

        let total_funding = grants
            .iter()
            .map(|g| g.funding_amount)
            .filter(|f| f.is_finite())
            .sum();
        let total_matched = grants
            .iter()
            .map(|g| g.match_amount)
            .filter(|m| m.is_finite())
            .sum();
        let invalid_grants = grants
            .iter()
            .filter(|g| !g.funding_amount.is_finite() || g.match_amount.is_nan())
            .count();

        MatchSummary {
            match_budget,
            total_funding,
            total_matched,
            invalid_grants,
            grants,
        }
    }
}

/// Summary of one grant's position in the match
#[derive(Debug, Clone, Serialize)]
pub struct GrantSummary {
    /// 1-based display number
    pub number: usize,
    pub contributors: usize,
    pub weight: f64,
    pub funding_amount: f64,
    pub match_amount: f64,
    /// Matching dollars per contributed dollar
    pub match_multiplier: Option<f64>,
}

/// Summary of a whole match calculation
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub match_budget: f64,
    /// Funding across grants with valid amounts
    pub total_funding: f64,
    /// Matching actually handed out; equals the budget unless nothing has weight
    pub total_matched: f64,
    pub invalid_grants: usize,
    pub grants: Vec<GrantSummary>,
}
