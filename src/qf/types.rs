use serde::Serialize;

/// A single contribution from one supporter to one grant
pub type Contribution = f64;

/// A grant and the values derived from its contributions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grant {
    contributions: Vec<Contribution>,
    funding_amount: f64,
    match_amount: f64,
}

impl Grant {
    /// Create a grant with no contributions
    pub fn new() -> Self {
        Self::with_contributions(Vec::new())
    }

    /// Create a grant and derive its funding amount. The match amount stays at
    /// zero until the owning state re-derives matches.
    pub fn with_contributions(contributions: Vec<Contribution>) -> Self {
        let funding_amount = contributions.iter().sum();
        Self {
            contributions,
            funding_amount,
            match_amount: 0.0,
        }
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Sum of all contributions (NaN if any contribution is NaN)
    pub fn funding_amount(&self) -> f64 {
        self.funding_amount
    }

    pub fn match_amount(&self) -> f64 {
        self.match_amount
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// Whether every derived value of this grant is a usable number
    pub fn is_valid(&self) -> bool {
        self.funding_amount.is_finite() && !self.match_amount.is_nan()
    }

    pub(crate) fn with_match(mut self, match_amount: f64) -> Self {
        self.match_amount = match_amount;
        self
    }
}

impl Default for Grant {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grant_is_empty() {
        let grant = Grant::new();
        assert!(grant.is_empty());
        assert_eq!(grant.funding_amount(), 0.0);
        assert_eq!(grant.match_amount(), 0.0);
        assert!(grant.is_valid());
    }

    #[test]
    fn test_funding_amount_is_sum_of_contributions() {
        let grant = Grant::with_contributions(vec![1.5, 2.5, 2.5]);
        assert_eq!(grant.funding_amount(), 6.5);
        assert_eq!(grant.contributions(), &[1.5, 2.5, 2.5]);
    }

    #[test]
    fn test_nan_contribution_invalidates_funding() {
        let grant = Grant::with_contributions(vec![1.0, f64::NAN]);
        assert!(grant.funding_amount().is_nan());
        assert!(!grant.is_valid());
    }
}
