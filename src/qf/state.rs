use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::engine::{MatchEngine, MatchSummary};
use super::parse::{parse_contributions, ContributionPolicy};
use super::types::Grant;

/// The calculator's complete state: an ordered grant set and the match budget.
///
/// Every transition consumes the state and returns a new one with all derived
/// values (funding amounts and matches) recomputed over the full grant set,
/// so a value of this type is always internally consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StateSnapshot")]
pub struct CalculatorState {
    grants: Vec<Grant>,
    match_budget: f64,
    #[serde(skip)]
    policy: ContributionPolicy,
}

/// The inputs of a saved state. Derived amounts in the source are ignored
/// and recomputed when the snapshot becomes a `CalculatorState`.
#[derive(Debug, Clone, Deserialize)]
pub struct StateSnapshot {
    pub grants: Vec<GrantSnapshot>,
    pub match_budget: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantSnapshot {
    #[serde(default)]
    pub contributions: Vec<f64>,
}

impl From<StateSnapshot> for CalculatorState {
    fn from(snapshot: StateSnapshot) -> Self {
        let lists = snapshot
            .grants
            .into_iter()
            .map(|grant| grant.contributions)
            .collect();
        Self::from_contributions(lists, snapshot.match_budget)
    }
}

impl CalculatorState {
    pub fn new(grants: Vec<Grant>, match_budget: f64) -> Self {
        Self::derive(grants, match_budget, ContributionPolicy::default())
    }

    /// A state holding `grant_count` empty grants
    pub fn with_empty_grants(grant_count: usize, match_budget: f64) -> Self {
        Self::new(vec![Grant::new(); grant_count], match_budget)
    }

    /// Build a state from raw contribution lists
    pub fn from_contributions(lists: Vec<Vec<f64>>, match_budget: f64) -> Self {
        Self::new(lists.into_iter().map(Grant::with_contributions).collect(), match_budget)
    }

    /// Parse future contribution updates with the given policy
    pub fn with_policy(mut self, policy: ContributionPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn derive(grants: Vec<Grant>, match_budget: f64, policy: ContributionPolicy) -> Self {
        let matches = MatchEngine::compute_matches(&grants, match_budget);
        let grants = grants
            .into_iter()
            .zip(matches)
            .map(|(grant, match_amount)| grant.with_match(match_amount))
            .collect();

        Self {
            grants,
            match_budget,
            policy,
        }
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn grant(&self, index: usize) -> Option<&Grant> {
        self.grants.get(index)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn match_budget(&self) -> f64 {
        self.match_budget
    }

    pub fn policy(&self) -> ContributionPolicy {
        self.policy
    }

    pub fn summary(&self) -> MatchSummary {
        MatchEngine::summarize(&self.grants, self.match_budget)
    }

    /// Append an empty grant
    pub fn add_grant(self) -> Self {
        let mut grants = self.grants;
        grants.push(Grant::new());
        debug!("Added grant #{}", grants.len());
        Self::derive(grants, self.match_budget, self.policy)
    }

    /// Remove the grant at `index`; later grants move down one position.
    /// An out-of-range index leaves the state as it was.
    pub fn remove_grant(self, index: usize) -> Self {
        if index >= self.grants.len() {
            warn!("Ignoring removal of grant #{} ({} grants)", index + 1, self.grants.len());
            return self;
        }

        let grants: Vec<Grant> = if self.grants.len() > 1 {
            self.grants
                .into_iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, grant)| grant)
                .collect()
        } else {
            Vec::new()
        };
        debug!("Removed grant #{}, {} left", index + 1, grants.len());
        Self::derive(grants, self.match_budget, self.policy)
    }

    /// Replace the contributions of the grant at `index` with the parsed tokens.
    /// Tokens that are not numbers become NaN and invalidate only this grant.
    pub fn update_contributions<S: AsRef<str>>(self, index: usize, tokens: &[S]) -> Self {
        if index >= self.grants.len() {
            warn!("Ignoring update of grant #{} ({} grants)", index + 1, self.grants.len());
            return self;
        }

        let contributions = parse_contributions(tokens, self.policy);
        self.replace_contributions(index, contributions)
    }

    /// Replace the contributions of the grant at `index` with already-parsed amounts
    pub fn replace_contributions(self, index: usize, contributions: Vec<f64>) -> Self {
        if index >= self.grants.len() {
            warn!("Ignoring update of grant #{} ({} grants)", index + 1, self.grants.len());
            return self;
        }

        debug!("Grant #{} now has {} contributions", index + 1, contributions.len());
        let mut grants = self.grants;
        grants[index] = Grant::with_contributions(contributions);
        Self::derive(grants, self.match_budget, self.policy)
    }

    pub fn set_match_budget(self, match_budget: f64) -> Self {
        debug!("Match budget set to {}", match_budget);
        Self::derive(self.grants, match_budget, self.policy)
    }
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self::with_empty_grants(0, 0.0)
    }
}
