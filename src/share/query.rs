use tracing::{debug, info};
use url::{form_urlencoded, Url};

use crate::{
    config::Config,
    error::Result,
    qf::{parse_amount, parse_contribution, CalculatorState, ContributionPolicy, Grant},
};

/// Query parameter repeated once per grant
pub const GRANT_PARAM: &str = "grant";
/// Query parameter carrying the match budget
pub const MATCH_PARAM: &str = "match";

/// The raw content of a shared query string, before defaults are applied
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SharedQuery {
    /// One entry per `grant` parameter; `None` when the query has none
    pub grants: Option<Vec<Vec<f64>>>,
    /// `None` when `match` is missing or empty
    pub match_budget: Option<f64>,
}

impl SharedQuery {
    /// Parse a query string. Accepts a leading `?`, a full URL, and raw or
    /// percent-encoded commas. Unknown parameters are ignored and malformed
    /// numbers become NaN.
    pub fn parse(query: &str, policy: ContributionPolicy) -> Self {
        let raw = match Url::parse(query) {
            Ok(url) => url.query().unwrap_or_default().to_string(),
            Err(_) => query.trim().trim_start_matches('?').to_string(),
        };

        let mut shared = SharedQuery::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                GRANT_PARAM => {
                    let contributions = if value.is_empty() {
                        Vec::new()
                    } else {
                        value
                            .split(',')
                            .map(|token| parse_contribution(token, policy))
                            .collect()
                    };
                    shared.grants.get_or_insert_with(Vec::new).push(contributions);
                }
                MATCH_PARAM if shared.match_budget.is_none() && !value.is_empty() => {
                    shared.match_budget = Some(parse_amount(&value));
                }
                MATCH_PARAM => {}
                other => debug!("Ignoring query parameter {:?}", other),
            }
        }
        shared
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_none() && self.match_budget.is_none()
    }

    fn into_state(self, default_grants: usize, default_match: f64, policy: ContributionPolicy) -> CalculatorState {
        let grants = match self.grants {
            Some(lists) => lists.into_iter().map(Grant::with_contributions).collect(),
            None => vec![Grant::new(); default_grants],
        };
        CalculatorState::new(grants, self.match_budget.unwrap_or(default_match)).with_policy(policy)
    }
}

fn format_contributions(contributions: &[f64]) -> String {
    contributions
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Encode the grant set and budget as `grant=...&grant=...&match=...`
pub fn encode_state_to_query(state: &CalculatorState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for grant in state.grants() {
        serializer.append_pair(GRANT_PARAM, &format_contributions(grant.contributions()));
    }
    serializer.append_pair(MATCH_PARAM, &state.match_budget().to_string());
    serializer.finish()
}

/// Rebuild a state from a query string. Missing grants decode to an empty
/// set and a missing budget to zero; matches are derived before returning.
pub fn decode_state_from_query(query: &str) -> CalculatorState {
    let shared = SharedQuery::parse(query, ContributionPolicy::Propagate);
    shared.into_state(0, 0.0, ContributionPolicy::Propagate)
}

/// Restore the state carried by a query, falling back to the configured
/// defaults for whatever the query does not specify
pub fn restore_or_default(query: Option<&str>, config: &Config) -> CalculatorState {
    let policy = config.contribution_policy();
    let shared = query
        .map(|q| SharedQuery::parse(q, policy))
        .unwrap_or_default();

    if shared.is_empty() {
        debug!("No shared state in query, starting from defaults");
    } else {
        info!(
            "Restored {} grants from shared query",
            shared.grants.as_ref().map_or(0, Vec::len)
        );
    }

    shared.into_state(
        config.calculator.default_grants,
        config.calculator.default_match,
        policy,
    )
}

/// Build a shareable link: `base` with its query replaced by the encoded state
pub fn share_url(base: &str, state: &CalculatorState) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.set_query(Some(&encode_state_to_query(state)));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution_lists(state: &CalculatorState) -> Vec<Vec<f64>> {
        state.grants().iter().map(|g| g.contributions().to_vec()).collect()
    }

    #[test]
    fn test_encode_format() {
        let state = CalculatorState::from_contributions(vec![vec![1.0, 2.5], vec![]], 1000.0);
        assert_eq!(encode_state_to_query(&state), "grant=1%2C2.5&grant=&match=1000");
    }

    #[test]
    fn test_round_trip() {
        let state = CalculatorState::with_empty_grants(4, 1000.0)
            .update_contributions(0, &["0.1", "3", "3"])
            .update_contributions(2, &["123456.789", "1e-3"])
            .remove_grant(3)
            .set_match_budget(2500.25);

        let decoded = decode_state_from_query(&encode_state_to_query(&state));
        assert_eq!(contribution_lists(&decoded), contribution_lists(&state));
        assert_eq!(decoded.match_budget(), 2500.25);
        assert!(decoded.grants()[1].is_empty());
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_empty_set_round_trip() {
        let state = CalculatorState::with_empty_grants(0, 42.0);
        let query = encode_state_to_query(&state);
        assert_eq!(query, "match=42");

        let decoded = decode_state_from_query(&query);
        assert!(decoded.is_empty());
        assert_eq!(decoded.match_budget(), 42.0);
    }

    #[test]
    fn test_decode_raw_commas_and_leading_question_mark() {
        let state = decode_state_from_query("?grant=100&grant=25,25,25,25&match=500");
        assert_eq!(contribution_lists(&state), vec![vec![100.0], vec![25.0; 4]]);
        assert!((state.grants()[0].match_amount() - 100.0).abs() < 1e-9);
        assert!((state.grants()[1].match_amount() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_decode_full_url() {
        let state = decode_state_from_query("https://wtfisqf.com/?grant=4&grant=&match=10");
        assert_eq!(contribution_lists(&state), vec![vec![4.0], vec![]]);
        assert_eq!(state.match_budget(), 10.0);
    }

    #[test]
    fn test_decode_garbage() {
        let state = decode_state_from_query("%%%not a query at all");
        assert!(state.is_empty());
        assert_eq!(state.match_budget(), 0.0);

        let state = decode_state_from_query("");
        assert!(state.is_empty());
        assert_eq!(state.match_budget(), 0.0);
    }

    #[test]
    fn test_decode_partially_malformed() {
        let state = decode_state_from_query("grant=1,x&grant=1&grant=4&match=100");
        assert_eq!(state.len(), 3);
        assert!(state.grants()[0].funding_amount().is_nan());
        assert!(state.grants()[0].match_amount().is_nan());
        assert!((state.grants()[1].match_amount() - 20.0).abs() < 1e-9);
        assert!((state.grants()[2].match_amount() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_decode_uses_first_match_value() {
        let state = decode_state_from_query("match=&match=5&match=7");
        assert_eq!(state.match_budget(), 5.0);
    }

    #[test]
    fn test_restore_falls_back_to_config_defaults() {
        let config = Config::default();

        let fresh = restore_or_default(None, &config);
        assert_eq!(fresh.len(), 4);
        assert_eq!(fresh.match_budget(), 1000.0);

        let unrelated = restore_or_default(Some("utm_source=x"), &config);
        assert_eq!(unrelated.len(), 4);

        let grants_only = restore_or_default(Some("grant=1"), &config);
        assert_eq!(grants_only.len(), 1);
        assert_eq!(grants_only.match_budget(), 1000.0);
    }

    #[test]
    fn test_restore_applies_negative_policy() {
        let mut config = Config::default();
        config.calculator.reject_negative = true;

        let state = restore_or_default(Some("grant=-4,9&match=10"), &config);
        assert!(state.grants()[0].funding_amount().is_nan());
        assert_eq!(state.policy(), ContributionPolicy::Reject);
    }

    #[test]
    fn test_share_url() {
        let state = CalculatorState::from_contributions(vec![vec![5.0]], 100.0);
        let url = share_url("https://wtfisqf.com/?old=1", &state).unwrap();
        assert_eq!(url.as_str(), "https://wtfisqf.com/?grant=5&match=100");

        let decoded = decode_state_from_query(url.as_str());
        assert_eq!(contribution_lists(&decoded), vec![vec![5.0]]);

        assert!(share_url("not a url", &state).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_query_round_trip(
                lists in prop::collection::vec(prop::collection::vec(0.0f64..1e9, 0..6), 0..10),
                budget in 0.0f64..1e9,
            ) {
                let state = CalculatorState::from_contributions(lists.clone(), budget);
                let decoded = decode_state_from_query(&encode_state_to_query(&state));
                prop_assert_eq!(contribution_lists(&decoded), lists);
                prop_assert_eq!(decoded.match_budget(), budget);
            }
        }
    }
}
