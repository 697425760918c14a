use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// Free-text name and address as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessQuery {
    pub name: String,
    pub address: String,
}

impl BusinessQuery {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    pub fn search_text(&self) -> String {
        format!("{}, {}", self.name, self.address)
    }
}

impl fmt::Display for BusinessQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.search_text())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// Place details as returned by the places provider. Field names follow the
/// provider's wire format so the record can be echoed into the creative brief.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(
        rename = "formatted_phone_number",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(
        rename = "user_ratings_total",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ratings_count: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
}

impl BusinessRecord {
    /// The website, if the provider returned a non-blank one.
    pub fn website_url(&self) -> Option<&str> {
        self.website
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

/// One row of a find-place response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceCandidate {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

/// How to pick one place out of the provider's candidate list.
///
/// The provider's order is not a relevance guarantee: a generic query will
/// happily resolve to the wrong business. `First` trusts the caller to pass a
/// near-exact name and address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CandidatePolicy {
    #[default]
    First,
    /// First candidate whose name equals the query name (ignoring case),
    /// otherwise the first candidate.
    ExactName,
}

impl CandidatePolicy {
    pub fn select<'a>(
        &self,
        query: &BusinessQuery,
        candidates: &'a [PlaceCandidate],
    ) -> Option<&'a PlaceCandidate> {
        let usable = |c: &&PlaceCandidate| !c.place_id.trim().is_empty();
        let first = candidates.first().filter(usable);
        match self {
            CandidatePolicy::First => first,
            CandidatePolicy::ExactName => {
                let wanted = query.name.trim().to_lowercase();
                candidates
                    .iter()
                    .filter(usable)
                    .find(|c| {
                        c.name
                            .as_deref()
                            .is_some_and(|n| n.trim().to_lowercase() == wanted)
                    })
                    .or(first)
            }
        }
    }
}

impl FromStr for CandidatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(CandidatePolicy::First),
            "exact-name" | "exact_name" => Ok(CandidatePolicy::ExactName),
            other => Err(format!(
                "unknown candidate policy {other:?} (expected first or exact-name)"
            )),
        }
    }
}

/// Resolves a query to a single business. `Ok(None)` means "not found" and is
/// not an error; transport and provider failures are.
#[async_trait]
pub trait BusinessLookup: Send + Sync {
    async fn find_one(&self, query: &BusinessQuery)
    -> Result<Option<BusinessRecord>, PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, name: &str) -> PlaceCandidate {
        PlaceCandidate {
            place_id: id.to_string(),
            name: Some(name.to_string()),
            formatted_address: None,
        }
    }

    #[test]
    fn search_text_joins_name_and_address() {
        let q = BusinessQuery::new("Hamilton's", "174 E Magnolia Ave, Auburn, AL 36830, USA");
        assert_eq!(
            q.search_text(),
            "Hamilton's, 174 E Magnolia Ave, Auburn, AL 36830, USA"
        );
    }

    #[test]
    fn first_policy_takes_head_of_list() {
        let q = BusinessQuery::new("Hamilton's", "Auburn");
        let list = vec![candidate("a", "Hamilton Dental"), candidate("b", "Hamilton's")];
        let picked = CandidatePolicy::First.select(&q, &list).expect("picked");
        assert_eq!(picked.place_id, "a");
    }

    #[test]
    fn exact_name_prefers_matching_candidate() {
        let q = BusinessQuery::new("hamilton's", "Auburn");
        let list = vec![candidate("a", "Hamilton Dental"), candidate("b", "Hamilton's")];
        let picked = CandidatePolicy::ExactName.select(&q, &list).expect("picked");
        assert_eq!(picked.place_id, "b");
    }

    #[test]
    fn exact_name_falls_back_to_first() {
        let q = BusinessQuery::new("Nowhere Diner", "Auburn");
        let list = vec![candidate("a", "Hamilton Dental"), candidate("b", "Hamilton's")];
        let picked = CandidatePolicy::ExactName.select(&q, &list).expect("picked");
        assert_eq!(picked.place_id, "a");
    }

    #[test]
    fn exact_name_match_without_id_falls_back_to_first() {
        let q = BusinessQuery::new("Hamilton's", "Auburn");
        let list = vec![candidate("a", "Hamilton Dental"), candidate(" ", "Hamilton's")];
        let picked = CandidatePolicy::ExactName.select(&q, &list).expect("picked");
        assert_eq!(picked.place_id, "a");
    }

    #[test]
    fn empty_list_or_blank_id_selects_nothing() {
        let q = BusinessQuery::new("x", "y");
        assert!(CandidatePolicy::First.select(&q, &[]).is_none());
        assert!(CandidatePolicy::First.select(&q, &[candidate("", "x")]).is_none());
    }

    #[test]
    fn record_reads_provider_field_names() {
        let record: BusinessRecord = serde_json::from_value(serde_json::json!({
            "name": "Hamilton's",
            "formatted_address": "174 E Magnolia Ave",
            "formatted_phone_number": "(334) 887-2005",
            "user_ratings_total": 1200,
            "rating": 4.5,
            "types": ["restaurant", "food"],
            "opening_hours": {"open_now": true, "weekday_text": ["Monday: 11 AM"]}
        }))
        .expect("record");

        assert_eq!(record.phone.as_deref(), Some("(334) 887-2005"));
        assert_eq!(record.ratings_count, Some(1200));
        assert!(record.website_url().is_none());
        assert_eq!(record.opening_hours.expect("hours").weekday_text.len(), 1);
    }

    #[test]
    fn blank_website_is_treated_as_absent() {
        let record = BusinessRecord {
            name: "x".into(),
            website: Some("  ".into()),
            ..Default::default()
        };
        assert!(record.website_url().is_none());
    }

    #[test]
    fn policy_parses_from_cli_spelling() {
        assert_eq!("first".parse::<CandidatePolicy>(), Ok(CandidatePolicy::First));
        assert_eq!(
            "exact-name".parse::<CandidatePolicy>(),
            Ok(CandidatePolicy::ExactName)
        );
        assert!("best".parse::<CandidatePolicy>().is_err());
    }
}
