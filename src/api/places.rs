//! Places lookup: find-place-from-text, then place details.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::business::{BusinessLookup, BusinessQuery, BusinessRecord, CandidatePolicy, PlaceCandidate};
use crate::error::PipelineError;
use crate::{logi, logok, logw};

pub const FIND_FIELDS: &str = "place_id,name,formatted_address";
pub const DETAIL_FIELDS: &str = "name,formatted_address,formatted_phone_number,website,rating,user_ratings_total,types,icon_background_color,opening_hours";

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    #[serde(default)]
    candidates: Vec<PlaceCandidate>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    result: Option<BusinessRecord>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
    policy: CandidatePolicy,
}

impl PlacesClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            policy: CandidatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CandidatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Candidate list for a free-text query. An empty list is not an error.
    pub async fn find_candidates(
        &self,
        query: &BusinessQuery,
    ) -> Result<Vec<PlaceCandidate>, PipelineError> {
        let search_text = query.search_text();
        let params = [
            ("input", search_text.as_str()),
            ("inputtype", "textquery"),
            ("fields", FIND_FIELDS),
            ("key", self.api_key.as_str()),
        ];
        let body: FindPlaceResponse = self.get_json("findplacefromtext", &params).await?;
        check_status("find place", body.status.as_deref(), body.error_message)?;
        Ok(body.candidates)
    }

    pub async fn place_details(&self, place_id: &str) -> Result<BusinessRecord, PipelineError> {
        let params = [
            ("key", self.api_key.as_str()),
            ("place_id", place_id),
            ("fields", DETAIL_FIELDS),
        ];
        let body: DetailsResponse = self.get_json("details", &params).await?;
        check_status("place details", body.status.as_deref(), body.error_message)?;
        body.result.ok_or_else(|| PipelineError::Provider {
            service: "places".to_string(),
            message: format!("details for {place_id} carried no result"),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PipelineError> {
        let url = format!("{}/{}/json", self.base_url, endpoint);
        let resp = self.client.get(&url).query(params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            logw(format!("places {} HTTP {}", endpoint, status.as_u16()));
            return Err(PipelineError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let raw = resp.text().await?;
        serde_json::from_str(&raw).map_err(|source| PipelineError::Decode {
            context: format!("places {endpoint}"),
            source,
        })
    }
}

/// `OK` and `ZERO_RESULTS` are normal; anything else (REQUEST_DENIED,
/// OVER_QUERY_LIMIT, ...) arrives with HTTP 200 but is a provider failure.
fn check_status(
    call: &str,
    status: Option<&str>,
    error_message: Option<String>,
) -> Result<(), PipelineError> {
    match status {
        None | Some("OK") | Some("ZERO_RESULTS") => Ok(()),
        Some(other) => Err(PipelineError::Provider {
            service: "places".to_string(),
            message: match error_message {
                Some(msg) => format!("{call}: {other}: {msg}"),
                None => format!("{call}: {other}"),
            },
        }),
    }
}

#[async_trait]
impl BusinessLookup for PlacesClient {
    async fn find_one(
        &self,
        query: &BusinessQuery,
    ) -> Result<Option<BusinessRecord>, PipelineError> {
        logi(format!("Finding business: {}", query.name));
        let candidates = self.find_candidates(query).await?;

        let Some(candidate) = self.policy.select(query, &candidates) else {
            logw("No matching place found.");
            return Ok(None);
        };
        tracing::debug!(
            place_id = %candidate.place_id,
            candidates = candidates.len(),
            policy = ?self.policy,
            "selected place candidate"
        );

        let record = self.place_details(&candidate.place_id).await?;
        logok(format!(
            "Resolved {} -> {} ({})",
            query.name, record.name, record.formatted_address
        ));
        Ok(Some(record))
    }
}
