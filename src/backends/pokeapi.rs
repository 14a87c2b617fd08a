//! PokeAPI catalog adapter implementation.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::state::NotKeyed;
use governor::{Quota, RateLimiter};
use log::debug;
use serde_json::Value;

use crate::backends::{CatalogBackendAdapter, CatalogError, CatalogRecord};
use crate::config::CatalogConfig;

const RATE_LIMIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// PokeAPI adapter backed by `ureq`.
pub struct PokeApiAdapter {
    http_client: ureq::Agent,
    base_url: String,
    resource_path: String,
    user_agent: String,
    request_limiter:
        RateLimiter<NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>,
}

impl PokeApiAdapter {
    /// Creates a new adapter from catalog settings.
    pub fn new(config: &CatalogConfig) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(config.connect_timeout_ms))
            .timeout_read(Duration::from_millis(config.read_timeout_ms))
            .timeout_write(Duration::from_millis(config.read_timeout_ms))
            .build();
        let requests_per_second =
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            http_client,
            base_url: Self::endpoint_base(&config.base_url),
            resource_path: config.resource_path.trim().trim_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            request_limiter: RateLimiter::direct(
                Quota::per_second(requests_per_second).allow_burst(NonZeroU32::MIN),
            ),
        }
    }

    fn endpoint_base(endpoint: &str) -> String {
        endpoint.trim().trim_end_matches('/').to_string()
    }

    fn record_url(&self, id: u32) -> String {
        format!("{}/{}/{}", self.base_url, self.resource_path, id)
    }

    fn wait_for_rate_limit_slot(&self) {
        while self.request_limiter.check().is_err() {
            std::thread::sleep(RATE_LIMIT_POLL_INTERVAL);
        }
    }

    fn request_json(&self, id: u32) -> Result<Value, CatalogError> {
        self.wait_for_rate_limit_slot();
        let url = self.record_url(id);
        debug!("PokeApiAdapter: GET {}", url);
        let response = self
            .http_client
            .get(&url)
            .set("User-Agent", &self.user_agent)
            .set("Accept", "application/json")
            .call()
            .map_err(|error| match error {
                ureq::Error::Status(status, _) => CatalogError::Status { id, status },
                ureq::Error::Transport(transport) => CatalogError::Transport {
                    id,
                    reason: transport.to_string(),
                },
            })?;
        response
            .into_json::<Value>()
            .map_err(|err| CatalogError::Malformed {
                id,
                reason: format!("response body is not JSON: {err}"),
            })
    }

    fn required_u32(payload: &Value, key: &str) -> Result<u32, String> {
        payload
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|value| u32::try_from(value).ok())
            .ok_or_else(|| format!("missing or invalid '{key}'"))
    }

    /// Extracts a record from one `pokemon/{id}` payload.
    pub(crate) fn parse_record(payload: &Value) -> Result<CatalogRecord, String> {
        let id = Self::required_u32(payload, "id")?;
        let name = payload
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| "missing or invalid 'name'".to_string())?
            .to_string();
        let height = Self::required_u32(payload, "height")?;
        let weight = Self::required_u32(payload, "weight")?;
        let category_tags = payload
            .get("types")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        entry
                            .get("type")
                            .and_then(|value| value.get("name"))
                            .and_then(Value::as_str)
                            .map(ToOwned::to_owned)
                    })
                    .collect()
            })
            .unwrap_or_default();
        let image_url = payload
            .get("sprites")
            .and_then(|value| value.get("front_default"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned);
        Ok(CatalogRecord {
            id,
            name,
            category_tags,
            image_url,
            height,
            weight,
        })
    }
}

impl CatalogBackendAdapter for PokeApiAdapter {
    fn fetch_record(&self, id: u32) -> Result<CatalogRecord, CatalogError> {
        let payload = self.request_json(id)?;
        Self::parse_record(&payload).map_err(|reason| CatalogError::Malformed { id, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::PokeApiAdapter;
    use crate::config::CatalogConfig;
    use serde_json::json;

    fn pikachu_payload() -> serde_json::Value {
        json!({
            "id": 25,
            "name": "pikachu",
            "height": 4,
            "weight": 60,
            "sprites": {
                "front_default": "https://img.example.com/pokemon/25.png",
                "back_default": null
            },
            "types": [
                { "slot": 1, "type": { "name": "electric", "url": "https://x/type/13/" } }
            ]
        })
    }

    #[test]
    fn test_parse_record_extracts_all_fields() {
        let record =
            PokeApiAdapter::parse_record(&pikachu_payload()).expect("payload should parse");
        assert_eq!(record.id, 25);
        assert_eq!(record.name, "pikachu");
        assert_eq!(record.category_tags, vec!["electric".to_string()]);
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://img.example.com/pokemon/25.png")
        );
        assert_eq!(record.height, 4);
        assert_eq!(record.weight, 60);
    }

    #[test]
    fn test_parse_record_keeps_tag_order_and_skips_broken_entries() {
        let payload = json!({
            "id": 6,
            "name": "charizard",
            "height": 17,
            "weight": 905,
            "sprites": { "front_default": null },
            "types": [
                { "slot": 1, "type": { "name": "fire" } },
                { "slot": 2 },
                { "slot": 3, "type": { "name": "flying" } }
            ]
        });
        let record = PokeApiAdapter::parse_record(&payload).expect("payload should parse");
        assert_eq!(
            record.category_tags,
            vec!["fire".to_string(), "flying".to_string()]
        );
        assert_eq!(record.image_url, None);
    }

    #[test]
    fn test_parse_record_rejects_missing_required_fields() {
        let mut payload = pikachu_payload();
        payload
            .as_object_mut()
            .expect("fixture should be an object")
            .remove("weight");
        let error = PokeApiAdapter::parse_record(&payload).expect_err("weight is required");
        assert!(error.contains("weight"));

        let error = PokeApiAdapter::parse_record(&json!({ "id": "25", "name": "pikachu" }))
            .expect_err("string ids are not accepted");
        assert!(error.contains("'id'"));
    }

    #[test]
    fn test_record_url_normalizes_slashes() {
        let config = CatalogConfig {
            base_url: " https://pokeapi.example.com/api/v2/ ".to_string(),
            resource_path: "/pokemon/".to_string(),
            ..CatalogConfig::default()
        };
        let adapter = PokeApiAdapter::new(&config);
        assert_eq!(
            adapter.record_url(132),
            "https://pokeapi.example.com/api/v2/pokemon/132"
        );
    }
}
