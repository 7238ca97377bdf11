use crate::{
    convert_card, convert_cards, sanitize_cache_component, CardEnvelope, ImageStore, RawArchetype,
    RawCardSet, ResponseCache,
};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use ygodraft_core::{Card, CardSet};

pub const DEFAULT_BASE_URL: &str = "https://db.ygoprodeck.com/api/v7";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://images.ygoprodeck.com/images";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: Box<ureq::Error>,
    },
    #[error("response from {url} did not parse: {source}")]
    Parse {
        url: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub image_base_url: String,
    pub cache_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            cache_dir: default_cache_dir(),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Cache root: `YGODRAFT_CACHE_DIR` when set, the platform cache directory
/// otherwise, a local `cache/` as the last resort.
pub fn default_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("YGODRAFT_CACHE_DIR") {
        return PathBuf::from(dir);
    }
    directories::ProjectDirs::from("", "", "ygodraft")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("cache"))
}

fn cache_key(endpoint: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return endpoint.to_string();
    }
    let pairs: Vec<String> = query
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    format!("{endpoint}?{}", pairs.join("&"))
}

/// Synchronous client for the remote card database. Every JSON request runs
/// through the response cache; art goes through the image stores.
pub struct YgoClient {
    agent: ureq::Agent,
    config: ApiConfig,
    cache: ResponseCache,
    card_art: ImageStore,
    set_art: ImageStore,
}

impl YgoClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        let cache = ResponseCache::open(config.cache_dir.join("responses.json"))?;
        let card_art = ImageStore::open(config.cache_dir.join("images").join("cards"))?;
        let set_art = ImageStore::open(config.cache_dir.join("images").join("sets"))?;
        Ok(Self {
            agent,
            config,
            cache,
            card_art,
            set_art,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// All card sets with a release date and at least 10 cards, sorted by
    /// name. Failure here is unrecoverable for a draft.
    pub fn card_sets(&mut self) -> Result<Vec<CardSet>, ApiError> {
        let endpoint = format!("{}/cardsets.php", self.config.base_url);
        let raw: Vec<RawCardSet> = self.get_json(&endpoint, &[])?;
        let mut sets: Vec<CardSet> = raw
            .into_iter()
            .filter_map(RawCardSet::into_set)
            .filter(|set| set.card_count >= 10)
            .collect();
        sets.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = sets.len(), "fetched card sets");
        Ok(sets)
    }

    /// Cards contained in `set`, with per-set rarities resolved. Failure is
    /// unrecoverable for a draft.
    pub fn set_cards(&mut self, set: &CardSet) -> Result<Vec<Card>, ApiError> {
        let endpoint = format!("{}/cardinfo.php", self.config.base_url);
        let envelope: CardEnvelope = self.get_json(&endpoint, &[("cardset", &set.name)])?;
        Ok(convert_cards(envelope.data, Some(set)))
    }

    /// The archetype name list, used to classify association material.
    pub fn archetypes(&mut self) -> Result<Vec<String>, ApiError> {
        let endpoint = format!("{}/archetypes.php", self.config.base_url);
        let raw: Vec<RawArchetype> = self.get_json(&endpoint, &[])?;
        Ok(raw.into_iter().map(|entry| entry.archetype_name).collect())
    }

    /// Exact-name lookup. Soft failure: logs and returns `None` so callers
    /// skip the addition.
    pub fn card_by_name(&mut self, name: &str, set: Option<&CardSet>) -> Option<Card> {
        let endpoint = format!("{}/cardinfo.php", self.config.base_url);
        let lowered = name.to_lowercase();
        let result: Result<CardEnvelope, ApiError> =
            self.get_json(&endpoint, &[("name", &lowered)]);
        match result {
            Ok(envelope) => envelope
                .data
                .into_iter()
                .next()
                .and_then(|raw| convert_card(raw, set)),
            Err(err) => {
                warn!(name, error = %err, "card lookup failed, skipping");
                None
            }
        }
    }

    /// Cards matching a subtype query (archetype, race, attribute...). Soft
    /// failure: logs and returns an empty list.
    pub fn cards_by_subtype(&mut self, subtype: &str, value: &str) -> Vec<Card> {
        let endpoint = format!("{}/cardinfo.php", self.config.base_url);
        let result: Result<CardEnvelope, ApiError> = self.get_json(&endpoint, &[(subtype, value)]);
        match result {
            Ok(envelope) => convert_cards(envelope.data, None),
            Err(err) => {
                warn!(subtype, value, error = %err, "subtype query failed, skipping");
                Vec::new()
            }
        }
    }

    /// Card art by id, disk cache first. Soft failure: callers render
    /// without art.
    pub fn card_art(&mut self, card_id: u32) -> Option<PathBuf> {
        let key = card_id.to_string();
        if let Some(path) = self.card_art.cached(&key) {
            return Some(path);
        }
        let url = format!("{}/cards/{card_id}.jpg", self.config.image_base_url);
        match self.get_bytes(&url) {
            Ok(bytes) => self.card_art.store(&key, &bytes).ok(),
            Err(err) => {
                warn!(card_id, error = %err, "card art fetch failed, using none");
                None
            }
        }
    }

    /// Set art by set code, disk cache first. Soft failure.
    pub fn set_art(&mut self, set_code: &str) -> Option<PathBuf> {
        let key = sanitize_cache_component(set_code);
        if let Some(path) = self.set_art.cached(&key) {
            return Some(path);
        }
        let url = format!("{}/sets/{set_code}.jpg", self.config.image_base_url);
        match self.get_bytes(&url) {
            Ok(bytes) => self.set_art.store(&key, &bytes).ok(),
            Err(err) => {
                warn!(set_code, error = %err, "set art fetch failed, using none");
                None
            }
        }
    }

    fn get_json<T: DeserializeOwned>(
        &mut self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let key = cache_key(endpoint, query);
        let body = match self.cache.get(&key) {
            Some(body) => body.to_string(),
            None => {
                let body = self.fetch(endpoint, query)?;
                self.cache.put(key.clone(), body.clone())?;
                body
            }
        };
        serde_json::from_str(&body).map_err(|source| ApiError::Parse { url: key, source })
    }

    fn fetch(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut request = self.agent.get(endpoint);
        for (key, value) in query {
            request = request.query(key, value);
        }
        match request.call() {
            Ok(response) => {
                let mut body = String::new();
                response.into_reader().read_to_string(&mut body)?;
                Ok(body)
            }
            Err(ureq::Error::Status(status, _)) => Err(ApiError::Status {
                status,
                url: cache_key(endpoint, query),
            }),
            Err(err) => Err(ApiError::Transport {
                url: cache_key(endpoint, query),
                source: Box::new(err),
            }),
        }
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        match self.agent.get(url).call() {
            Ok(response) => {
                let mut bytes = Vec::new();
                response.into_reader().read_to_end(&mut bytes)?;
                Ok(bytes)
            }
            Err(ureq::Error::Status(status, _)) => Err(ApiError::Status {
                status,
                url: url.to_string(),
            }),
            Err(err) => Err(ApiError::Transport {
                url: url.to_string(),
                source: Box::new(err),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn cache_keys_mirror_the_request() {
        assert_eq!(
            cache_key("https://db/api/cardsets.php", &[]),
            "https://db/api/cardsets.php"
        );
        assert_eq!(
            cache_key(
                "https://db/api/cardinfo.php",
                &[("cardset", "Spell Ruler"), ("level", "4")]
            ),
            "https://db/api/cardinfo.php?cardset=Spell Ruler&level=4"
        );
    }

    #[test]
    fn cached_responses_answer_without_network() {
        let dir = tempdir().expect("tempdir");
        let config = ApiConfig {
            // Unroutable: any real request would error out immediately.
            base_url: "http://127.0.0.1:1/api/v7".to_string(),
            image_base_url: "http://127.0.0.1:1/images".to_string(),
            cache_dir: dir.path().to_path_buf(),
            timeout: Duration::from_millis(50),
        };
        let mut client = YgoClient::new(config).expect("client");

        let key = cache_key(
            &format!("{}/cardsets.php", client.config().base_url),
            &[],
        );
        client
            .cache
            .put(
                key,
                r#"[{"set_name": "Spell Ruler", "set_code": "SRL",
                     "tcg_date": "2002-09-16", "num_of_cards": 104},
                    {"set_name": "Tiny Promo", "set_code": "TP",
                     "tcg_date": "2003-01-01", "num_of_cards": 4}]"#
                    .to_string(),
            )
            .expect("seed cache");

        let sets = client.card_sets().expect("sets from cache");
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "Spell Ruler");
    }

    #[test]
    fn soft_lookups_swallow_transport_errors() {
        let dir = tempdir().expect("tempdir");
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1/api/v7".to_string(),
            image_base_url: "http://127.0.0.1:1/images".to_string(),
            cache_dir: dir.path().to_path_buf(),
            timeout: Duration::from_millis(50),
        };
        let mut client = YgoClient::new(config).expect("client");
        assert!(client.card_by_name("Polymerization", None).is_none());
        assert!(client.cards_by_subtype("archetype", "Dark Magician").is_empty());
        assert!(client.card_art(46986414).is_none());
    }
}
