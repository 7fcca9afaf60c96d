//! Known model configurations.
//!
//! The catalog is the single source of a model's display name, maximum
//! prompt length, and token limit. Raw provider model ids that have no entry
//! here are not usable by the engine.

use serde::{Deserialize, Serialize};

/// Model the engine falls back to when a request names none.
pub const FALLBACK_MODEL_ID: &str = "gpt-3.5-turbo";

/// A known model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpec {
    /// Provider-side identifier.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Maximum prompt length in characters accepted from a caller.
    pub max_length: u32,

    /// Context window in tokens.
    pub token_limit: u32,
}

impl ModelSpec {
    pub fn new(id: &str, name: &str, max_length: u32, token_limit: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            max_length,
            token_limit,
        }
    }
}

/// A caller's reference to a model. Only the id is authoritative; the other
/// fields are echoed back from client-side caches and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRef {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl ModelRef {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            max_length: None,
        }
    }
}

/// Ordered set of known models.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: Vec<ModelSpec>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The models every deployment knows about.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(ModelSpec::new("gpt-3.5-turbo", "GPT-3.5", 12_000, 4_000));
        catalog.insert(ModelSpec::new(
            "gpt-3.5-turbo-16k",
            "GPT-3.5 16K",
            48_000,
            16_000,
        ));
        catalog.insert(ModelSpec::new("gpt-4", "GPT-4", 24_000, 8_000));
        catalog.insert(ModelSpec::new("gpt-4-32k", "GPT-4 32K", 96_000, 32_000));
        catalog.insert(ModelSpec::new(
            "llama-2-7b-chat",
            "Llama 2 7B Chat",
            6_000,
            2_048,
        ));
        catalog
    }

    /// Add a model, replacing any entry with the same id in place.
    pub fn insert(&mut self, spec: ModelSpec) {
        match self.models.iter_mut().find(|m| m.id == spec.id) {
            Some(existing) => *existing = spec,
            None => self.models.push(spec),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Map raw provider ids to known models, dropping the ones with no
    /// entry. Provider order is kept.
    pub fn map_known<'a, I>(&self, raw_ids: I) -> Vec<ModelSpec>
    where
        I: IntoIterator<Item = &'a str>,
    {
        raw_ids
            .into_iter()
            .filter_map(|id| self.get(id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_fallback_and_small_model() {
        let catalog = ModelCatalog::builtin();
        assert!(catalog.contains(FALLBACK_MODEL_ID));
        assert_eq!(catalog.get("llama-2-7b-chat").unwrap().token_limit, 2_048);
    }

    #[test]
    fn insert_overrides_in_place() {
        let mut catalog = ModelCatalog::builtin();
        let before = catalog.len();
        catalog.insert(ModelSpec::new("gpt-4", "GPT-4 (pinned)", 10, 20));
        assert_eq!(catalog.len(), before);
        assert_eq!(catalog.get("gpt-4").unwrap().name, "GPT-4 (pinned)");
    }

    #[test]
    fn unknown_raw_ids_are_filtered() {
        let catalog = ModelCatalog::builtin();
        let known = catalog.map_known(["whisper-1", "gpt-4", "dall-e-3", "gpt-3.5-turbo"]);
        let ids: Vec<&str> = known.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["gpt-4", "gpt-3.5-turbo"]);
    }

    #[test]
    fn model_ref_accepts_client_shape() {
        let r: ModelRef =
            serde_json::from_str(r#"{"id":"gpt-4","name":"GPT-4","maxLength":24000}"#).unwrap();
        assert_eq!(r.id, "gpt-4");
        assert_eq!(r.max_length, Some(24000));
    }
}
