//! Text units and simplification results.

use serde::{Deserialize, Serialize};

/// One text fragment on the wire, correlated by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub id: String,
    pub text: String,
}

impl BatchItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Result for one batch item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub from_cache: bool,
}

/// Where a simplification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeSource {
    Cache,
    Remote,
    Fallback,
}

/// Result of simplifying a single text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyOutcome {
    #[serde(rename = "simplifiedText")]
    pub text: String,
    pub from_cache: bool,
    pub source: OutcomeSource,
}

impl SimplifyOutcome {
    pub fn cached(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from_cache: true,
            source: OutcomeSource::Cache,
        }
    }

    pub fn remote(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from_cache: false,
            source: OutcomeSource::Remote,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from_cache: false,
            source: OutcomeSource::Fallback,
        }
    }

    /// Whether the remote service (directly or via the cache) produced this.
    pub fn is_authoritative(&self) -> bool {
        self.source != OutcomeSource::Fallback
    }
}

/// Build a page session id: `<hostname>_<unix millis>`.
pub fn new_page_id(hostname: &str) -> String {
    format!("{}_{}", hostname, chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_item_serialization() {
        let item = BatchItem::new("p_1", "Some text.");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "p_1");
        assert_eq!(json["text"], "Some text.");
    }

    #[test]
    fn test_batch_result_from_cache_defaults_false() {
        let parsed: BatchResult = serde_json::from_str(r#"{"id":"a","text":"t"}"#).unwrap();
        assert!(!parsed.from_cache);

        let json = serde_json::to_value(BatchResult {
            id: "a".into(),
            text: "t".into(),
            from_cache: true,
        })
        .unwrap();
        assert_eq!(json["fromCache"], true);
    }

    #[test]
    fn test_outcome_constructors() {
        let cached = SimplifyOutcome::cached("x");
        assert!(cached.from_cache);
        assert_eq!(cached.source, OutcomeSource::Cache);
        assert!(cached.is_authoritative());

        let remote = SimplifyOutcome::remote("x");
        assert!(!remote.from_cache);
        assert!(remote.is_authoritative());

        let fallback = SimplifyOutcome::fallback("x");
        assert!(!fallback.from_cache);
        assert!(!fallback.is_authoritative());
    }

    #[test]
    fn test_outcome_wire_names() {
        let json = serde_json::to_value(SimplifyOutcome::remote("done")).unwrap();
        assert_eq!(json["simplifiedText"], "done");
        assert_eq!(json["fromCache"], false);
        assert_eq!(json["source"], "remote");
    }

    #[test]
    fn test_page_id_format() {
        let id = new_page_id("example.com");
        let (host, millis) = id.rsplit_once('_').unwrap();
        assert_eq!(host, "example.com");
        assert!(millis.parse::<i64>().unwrap() > 0);
    }
}
