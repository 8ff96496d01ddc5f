//! Strand store
//!
//! Per-session append-only sequences of codons. Codons are immutable once
//! appended, insertion-ordered, never reordered or deleted. Strands are
//! created lazily on first append and bounded by configurable caps so a
//! single client cannot grow the store without limit.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// An immutable record appended to a session's strand
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Codon {
    pub nugget_id: String,
    pub session_id: String,
    pub content: String,
    pub prompt_id: String,
    pub origin: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the client for a new codon
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodonDraft {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub prompt_id: String,
    #[serde(default)]
    pub origin: Option<String>,
}

impl CodonDraft {
    /// Names of required fields that are empty, in declaration order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.session_id.trim().is_empty() {
            missing.push("sessionId");
        }
        if self.content.trim().is_empty() {
            missing.push("content");
        }
        if self.prompt_id.trim().is_empty() {
            missing.push("promptId");
        }
        missing
    }
}

/// Capacity bounds for the store
#[derive(Debug, Clone, Copy)]
pub struct StrandLimits {
    /// Maximum codons in a single strand
    pub max_codons_per_strand: usize,
    /// Maximum number of strands (sessions) the store will hold
    pub max_strands: usize,
}

impl Default for StrandLimits {
    fn default() -> Self {
        Self {
            max_codons_per_strand: 10_000,
            max_strands: 1_000,
        }
    }
}

/// In-memory append-only store of strands keyed by session id
#[derive(Debug, Clone)]
pub struct StrandStore {
    strands: Arc<RwLock<HashMap<String, Vec<Codon>>>>,
    limits: StrandLimits,
}

impl Default for StrandStore {
    fn default() -> Self {
        Self::new(StrandLimits::default())
    }
}

impl StrandStore {
    pub fn new(limits: StrandLimits) -> Self {
        Self {
            strands: Arc::new(RwLock::new(HashMap::new())),
            limits,
        }
    }

    /// Validate the draft and append it to the session's strand.
    ///
    /// On a capacity rejection the strand is untouched.
    pub async fn append(&self, draft: CodonDraft) -> CoreResult<Codon> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(CoreError::MissingFields(missing));
        }

        let codon = Codon {
            nugget_id: Uuid::new_v4().to_string(),
            session_id: draft.session_id.clone(),
            content: draft.content,
            prompt_id: draft.prompt_id,
            origin: draft.origin.unwrap_or_else(|| "api".to_string()),
            created_at: Utc::now(),
        };

        let mut strands = self.strands.write().await;
        if !strands.contains_key(&draft.session_id) && strands.len() >= self.limits.max_strands {
            return Err(CoreError::TooManySessions);
        }
        let strand = strands.entry(draft.session_id).or_default();
        if strand.len() >= self.limits.max_codons_per_strand {
            return Err(CoreError::StrandFull);
        }
        strand.push(codon.clone());
        Ok(codon)
    }

    /// Snapshot of a session's strand, insertion-ordered
    pub async fn strand(&self, session_id: &str) -> Vec<Codon> {
        self.strands
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of codons in a session's strand
    pub async fn strand_len(&self, session_id: &str) -> usize {
        self.strands
            .read()
            .await
            .get(session_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Number of strands currently held
    pub async fn session_count(&self) -> usize {
        self.strands.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(session: &str, content: &str, prompt: &str) -> CodonDraft {
        CodonDraft {
            session_id: session.to_string(),
            content: content.to_string(),
            prompt_id: prompt.to_string(),
            origin: None,
        }
    }

    #[tokio::test]
    async fn test_append_creates_strand_lazily() {
        let store = StrandStore::default();
        assert_eq!(store.session_count().await, 0);

        let codon = store.append(draft("sess-1", "hello", "p-1")).await.unwrap();
        assert_eq!(codon.session_id, "sess-1");
        assert_eq!(codon.origin, "api");
        assert!(!codon.nugget_id.is_empty());
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_insertion_order_preserved() {
        let store = StrandStore::default();
        for i in 0..5 {
            store
                .append(draft("sess-1", &format!("c{}", i), "p"))
                .await
                .unwrap();
        }
        let strand = store.strand("sess-1").await;
        let contents: Vec<_> = strand.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["c0", "c1", "c2", "c3", "c4"]);
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_with_names() {
        let store = StrandStore::default();
        let err = store.append(draft("", "content", "")).await.unwrap_err();
        match err {
            CoreError::MissingFields(fields) => {
                assert_eq!(fields, vec!["sessionId", "promptId"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_whitespace_only_fields_rejected() {
        let store = StrandStore::default();
        let err = store.append(draft("sess-1", "   ", "p-1")).await.unwrap_err();
        assert!(matches!(err, CoreError::MissingFields(_)));
    }

    #[tokio::test]
    async fn test_strand_cap_rejects_overflow_and_leaves_strand_unchanged() {
        let store = StrandStore::new(StrandLimits {
            max_codons_per_strand: 3,
            max_strands: 10,
        });
        for i in 0..3 {
            store
                .append(draft("sess-1", &format!("c{}", i), "p"))
                .await
                .unwrap();
        }
        let err = store.append(draft("sess-1", "c3", "p")).await.unwrap_err();
        assert!(matches!(err, CoreError::StrandFull));
        assert_eq!(store.strand_len("sess-1").await, 3);
    }

    #[tokio::test]
    async fn test_session_cap_rejects_new_strand_but_not_existing() {
        let store = StrandStore::new(StrandLimits {
            max_codons_per_strand: 100,
            max_strands: 2,
        });
        store.append(draft("sess-a", "x", "p")).await.unwrap();
        store.append(draft("sess-b", "x", "p")).await.unwrap();

        let err = store.append(draft("sess-c", "x", "p")).await.unwrap_err();
        assert!(matches!(err, CoreError::TooManySessions));

        // Existing strands still accept appends.
        store.append(draft("sess-a", "y", "p")).await.unwrap();
        assert_eq!(store.strand_len("sess-a").await, 2);
    }

    #[tokio::test]
    async fn test_origin_carried_when_supplied() {
        let store = StrandStore::default();
        let codon = store
            .append(CodonDraft {
                session_id: "sess-1".to_string(),
                content: "hello".to_string(),
                prompt_id: "p-1".to_string(),
                origin: Some("federation".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(codon.origin, "federation");
    }
}
