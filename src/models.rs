//! Request and response types for the backend API, plus session values.
//!
//! Response shapes are dictated by the backend and only partially guaranteed,
//! so every consumed field is defaulted or optional, and a field of the wrong
//! type collapses to its default instead of failing the whole body. Unknown
//! fields are ignored. The one genuinely polymorphic spot is
//! [`Section::bullets`], which the backend sends either as an array of
//! strings or as a single newline-joined block.

use serde::{Deserialize, Deserializer, Serialize};

/// Decode a field by value, falling back to `Default` when the backend sends
/// a mismatched type (wrong-arity span, string-typed page, numeric bullets).
/// `#[serde(default)]` covers the missing case; this covers present-but-wrong.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

// ============ Requests ============

#[derive(Debug, Clone, Serialize)]
pub struct IngestRequest {
    pub document_id: String,
    pub chunks: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarizeRequest {
    pub document_id: String,
    pub num_bullets: u32,
    pub category: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QaRequest {
    pub question: String,
    pub top_k: u32,
}

// ============ Responses ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub sections: Vec<Section>,
    #[serde(default, deserialize_with = "lenient")]
    pub meta: Option<SummaryMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Section {
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub bullets: Option<BulletField>,
}

/// Bullets as the backend actually sends them: a proper list, or one string
/// block that needs line-splitting. See [`crate::bullets::section_bullets`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BulletField {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryMeta {
    #[serde(default, deserialize_with = "lenient")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient")]
    pub prompt_tokens: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub completion_tokens: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub latency_ms: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QaResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub answer: String,
    #[serde(default, deserialize_with = "lenient")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub citations: Vec<Citation>,
}

/// Backend-supplied pointer substantiating a QA answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Citation {
    #[serde(default, deserialize_with = "lenient")]
    pub source: String,
    #[serde(default, deserialize_with = "lenient")]
    pub page: i64,
    /// Character span `[start, end]` within the source.
    #[serde(default, deserialize_with = "lenient")]
    pub span: [i64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
}

// ============ Session values ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Summary,
    Qa,
}

impl std::fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryKind::Summary => write!(f, "summary"),
            HistoryKind::Qa => write!(f, "qa"),
        }
    }
}

/// One past summarize/qa invocation, newest kept first in the session.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// Epoch seconds.
    pub ts: i64,
    pub kind: HistoryKind,
    pub query: String,
}
