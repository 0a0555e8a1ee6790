//! Session state and request orchestration.
//!
//! [`ClientSession`] is the client's single stateful component. It holds the
//! user's draft input (pasted text, pending file name, summary options, the
//! current query), the per-session identifier, the most recent summary/QA
//! results, and a bounded most-recent-first history of past invocations.
//!
//! The two user-facing operations, [`ClientSession::summarize`] and
//! [`ClientSession::qa`], follow the same sequence: clear both result slots,
//! ingest any pending text first, then issue the action call and store the
//! typed result. Ingestion failure is logged and deliberately does not block
//! the follow-up call; the loading flag is cleared on every exit path.
//!
//! Results are correlated with a per-session generation counter: each
//! dispatched call takes a token, and a completed call only lands in the
//! result slot while its token is still the newest one issued. A response
//! that arrives after a newer dispatch is dropped instead of overwriting the
//! fresher result.

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::chunk::split_chunks;
use crate::client::ApiClient;
use crate::config::Config;
use crate::models::{
    HistoryEntry, HistoryKind, IngestRequest, QaRequest, QaResponse, SummarizeRequest,
    SummaryResponse,
};

/// Which action panel is active. Only changes which operation a dispatched
/// query runs; both result slots exist regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Summary,
    Qa,
}

pub struct ClientSession {
    client: ApiClient,
    session_id: String,
    tab: Tab,
    text: String,
    pending_file: Option<String>,
    num_bullets: u32,
    category: String,
    query: String,
    loading: bool,
    document_id: Option<String>,
    summary: Option<SummaryResponse>,
    qa: Option<QaResponse>,
    history: Vec<HistoryEntry>,
    history_limit: usize,
    top_k: u32,
    generation: u64,
    notices: Vec<String>,
}

impl ClientSession {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            session_id: Uuid::new_v4().to_string(),
            tab: Tab::Summary,
            text: String::new(),
            pending_file: None,
            num_bullets: 0,
            category: String::new(),
            query: String::new(),
            loading: false,
            document_id: None,
            summary: None,
            qa: None,
            history: Vec::new(),
            history_limit: config.session.history_limit,
            top_k: config.session.top_k,
            generation: 0,
            notices: Vec::new(),
        })
    }

    // ============ Draft state ============

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Record a selected file by display name. The file itself is never read
    /// or transmitted; the backend has no binary ingestion.
    pub fn set_pending_file(&mut self, name: Option<String>) {
        self.pending_file = name;
    }

    pub fn pending_file(&self) -> Option<&str> {
        self.pending_file.as_deref()
    }

    pub fn set_num_bullets(&mut self, n: u32) {
        self.num_bullets = n;
    }

    /// Coerce free-form bullet-count input: empty, negative, or unparseable
    /// values become 0 (backend default).
    pub fn set_num_bullets_input(&mut self, input: &str) {
        self.num_bullets = input.trim().parse().unwrap_or(0);
    }

    pub fn num_bullets(&self) -> u32 {
        self.num_bullets
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_document_id(&mut self, id: impl Into<String>) {
        self.document_id = Some(id.into());
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    /// Forget the assigned document identifier; the next ingest mints a new one.
    pub fn clear_document_id(&mut self) {
        self.document_id = None;
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Drain notices raised since the last call (e.g. the unsupported file
    /// upload notification). The caller is expected to surface these
    /// prominently before rendering anything else.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    // ============ Results ============

    pub fn summary(&self) -> Option<&SummaryResponse> {
        self.summary.as_ref()
    }

    pub fn qa_result(&self) -> Option<&QaResponse> {
        self.qa.as_ref()
    }

    /// Issue a generation token for a new dispatch. Any token issued earlier
    /// becomes stale.
    pub fn begin_request(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Store a summary result if its token is still current. Returns whether
    /// the result was applied.
    pub fn apply_summary(&mut self, token: u64, resp: SummaryResponse) -> bool {
        if token != self.generation {
            return false;
        }
        self.summary = Some(resp);
        true
    }

    /// Store a QA result if its token is still current.
    pub fn apply_qa(&mut self, token: u64, resp: QaResponse) -> bool {
        if token != self.generation {
            return false;
        }
        self.qa = Some(resp);
        true
    }

    // ============ History ============

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// No-op re-render hook kept for interface parity with the original
    /// history panel's refresh button.
    pub fn refresh_history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn push_history(&mut self, kind: HistoryKind) {
        self.history.insert(
            0,
            HistoryEntry {
                ts: Utc::now().timestamp(),
                kind,
                query: self.query.clone(),
            },
        );
        self.history.truncate(self.history_limit);
    }

    // ============ Operations ============

    /// Ingest pending input, if any. Returns `true` on success or when there
    /// is nothing to send; failures are logged and reported as `false`, never
    /// as an error.
    pub async fn ingest_pending(&mut self) -> bool {
        if let Some(name) = &self.pending_file {
            self.notices.push(format!(
                "File upload is not supported by the current backend; '{}' was not sent. Paste the text instead.",
                name
            ));
        }

        if self.text.trim().is_empty() {
            // Vacuously nothing to send.
            return true;
        }

        let document_id = self
            .document_id
            .clone()
            .unwrap_or_else(mint_document_id);
        let req = IngestRequest {
            document_id: document_id.clone(),
            chunks: split_chunks(&self.text),
        };

        match self.client.ingest(&req).await {
            Ok(()) => {
                // The identifier sticks only once the backend has the chunks.
                self.document_id = Some(document_id);
                true
            }
            Err(e) => {
                eprintln!("Warning: ingest failed: {}", e);
                false
            }
        }
    }

    /// Run the summarize operation: clear result slots, ingest pending input,
    /// call `/summarize`, store the result, and record a history entry.
    pub async fn summarize(&mut self) -> Result<()> {
        self.summary = None;
        self.qa = None;
        self.loading = true;
        let token = self.begin_request();

        // Loading must clear on every exit path, success or error.
        let result = self.summarize_inner(token).await;
        self.loading = false;
        result
    }

    async fn summarize_inner(&mut self, token: u64) -> Result<()> {
        self.ingest_if_pending().await;

        let req = SummarizeRequest {
            document_id: self.document_id.clone().unwrap_or_else(mint_document_id),
            num_bullets: self.num_bullets,
            category: self.category.clone(),
            instruction: self.query.clone(),
        };
        let resp = self.client.summarize(&req).await?;
        self.apply_summary(token, resp);
        self.push_history(HistoryKind::Summary);
        Ok(())
    }

    /// Run the question-answer operation, symmetric to [`Self::summarize`].
    pub async fn qa(&mut self) -> Result<()> {
        self.qa = None;
        self.summary = None;
        self.loading = true;
        let token = self.begin_request();

        let result = self.qa_inner(token).await;
        self.loading = false;
        result
    }

    async fn qa_inner(&mut self, token: u64) -> Result<()> {
        self.ingest_if_pending().await;

        let req = QaRequest {
            question: self.query.clone(),
            top_k: self.top_k,
        };
        let resp = self.client.qa(&req).await?;
        self.apply_qa(token, resp);
        self.push_history(HistoryKind::Qa);
        Ok(())
    }

    async fn ingest_if_pending(&mut self) {
        if self.pending_file.is_some() || !self.text.trim().is_empty() {
            // A failed ingest does not block the follow-up call.
            if !self.ingest_pending().await {
                eprintln!("Warning: continuing without a successful ingest");
            }
        }
    }
}

fn mint_document_id() -> String {
    format!("doc-{}", Utc::now().timestamp_millis())
}
