//! # docq
//!
//! A command-line client for a document summarization and question-answering
//! service.
//!
//! The backend is an opaque JSON-over-HTTP collaborator: it stores ingested
//! document chunks, builds bulleted summaries, and answers free-form questions
//! with citations. This crate handles the client side of that contract —
//! paragraph chunking, request sequencing (ingest before summarize/qa),
//! response post-processing, and a bounded in-memory session history.
//!
//! ```text
//! ┌───────────┐   ┌───────────────┐   ┌──────────────────┐
//! │ CLI/repl  │──▶│ ClientSession │──▶│ backend API      │
//! │  (docq)   │   │ chunk+history │   │ /ingest          │
//! └───────────┘   └───────────────┘   │ /summarize /qa   │
//!                                     └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Request/response types and session values |
//! | [`chunk`] | Blank-line paragraph chunking |
//! | [`bullets`] | Bullet normalization and header filtering |
//! | [`client`] | Bounded HTTP client for the backend endpoints |
//! | [`session`] | Session state and request orchestration |
//! | [`render`] | stdout rendering of results and history |

pub mod bullets;
pub mod chunk;
pub mod client;
pub mod config;
pub mod models;
pub mod render;
pub mod session;
