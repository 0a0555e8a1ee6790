//! Integration tests against an in-process mock backend.
//!
//! Each test builds an axum router that records the JSON payloads it
//! receives, binds it to an ephemeral port, and points a real
//! [`ClientSession`] (or the `docq` binary) at it.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, Mutex};

use docq::bullets;
use docq::client::ClientError;
use docq::config::Config;
use docq::models::HistoryKind;
use docq::session::ClientSession;

type Recorded = Arc<Mutex<Vec<Value>>>;

fn recorder() -> Recorded {
    Arc::new(Mutex::new(Vec::new()))
}

fn record_route(log: Recorded, reply: Value) -> axum::routing::MethodRouter {
    post(move |Json(body): Json<Value>| {
        let log = log.clone();
        let reply = reply.clone();
        async move {
            log.lock().unwrap().push(body);
            Json(reply)
        }
    })
}

async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn summary_reply() -> Value {
    json!({
        "sections": [{
            "title": "Danh mục",
            "bullets": [
                "Gạch đầu dòng:",
                "- Doanh thu tăng 10%",
                "Chi phí vận hành giảm nhẹ trong quý"
            ]
        }],
        "meta": {"model": "llama3", "prompt_tokens": 120, "completion_tokens": 48, "latency_ms": 900}
    })
}

#[tokio::test]
async fn test_summarize_end_to_end() {
    let ingests = recorder();
    let summaries = recorder();
    let app = Router::new()
        .route("/ingest", record_route(ingests.clone(), json!({"status": "ingested"})))
        .route("/summarize", record_route(summaries.clone(), summary_reply()));
    let url = spawn_backend(app).await;

    let mut session = ClientSession::new(&Config::with_base_url(&url)).unwrap();
    session.set_text("A line.\n\nB line.");
    session.set_num_bullets(3);
    session.set_category("kết luận");
    session.set_query("Tóm tắt kết luận chính");
    session.summarize().await.unwrap();

    // Ingest carried the blank-line chunks and a minted identifier.
    let ingests = ingests.lock().unwrap();
    assert_eq!(ingests.len(), 1);
    assert_eq!(ingests[0]["chunks"], json!(["A line.", "B line."]));
    let doc_id = ingests[0]["document_id"].as_str().unwrap().to_string();
    assert!(doc_id.starts_with("doc-"));

    // Summarize reused the same identifier and the configured options.
    let summaries = summaries.lock().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["document_id"], json!(doc_id));
    assert_eq!(summaries[0]["num_bullets"], json!(3));
    assert_eq!(summaries[0]["category"], json!("kết luận"));
    assert_eq!(summaries[0]["instruction"], json!("Tóm tắt kết luận chính"));

    // Header-like bullet filtered out: three raw bullets render as two.
    let resp = session.summary().expect("summary stored");
    let rendered = bullets::section_bullets(&resp.sections[0]);
    assert_eq!(
        rendered,
        vec![
            "Doanh thu tăng 10%".to_string(),
            "Chi phí vận hành giảm nhẹ trong quý".to_string()
        ]
    );
    assert_eq!(resp.meta.as_ref().unwrap().model, "llama3");

    assert!(session.qa_result().is_none());
    assert!(!session.loading());
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].kind, HistoryKind::Summary);
    assert_eq!(session.history()[0].query, "Tóm tắt kết luận chính");
}

#[tokio::test]
async fn test_qa_end_to_end_and_result_slot_exclusivity() {
    let summaries = recorder();
    let qas = recorder();
    let app = Router::new()
        .route("/summarize", record_route(summaries.clone(), summary_reply()))
        .route(
            "/qa",
            record_route(
                qas.clone(),
                json!({
                    "answer": "Doanh thu tăng nhờ mảng bán lẻ.",
                    "confidence": 0.82,
                    "citations": [{"source": "report.pdf", "page": 12, "span": [100, 180]}]
                }),
            ),
        );
    let url = spawn_backend(app).await;

    let mut session = ClientSession::new(&Config::with_base_url(&url)).unwrap();
    session.set_query("tóm tắt");
    session.summarize().await.unwrap();
    assert!(session.summary().is_some());

    session.set_query("Điều gì thúc đẩy doanh thu?");
    session.qa().await.unwrap();

    let qas = qas.lock().unwrap();
    assert_eq!(qas.len(), 1);
    assert_eq!(qas[0]["question"], json!("Điều gì thúc đẩy doanh thu?"));
    assert_eq!(qas[0]["top_k"], json!(5));

    let resp = session.qa_result().expect("qa stored");
    assert_eq!(resp.answer, "Doanh thu tăng nhờ mảng bán lẻ.");
    assert_eq!(resp.confidence, Some(0.82));
    assert_eq!(resp.citations[0].page, 12);
    assert_eq!(resp.citations[0].span, [100, 180]);

    // A QA result evicts the summary slot, and history is newest first.
    assert!(session.summary().is_none());
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history()[0].kind, HistoryKind::Qa);
    assert_eq!(session.history()[0].query, "Điều gì thúc đẩy doanh thu?");
    assert_eq!(session.history()[1].kind, HistoryKind::Summary);
    assert_eq!(session.history()[1].query, "tóm tắt");
}

#[tokio::test]
async fn test_failed_ingest_does_not_block_summarize() {
    let summaries = recorder();
    let app = Router::new()
        .route(
            "/ingest",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))) }),
        )
        .route("/summarize", record_route(summaries.clone(), json!({})));
    let url = spawn_backend(app).await;

    let mut session = ClientSession::new(&Config::with_base_url(&url)).unwrap();
    session.set_text("some pending text");
    session.set_query("summarize this");
    session.summarize().await.unwrap();

    // The summarize call went out even though ingest failed, and the failed
    // ingest did not persist a document identifier.
    assert_eq!(summaries.lock().unwrap().len(), 1);
    assert!(session.document_id().is_none());
    assert!(!session.loading());
}

#[tokio::test]
async fn test_empty_text_skips_ingest() {
    let ingests = recorder();
    let qas = recorder();
    let app = Router::new()
        .route("/ingest", record_route(ingests.clone(), json!({})))
        .route("/qa", record_route(qas.clone(), json!({"answer": "ok"})));
    let url = spawn_backend(app).await;

    let mut session = ClientSession::new(&Config::with_base_url(&url)).unwrap();
    session.set_text("   \n\n  ");
    session.set_query("anything?");
    session.qa().await.unwrap();

    assert_eq!(ingests.lock().unwrap().len(), 0);
    assert_eq!(qas.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_document_id_stable_across_operations() {
    let ingests = recorder();
    let summaries = recorder();
    let app = Router::new()
        .route("/ingest", record_route(ingests.clone(), json!({"status": "ingested"})))
        .route("/summarize", record_route(summaries.clone(), json!({})));
    let url = spawn_backend(app).await;

    let mut session = ClientSession::new(&Config::with_base_url(&url)).unwrap();
    session.set_text("First paragraph.\n\nSecond paragraph.");
    session.set_query("round one");
    session.summarize().await.unwrap();
    session.set_query("round two");
    session.summarize().await.unwrap();

    let ingests = ingests.lock().unwrap();
    let summaries = summaries.lock().unwrap();
    assert_eq!(ingests.len(), 2);
    assert_eq!(summaries.len(), 2);
    let id = ingests[0]["document_id"].as_str().unwrap();
    assert_eq!(ingests[1]["document_id"], json!(id));
    assert_eq!(summaries[0]["document_id"], json!(id));
    assert_eq!(summaries[1]["document_id"], json!(id));
    assert_eq!(session.document_id(), Some(id));
}

#[tokio::test]
async fn test_pending_file_notice_with_text_still_ingests() {
    let ingests = recorder();
    let summaries = recorder();
    let app = Router::new()
        .route("/ingest", record_route(ingests.clone(), json!({"status": "ingested"})))
        .route("/summarize", record_route(summaries.clone(), json!({})));
    let url = spawn_backend(app).await;

    let mut session = ClientSession::new(&Config::with_base_url(&url)).unwrap();
    session.set_pending_file(Some("bao-cao-q3.pdf".into()));
    session.set_text("Pasted alongside the file.");
    session.set_query("summarize");
    session.summarize().await.unwrap();

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("bao-cao-q3.pdf"));

    let ingests = ingests.lock().unwrap();
    assert_eq!(ingests.len(), 1);
    assert_eq!(ingests[0]["chunks"], json!(["Pasted alongside the file."]));
}

#[tokio::test]
async fn test_non_2xx_summarize_body_decodes_as_empty() {
    let app = Router::new().route(
        "/summarize",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "document_id không có dữ liệu"})),
            )
        }),
    );
    let url = spawn_backend(app).await;

    let mut session = ClientSession::new(&Config::with_base_url(&url)).unwrap();
    session.set_query("summarize nothing");
    session.summarize().await.unwrap();

    let resp = session.summary().expect("empty result stored");
    assert!(resp.sections.is_empty());
    assert!(resp.meta.is_none());
}

#[tokio::test]
async fn test_shape_mismatched_citation_keeps_answer() {
    let app = Router::new().route(
        "/qa",
        post(|| async {
            Json(json!({
                "answer": "Vẫn trả lời được.",
                "citations": [{"source": "x", "page": "3", "span": [1, 2, 3]}]
            }))
        }),
    );
    let url = spawn_backend(app).await;

    let mut session = ClientSession::new(&Config::with_base_url(&url)).unwrap();
    session.set_query("câu hỏi");
    session.qa().await.unwrap();

    // Wrong-typed citation fields collapse to defaults; the answer survives.
    let resp = session.qa_result().expect("qa stored");
    assert_eq!(resp.answer, "Vẫn trả lời được.");
    assert_eq!(resp.citations.len(), 1);
    assert_eq!(resp.citations[0].source, "x");
    assert_eq!(resp.citations[0].page, 0);
    assert_eq!(resp.citations[0].span, [0, 0]);
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_timeout_clears_loading_flag() {
    let app = Router::new().route(
        "/qa",
        post(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Json(json!({"answer": "too late"}))
        }),
    );
    let url = spawn_backend(app).await;

    let mut cfg = Config::with_base_url(&url);
    cfg.api.timeout_secs = 1;

    let mut session = ClientSession::new(&cfg).unwrap();
    session.set_query("will this hang?");
    let err = session.qa().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ClientError>(),
        Some(ClientError::Timeout { .. })
    ));
    assert!(!session.loading());
    assert!(session.qa_result().is_none());
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_clears_loading_flag() {
    // Closed port: connection refused rather than timeout.
    let mut session =
        ClientSession::new(&Config::with_base_url("http://127.0.0.1:9")).unwrap();
    session.set_query("anyone there?");
    let err = session.qa().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ClientError>(),
        Some(ClientError::Transport { .. })
    ));
    assert!(!session.loading());
}

// ============ Binary tests ============

fn docq_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("docq");
    path
}

fn run_docq(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(docq_binary())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docq binary: {}", e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

#[test]
fn test_binary_health() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let app = Router::new().route("/health", get(|| async { Json(json!({"status": "ok"})) }));
    let url = rt.block_on(spawn_backend(app));

    let (stdout, stderr, success) = run_docq(&["--api-url", &url, "health"]);
    assert!(success, "health failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("ok"));
}

#[test]
fn test_binary_summarize_renders_filtered_bullets() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let app = Router::new()
        .route("/ingest", post(|| async { Json(json!({"status": "ingested"})) }))
        .route("/summarize", post(|| async { Json(summary_reply()) }));
    let url = rt.block_on(spawn_backend(app));

    let (stdout, stderr, success) = run_docq(&[
        "--api-url",
        &url,
        "summarize",
        "Tóm tắt kết luận",
        "--text",
        "A line.\n\nB line.",
        "--bullets",
        "3",
    ]);
    assert!(success, "summarize failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("--- Summary ---"));
    assert!(stdout.contains("Doanh thu tăng 10%"));
    assert!(stdout.contains("Chi phí vận hành giảm nhẹ trong quý"));
    assert!(!stdout.contains("Gạch đầu dòng"));
    assert!(stdout.contains("model: llama3"));
}

#[test]
fn test_binary_qa_with_file_prints_notice() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let app = Router::new()
        .route("/ingest", post(|| async { Json(json!({"status": "ingested"})) }))
        .route("/qa", post(|| async { Json(json!({"answer": "ok"})) }));
    let url = rt.block_on(spawn_backend(app));

    let (stdout, stderr, success) = run_docq(&[
        "--api-url",
        &url,
        "qa",
        "What happened?",
        "--text",
        "Some pasted context.",
        "--file",
        "bao-cao.pdf",
    ]);
    assert!(success, "qa failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stderr.contains("bao-cao.pdf"));
    assert!(stderr.contains("not supported"));
    assert!(stdout.contains("--- Answer ---"));
}

#[test]
fn test_binary_reads_config_file() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let app = Router::new().route("/health", get(|| async { Json(json!({"status": "ok"})) }));
    let url = rt.block_on(spawn_backend(app));

    let tmp = tempfile::TempDir::new().unwrap();
    let config_path = tmp.path().join("docq.toml");
    std::fs::write(
        &config_path,
        format!("[api]\nbase_url = \"{}\"\ntimeout_secs = 5\n", url),
    )
    .unwrap();

    let (stdout, _, success) = run_docq(&["--config", config_path.to_str().unwrap(), "health"]);
    assert!(success);
    assert!(stdout.contains("ok"));
}

#[test]
fn test_binary_rejects_invalid_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config_path = tmp.path().join("docq.toml");
    std::fs::write(&config_path, "[api]\ntimeout_secs = 0\n").unwrap();

    let (_, stderr, success) = run_docq(&["--config", config_path.to_str().unwrap(), "health"]);
    assert!(!success);
    assert!(stderr.contains("timeout_secs"));
}
