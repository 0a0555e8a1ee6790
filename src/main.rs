//! # docq CLI
//!
//! Command-line client for a document summarization and question-answering
//! backend.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docq ingest` | Chunk pasted text and submit it to the backend |
//! | `docq summarize "<instruction>"` | Ingest pending text, then request a bulleted summary |
//! | `docq qa "<question>"` | Ingest pending text, then ask a free-form question |
//! | `docq health` | Check backend connectivity |
//! | `docq repl` | Interactive session with draft editing and history |
//!
//! ## Examples
//!
//! ```bash
//! # Summarize pasted text in one shot
//! docq summarize "Tóm tắt kết luận chính" --text "$(cat report.txt)" --bullets 5
//!
//! # Ask a question against an already-ingested document
//! docq qa "What drove revenue growth?"
//!
//! # Point at a different backend
//! docq --api-url http://10.0.0.5:8080 health
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use docq::client::ApiClient;
use docq::config::{self, Config};
use docq::render;
use docq::session::{ClientSession, Tab};

/// docq — a client for a document summarization and question-answering
/// service.
///
/// The backend base URL comes from `--api-url`, then the config file, then
/// the default `http://127.0.0.1:8080`.
#[derive(Parser)]
#[command(
    name = "docq",
    about = "docq — a client for a document summarization and question-answering service",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL override.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk text on blank lines and submit it to the backend.
    ///
    /// Reads the text from `--text` or stdin. The document identifier is
    /// minted (`doc-<millis>`) unless `--document-id` pins an existing one.
    Ingest {
        /// Text to ingest; read from stdin when omitted.
        #[arg(long)]
        text: Option<String>,

        /// Reuse an existing document identifier.
        #[arg(long)]
        document_id: Option<String>,

        /// Name of a selected file. Upload is not supported by the backend;
        /// this only triggers the corresponding notice.
        #[arg(long)]
        file: Option<String>,
    },

    /// Request a bulleted summary.
    ///
    /// Any `--text` is ingested first; the summarize call proceeds even if
    /// that ingest fails (a warning is printed).
    Summarize {
        /// Summarization instruction.
        instruction: String,

        /// Number of bullets to request (0 = backend default).
        #[arg(long, default_value_t = 0)]
        bullets: u32,

        /// Category to focus on (e.g. conclusions, trends).
        #[arg(long, default_value = "")]
        category: String,

        /// Text to ingest before summarizing.
        #[arg(long)]
        text: Option<String>,

        /// Reuse an existing document identifier.
        #[arg(long)]
        document_id: Option<String>,

        /// Name of a selected file (upload not supported; notice only).
        #[arg(long)]
        file: Option<String>,
    },

    /// Ask a free-form question; the answer comes with citations.
    Qa {
        /// The question.
        question: String,

        /// Text to ingest before asking.
        #[arg(long)]
        text: Option<String>,

        /// Reuse an existing document identifier.
        #[arg(long)]
        document_id: Option<String>,

        /// Name of a selected file (upload not supported; notice only).
        #[arg(long)]
        file: Option<String>,
    },

    /// Check backend connectivity.
    Health,

    /// Interactive session keeping draft state and history across actions.
    Repl,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    if let Some(url) = cli.api_url {
        cfg.api.base_url = url;
        config::validate(&cfg)?;
    }

    match cli.command {
        Commands::Ingest {
            text,
            document_id,
            file,
        } => {
            let mut session = ClientSession::new(&cfg)?;
            if let Some(id) = document_id {
                session.set_document_id(id);
            }
            session.set_pending_file(file);
            session.set_text(resolve_text(text)?);

            let had_text = !session.text().trim().is_empty();
            let ok = session.ingest_pending().await;
            print_notices(&mut session);
            if !ok {
                eprintln!("Error: ingest failed");
                std::process::exit(1);
            }
            if had_text {
                println!(
                    "ingested as {}",
                    session.document_id().unwrap_or("(unknown)")
                );
            } else {
                println!("nothing to ingest");
            }
        }
        Commands::Summarize {
            instruction,
            bullets,
            category,
            text,
            document_id,
            file,
        } => {
            let mut session = ClientSession::new(&cfg)?;
            if let Some(id) = document_id {
                session.set_document_id(id);
            }
            session.set_pending_file(file);
            if let Some(text) = text {
                session.set_text(text);
            }
            session.set_num_bullets(bullets);
            session.set_category(category);
            session.set_query(instruction);

            let result = session.summarize().await;
            print_notices(&mut session);
            result?;
            if let Some(resp) = session.summary() {
                render::print_summary(resp);
            }
        }
        Commands::Qa {
            question,
            text,
            document_id,
            file,
        } => {
            let mut session = ClientSession::new(&cfg)?;
            if let Some(id) = document_id {
                session.set_document_id(id);
            }
            session.set_pending_file(file);
            if let Some(text) = text {
                session.set_text(text);
            }
            session.set_query(question);

            let result = session.qa().await;
            print_notices(&mut session);
            result?;
            if let Some(resp) = session.qa_result() {
                render::print_qa(resp);
            }
        }
        Commands::Health => {
            let client = ApiClient::new(&cfg)?;
            let resp = client.health().await?;
            println!("{}: {}", client.base_url(), resp.status);
        }
        Commands::Repl => {
            run_repl(&cfg).await?;
        }
    }

    Ok(())
}

/// Use the provided text, or read it all from stdin.
fn resolve_text(text: Option<String>) -> Result<String> {
    match text {
        Some(t) => Ok(t),
        None => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)?;
            Ok(buf)
        }
    }
}

fn print_notices(session: &mut ClientSession) {
    for notice in session.take_notices() {
        eprintln!("! {}", notice);
    }
}

/// Interactive session loop. Plain lines dispatch the active tab's operation
/// with the line as the query; `:commands` edit draft state.
async fn run_repl(cfg: &Config) -> Result<()> {
    let mut session = ClientSession::new(cfg)?;
    println!("docq session {} (tab: summary)", session.session_id());
    println!("type :help for commands; a plain line runs the active tab's action");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim_end_matches('\n');

        if let Some(command) = line.strip_prefix(':') {
            let mut parts = command.splitn(2, ' ');
            let name = parts.next().unwrap_or("");
            let arg = parts.next().unwrap_or("").trim();

            match name {
                "help" => print_repl_help(),
                "quit" | "q" => break,
                "text" => {
                    println!("enter text, end with a single '.' line:");
                    let mut text = String::new();
                    loop {
                        let mut body_line = String::new();
                        if stdin.lock().read_line(&mut body_line)? == 0 {
                            break;
                        }
                        let body_line = body_line.trim_end_matches('\n');
                        if body_line == "." {
                            break;
                        }
                        text.push_str(body_line);
                        text.push('\n');
                    }
                    session.set_text(text);
                    println!("text set ({} chunk(s) pending)", docq::chunk::split_chunks(session.text()).len());
                }
                "file" => {
                    if arg.is_empty() {
                        session.set_pending_file(None);
                        println!("file selection cleared");
                    } else {
                        session.set_pending_file(Some(arg.to_string()));
                        println!("file selected: {}", arg);
                    }
                }
                "bullets" => {
                    session.set_num_bullets_input(arg);
                    println!("bullets = {}", session.num_bullets());
                }
                "category" => {
                    session.set_category(arg);
                    println!("category set");
                }
                "tab" => match arg {
                    "summary" => {
                        session.set_tab(Tab::Summary);
                        println!("tab: summary");
                    }
                    "qa" => {
                        session.set_tab(Tab::Qa);
                        println!("tab: qa");
                    }
                    _ => println!("usage: :tab summary|qa"),
                },
                "doc" => match session.document_id() {
                    Some(id) => println!("document: {}", id),
                    None => println!("no document ingested yet"),
                },
                "newdoc" => {
                    session.clear_document_id();
                    println!("document identifier cleared");
                }
                "history" | "refresh" => {
                    render::print_history(session.refresh_history());
                }
                "clear" => {
                    session.clear_history();
                    println!("history cleared");
                }
                other => println!("unknown command :{} (try :help)", other),
            }
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        session.set_query(line.trim());
        let result = match session.tab() {
            Tab::Summary => session.summarize().await,
            Tab::Qa => session.qa().await,
        };
        print_notices(&mut session);
        match result {
            Ok(()) => {
                if let Some(resp) = session.summary() {
                    render::print_summary(resp);
                }
                if let Some(resp) = session.qa_result() {
                    render::print_qa(resp);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

fn print_repl_help() {
    println!(":text            enter draft text (terminated by a '.' line)");
    println!(":file <name>     select a file by name (:file to clear; upload unsupported)");
    println!(":bullets <n>     set requested bullet count (invalid input -> 0)");
    println!(":category <c>    set the category to focus on");
    println!(":tab summary|qa  switch the active action");
    println!(":doc             show the current document identifier");
    println!(":newdoc          clear the document identifier");
    println!(":history         show past invocations (newest first)");
    println!(":refresh         re-render the history");
    println!(":clear           clear the history");
    println!(":quit            exit");
}
