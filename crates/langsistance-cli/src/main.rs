//! Langsistance CLI - terminal chat client for the agent backend.
//!
//! This is the entry point for the `lsx` binary.

mod command;
mod render;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;

use langsistance_core::MessageKind;
use langsistance_sync::{HttpBackend, SessionState, SyncConfig, SyncEvent, SyncSession};

use command::{Command, HELP};

/// Langsistance CLI - chat with the agent backend from a terminal.
#[derive(Parser, Debug)]
#[command(name = "lsx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Agent backend URL.
    #[arg(
        long,
        env = "LANGSISTANCE_BACKEND_URL",
        default_value = "http://localhost:8000"
    )]
    backend: String,

    /// Milliseconds between health/answer polls.
    #[arg(long, env = "LANGSISTANCE_POLL_INTERVAL_MS", default_value_t = 3_000)]
    interval_ms: u64,

    /// Request timeout in seconds.
    #[arg(long, env = "LANGSISTANCE_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Ask the backend to speak its answers.
    #[arg(long, env = "LANGSISTANCE_TTS_ENABLED")]
    tts: bool,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,
}

impl Args {
    fn config(&self) -> SyncConfig {
        SyncConfig {
            poll_interval_ms: self.interval_ms,
            request_timeout_secs: self.timeout_secs,
            tts_enabled: self.tts,
            ..SyncConfig::new(&self.backend)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging on stderr so chat output stays readable
    let filter = if args.debug {
        EnvFilter::new("langsistance_sync=debug,langsistance_cli=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Create session
    let config = args.config();
    let backend = HttpBackend::new(&config)?;
    let mut session = SyncSession::new(backend, config);

    let events = session.state().subscribe();
    let printer = tokio::spawn(print_events(Arc::clone(session.state()), events));

    session.start();
    println!("Connected to {}. Type /help for commands.", session.config().base_url());

    let result = run_input_loop(&session).await;

    // Cleanup: stop polling before leaving
    session.shutdown().await;
    printer.abort();

    result
}

/// Read commands from stdin until EOF or `/quit`.
async fn run_input_loop(session: &SyncSession<HttpBackend>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Query(query) => {
                // Submit in the background so polling output keeps flowing
                let controller = session.controller();
                tokio::spawn(async move {
                    controller.submit(&query).await;
                });
            }
            Command::Stop => session.request_stop().await,
            Command::ToggleReasoning(id) => match session.state().toggle_reasoning(id) {
                Ok(expanded) => {
                    if let Some(message) = session.state().message(id) {
                        println!("{}", render::message(&message, expanded));
                    }
                }
                Err(e) => eprintln!("{e}"),
            },
            Command::Status => {
                let state = session.state();
                println!(
                    "{}",
                    render::status_line(&state.sync_status(), &state.status_text())
                );
            }
            Command::History => {
                let conversation = session.state().conversation();
                if conversation.is_empty() {
                    println!("No messages yet.");
                }
                for message in conversation.messages() {
                    let expanded = conversation.is_reasoning_expanded(message.id);
                    println!("{}", render::message(message, expanded));
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Nothing => {}
            Command::Invalid(reason) => eprintln!("{reason}"),
        }
    }

    Ok(())
}

/// Print session events as they arrive.
async fn print_events(state: Arc<SessionState>, mut events: broadcast::Receiver<SyncEvent>) {
    loop {
        match events.recv().await {
            Ok(SyncEvent::MessageAppended { id, kind }) => {
                // The user already sees what they typed
                if kind == MessageKind::User {
                    continue;
                }
                let expanded = state.conversation().is_reasoning_expanded(id);
                if let Some(message) = state.message(id) {
                    println!("{}", render::message(&message, expanded));
                }
            }
            Ok(SyncEvent::StatusChanged(status)) => println!("  ... {status}"),
            Ok(SyncEvent::ConnectivityChanged { online: true }) => println!("Backend online."),
            Ok(SyncEvent::ConnectivityChanged { online: false }) => {
                println!("System offline. Deploy the backend first.");
            }
            Ok(SyncEvent::BusyChanged { .. }) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event printer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
