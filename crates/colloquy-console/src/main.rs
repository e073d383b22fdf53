//! Colloquy — terminal query console for the customer copilot endpoint.
//!
//! Run with: cargo run -p colloquy-console

mod config;
mod render;

use std::io::Write;
use std::sync::Arc;

use colloquy_client::QueryClient;
use colloquy_session::{SessionManager, Submission};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("colloquy=debug,info")),
        )
        .init();

    info!("Colloquy starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::load()?;
    info!("Endpoint: {}", config.endpoint.base_url);

    let client = QueryClient::new(config.client_config())?;
    let mut session = SessionManager::new(Arc::new(client), config.session_config());

    println!("Ask a question about customer calls. Commands: :copy N, :log, :quit");
    run(&mut session).await
}

async fn run(session: &mut SessionManager) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    prompt();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();

        if let Some(cmd) = input.strip_prefix(':') {
            if !handle_command(session, cmd) {
                break;
            }
            prompt();
            continue;
        }

        // An empty line resubmits the preserved draft after a transport
        // failure; update_draft replaces it otherwise.
        if !input.is_empty() {
            session.update_draft(input);
        }

        match session.submit().await {
            Submission::Recorded => {
                if let Some(record) = session.log().last() {
                    println!("{}", render::render_record(session.log().len(), record, false));
                }
            }
            Submission::TransportFailed => {
                if let Some(err) = session.transient_error() {
                    eprintln!("{}", render::render_transport_error(err));
                }
            }
            Submission::EmptyDraft => {}
            Submission::Busy => {
                eprintln!("a submission is already in flight");
            }
        }
        prompt();
    }

    info!("Session ended: {} exchanges", session.log().len());
    Ok(())
}

/// Handle a `:command` line. Returns false when the session should end.
fn handle_command(session: &SessionManager, cmd: &str) -> bool {
    let mut parts = cmd.split_whitespace();
    match parts.next() {
        Some("quit" | "q") => return false,
        Some("log") => print_log(session),
        Some("copy") => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n >= 1 => match session.log().get(n - 1) {
                Some(record) => {
                    session.copy_response(record);
                    println!("copied #{n}");
                }
                None => println!("no record #{n}"),
            },
            _ => println!("usage: :copy N"),
        },
        _ => println!("commands: :copy N, :log, :quit"),
    }
    true
}

fn print_log(session: &SessionManager) {
    if session.log().is_empty() {
        println!("no exchanges yet");
        return;
    }
    let stale_after = session.config().stale_after;
    for (i, record) in session.log().records().iter().enumerate() {
        println!("{}", render::render_record(i + 1, record, record.is_stale(stale_after)));
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
