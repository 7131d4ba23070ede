//! CLI command execution.
//!
//! This is the presentation layer: it only reads session snapshots and
//! forwards input into `submit` / `reset`, so all transcript logic stays in
//! the session core.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::models::{Message, Sender};
use crate::reply::HttpReplyService;
use crate::server;
use crate::session::{ChatSession, SubmitOutcome};

use super::args::{Cli, Commands};

pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        None | Some(Commands::Chat) => run_chat(&cli.server).await,
        Some(Commands::Send { message }) => {
            let message = message.join(" ");
            send_once(&cli.server, &message).await
        }
        Some(Commands::Serve {
            port,
            api_key,
            model,
        }) => {
            let api_key = api_key
                .or_else(|| std::env::var("GEMINI_API_KEY").ok())
                .context("Gemini API key required: pass --api-key or set GEMINI_API_KEY")?;
            server::start_server(port, api_key, model).await
        }
    }
}

/// Interactive chat REPL.
async fn run_chat(server_url: &str) -> Result<()> {
    let session = Arc::new(ChatSession::new(HttpReplyService::new(server_url)));

    println!("Parley - type a message, /clear to reset, /quit to exit");
    println!();

    let mut rendered = render_new(&session, 0).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.reset().await;
                println!();
                rendered = render_new(&session, 0).await;
            }
            _ => {
                rendered = run_turn(&session, &line, rendered).await?;
            }
        }
    }

    let count = session.snapshot().await.transcript.len();
    println!("Messages: {count}");
    Ok(())
}

/// Submit one turn and render entries as they appear, with a typing
/// placeholder while the reply is outstanding.
async fn run_turn(
    session: &Arc<ChatSession<HttpReplyService>>,
    line: &str,
    mut rendered: usize,
) -> Result<usize> {
    let submit = {
        let session = session.clone();
        let line = line.to_string();
        tokio::spawn(async move { session.submit(&line).await })
    };

    println!();
    let mut shown_typing = false;
    loop {
        rendered = render_new(session, rendered).await;
        if submit.is_finished() {
            break;
        }
        if !shown_typing && session.snapshot().await.pending {
            println!("AI is typing...");
            println!();
            shown_typing = true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let outcome = submit.await.context("submit task panicked")?;
    rendered = render_new(session, rendered).await;

    if outcome != SubmitOutcome::Completed {
        // Empty input: nothing was appended, nothing to render.
        tracing::debug!(?outcome, "input ignored");
    }
    Ok(rendered)
}

/// One-shot: submit a single message and print only the reply text.
async fn send_once(server_url: &str, message: &str) -> Result<()> {
    let session = ChatSession::new(HttpReplyService::new(server_url));

    match session.submit(message).await {
        SubmitOutcome::Completed => {
            let snap = session.snapshot().await;
            let reply = snap
                .transcript
                .last()
                .context("transcript is never empty")?;
            println!("{}", reply.text);
            Ok(())
        }
        SubmitOutcome::IgnoredEmpty => bail!("Message is required for send command"),
        SubmitOutcome::IgnoredBusy => bail!("A request is already outstanding"),
    }
}

/// Render transcript entries past `rendered`, returning the new count.
async fn render_new<S: crate::reply::ReplyService>(
    session: &ChatSession<S>,
    rendered: usize,
) -> usize {
    let snap = session.snapshot().await;
    for msg in &snap.transcript[rendered.min(snap.transcript.len())..] {
        render_message(msg);
    }
    snap.transcript.len()
}

/// Render one transcript entry.
fn render_message(msg: &Message) {
    let label = match msg.sender {
        Sender::User => "You",
        Sender::Bot => "AI",
    };
    let time = msg.time.with_timezone(&Local).format("%H:%M");
    println!("{label} [{time}]");
    println!("{}", msg.text);
    println!();
}
