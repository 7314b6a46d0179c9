// Interactive terminal chat over the same session logic the web UI uses.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::conversation::SubmitError;
use crate::resolver::MessageResolver;
use crate::session::{ChatSession, Step};

pub async fn run_chat<R, W>(
    resolver: Arc<MessageResolver>,
    greeting: String,
    input: R,
    output: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Starting terminal chat...");
    let mut session = ChatSession::new(resolver, greeting.clone());
    write_line(output, &format!("bot> {}", greeting)).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read chat input")? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/theme" => {
                let theme = if session.toggle_theme() { "dark" } else { "light" };
                write_line(output, &format!("(theme: {})", theme)).await?;
                continue;
            }
            _ => {}
        }

        match session.handle_input(&line) {
            Step::Rejected(SubmitError::Empty) => {}
            Step::Rejected(e) => write_line(output, &format!("({})", e)).await?,
            Step::Answered { reply, .. } => {
                write_line(output, &format!("bot> {}", reply.text)).await?;
            }
            Step::Pending { request, .. } => {
                write_line(output, "bot> Typing…").await?;
                let reply = session.finish(request.resolve().await);
                write_line(output, &format!("bot> {}", reply.text)).await?;
            }
        }
    }

    info!(messages = session.state().transcript().len(), "Chat session finished");
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<()> {
    output
        .write_all(format!("{}\n", line).as_bytes())
        .await
        .context("Failed to write chat output")?;
    output.flush().await.context("Failed to flush chat output")?;
    Ok(())
}
