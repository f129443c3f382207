//! Line-delimited JSON lint worker over stdio.
//!
//! Each input line is one [`WorkerRequest`]. Lint requests run on the
//! blocking pool and their responses are written as soon as they finish, so
//! output order follows completion order rather than input order.

use anyhow::{Context, Result};
use mcql_core::protocol::{decode_request, encode_response, handle_message, request_id_hint};
use mcql_core::{Linter, SystemClock, WorkerRequest, WorkerResponse};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;

/// Serves requests from `input` until EOF, returning `output` once every
/// response has been written.
pub async fn serve<R, W>(linter: Arc<Linter>, input: R, output: W) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_responses(rx, output));
    let mut tasks = JoinSet::new();
    let mut lines = input.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read worker input")?
    {
        reap_finished(&mut tasks);
        if line.trim().is_empty() {
            continue;
        }
        match decode_request(&line) {
            Ok(WorkerRequest::Init) => {
                send(&tx, handle_message(&linter, WorkerRequest::Init, &SystemClock));
            }
            Ok(WorkerRequest::Lint { request_id, sql }) => {
                let linter = Arc::clone(&linter);
                let tx = tx.clone();
                tasks.spawn(async move {
                    let id = request_id.clone();
                    let response = tokio::task::spawn_blocking(move || {
                        let request = WorkerRequest::Lint { request_id, sql };
                        handle_message(&linter, request, &SystemClock)
                    })
                    .await
                    .unwrap_or_else(|err| {
                        WorkerResponse::error(Some(id), format!("lint task failed: {err}"))
                    });
                    send(&tx, response);
                });
            }
            Err(err) => {
                send(&tx, WorkerResponse::error(request_id_hint(&line), err.to_string()));
            }
        }
    }

    while tasks.join_next().await.is_some() {}
    drop(tx);

    writer.await.context("Worker output task failed")?
}

/// Drops completed lint tasks so a long-lived worker does not accumulate them.
fn reap_finished(tasks: &mut JoinSet<()>) {
    while tasks.try_join_next().is_some() {}
}

fn send(tx: &UnboundedSender<WorkerResponse>, response: WorkerResponse) {
    // The receiver only goes away after a write error, which `serve` reports.
    let _ = tx.send(response);
}

async fn write_responses<W>(mut rx: UnboundedReceiver<WorkerResponse>, mut output: W) -> Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = encode_response(&response)?;
        line.push('\n');
        output
            .write_all(line.as_bytes())
            .await
            .context("Failed to write worker output")?;
        output.flush().await.context("Failed to flush worker output")?;
    }
    Ok(output)
}
