//! Unix-socket prompt server.
//!
//! A client connects, writes its entire environment as NUL-separated
//! `KEY=VALUE` pairs, and half-closes; the server replies with the
//! rendered shell snippet and closes the connection. Each connection
//! runs as its own task on a single-threaded runtime, so a slow git
//! probe stalls only the connection that triggered it. No state is
//! shared between connections.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::Local;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};

use crate::context::{RenderContext, parse_client_payload};
use crate::render;

/// Upper bound on a client environment payload.
const MAX_PAYLOAD_BYTES: u64 = 100_000_000;

/// Default socket path under the user runtime directory.
pub fn default_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("promptline.socket")
}

/// Bind and serve until the process is terminated.
///
/// A bind failure is fatal and reported to the caller; per-connection
/// errors are logged and the listener keeps running.
pub async fn run(socket: &Path) -> Result<()> {
    // A socket file left behind by a previous run would fail the bind
    if socket.exists() {
        std::fs::remove_file(socket)
            .with_context(|| format!("failed to remove stale socket {}", socket.display()))?;
    }
    let listener = UnixListener::bind(socket)
        .with_context(|| format!("failed to bind {}", socket.display()))?;
    log::info!("listening on {}", socket.display());

    loop {
        let (stream, _) = listener.accept().await.context("accept failed")?;
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream).await {
                log::warn!("connection failed: {e:#}");
            }
        });
    }
}

/// Serve one connection: read the environment payload to completion,
/// render, reply, close. Reads, render, and the single write are
/// strictly sequential within the connection.
async fn handle_client(mut stream: UnixStream) -> Result<()> {
    let mut payload = Vec::new();
    (&mut stream)
        .take(MAX_PAYLOAD_BYTES)
        .read_to_end(&mut payload)
        .await
        .context("failed to read client environment")?;

    let client_env = parse_client_payload(&payload);
    let ctx = RenderContext::from_client_env(&client_env, Local::now())?;

    // The git probe blocks on subprocesses; hand it to the blocking
    // pool so other connections keep being accepted meanwhile.
    let output = tokio::task::spawn_blocking(move || render::render(&ctx))
        .await
        .context("render task failed")?;

    stream
        .write_all(output.shell_snippet().as_bytes())
        .await
        .context("failed to write reply")?;
    let _ = stream.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    #[tokio::test]
    async fn test_round_trip_over_the_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("prompt.socket");
        let server_socket = socket.clone();
        tokio::spawn(async move {
            let _ = run(&server_socket).await;
        });

        // The listener binds asynchronously; retry until it is up
        let mut client = loop {
            match UnixStream::connect(&socket).await {
                Ok(stream) => break stream,
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        };

        let payload = "PWD=/nonexistent/prompt/test\0COLS=40\0LAST_EXIT_CODE=7\0NO_COLOR=1";
        client.write_all(payload.as_bytes()).await.unwrap();
        client.shutdown().await.unwrap();

        let mut reply = String::new();
        client.read_to_string(&mut reply).await.unwrap();
        assert!(reply.starts_with("function topline(){"));
        assert!(reply.contains("export PROMPT=\"➤ \";"));
        assert!(reply.contains("export RPROMPT=\"7 ⏎\";"));
        assert!(reply.ends_with("export LAST_CMD=\"\"\n"));
    }

    #[tokio::test]
    async fn test_malformed_integer_drops_the_connection_silently() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("prompt.socket");
        let server_socket = socket.clone();
        tokio::spawn(async move {
            let _ = run(&server_socket).await;
        });

        let mut client = loop {
            match UnixStream::connect(&socket).await {
                Ok(stream) => break stream,
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        };

        client.write_all(b"COLS=not-a-number").await.unwrap();
        client.shutdown().await.unwrap();

        let mut reply = String::new();
        client.read_to_string(&mut reply).await.unwrap();
        assert!(reply.is_empty(), "no snippet for a corrupt payload");

        // The listener survives and serves the next client
        let mut second = UnixStream::connect(&socket).await.unwrap();
        second.write_all(b"COLS=20\0NO_COLOR=1").await.unwrap();
        second.shutdown().await.unwrap();
        let mut reply = String::new();
        second.read_to_string(&mut reply).await.unwrap();
        assert!(reply.contains("export PROMPT="));
    }
}
