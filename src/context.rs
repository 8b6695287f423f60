//! Render inputs, gathered once per invocation.
//!
//! One-shot mode reads the process's own environment; server mode
//! builds the same structure from a client-supplied key/value map. The
//! context is read-only for the duration of a render and nothing is
//! shared between renders.

use std::collections::HashMap;
use std::env;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Local};

/// Terminal width assumed when none is supplied.
pub const DEFAULT_COLUMNS: usize = 80;

/// Read-only inputs for one prompt render.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub pwd: String,
    /// Home directory, for `~` substitution in the directory fragment.
    pub home: String,
    pub last_cmd: String,
    pub last_exit_code: i32,
    /// `VIRTUAL_ENV` path; empty when no environment is active.
    pub virtual_env: String,
    /// `NODE_VIRTUAL_ENV` path; empty when no environment is active.
    pub node_virtual_env: String,
    pub columns: usize,
    pub now: DateTime<Local>,
    /// Forces identity colorize output (`NO_COLOR` convention).
    pub no_color: bool,
}

impl RenderContext {
    /// Context for a one-shot render from the process's own environment.
    ///
    /// Fails only on a present-but-malformed `LAST_EXIT_CODE`; a missing
    /// variable falls back to its default.
    pub fn from_env() -> Result<Self> {
        let columns = terminal_size::terminal_size()
            .map(|(terminal_size::Width(w), _)| w as usize)
            .unwrap_or(DEFAULT_COLUMNS);
        Ok(Self {
            pwd: env::var("PWD").unwrap_or_default(),
            home: home_dir(),
            last_cmd: env::var("LAST_CMD").unwrap_or_default(),
            last_exit_code: parse_or_default(env::var("LAST_EXIT_CODE").ok(), 0, "LAST_EXIT_CODE")?,
            virtual_env: env::var("VIRTUAL_ENV").unwrap_or_default(),
            node_virtual_env: env::var("NODE_VIRTUAL_ENV").unwrap_or_default(),
            columns,
            now: Local::now(),
            no_color: no_color_requested(env::var("NO_COLOR").ok().as_deref()),
        })
    }

    /// Context for a server-side render from a client environment map.
    ///
    /// `COLS` defaults to 80 and `LAST_EXIT_CODE` to 0 when absent. A
    /// present but non-numeric value fails this render only; the caller
    /// drops the connection and the listener keeps running.
    pub fn from_client_env(client_env: &HashMap<String, String>, now: DateTime<Local>) -> Result<Self> {
        let get = |key: &str| client_env.get(key).cloned().unwrap_or_default();
        Ok(Self {
            pwd: get("PWD"),
            home: match client_env.get("HOME") {
                Some(home) if !home.is_empty() => home.clone(),
                _ => home_dir(),
            },
            last_cmd: get("LAST_CMD"),
            last_exit_code: parse_or_default(
                client_env.get("LAST_EXIT_CODE").cloned(),
                0,
                "LAST_EXIT_CODE",
            )?,
            virtual_env: get("VIRTUAL_ENV"),
            node_virtual_env: get("NODE_VIRTUAL_ENV"),
            columns: parse_or_default(client_env.get("COLS").cloned(), DEFAULT_COLUMNS, "COLS")?,
            now,
            no_color: no_color_requested(client_env.get("NO_COLOR").map(String::as_str)),
        })
    }
}

/// Parse a client payload of NUL-separated `KEY=VALUE` pairs. A pair
/// without `=` is logged and skipped, never fatal.
pub fn parse_client_payload(payload: &[u8]) -> HashMap<String, String> {
    let text = String::from_utf8_lossy(payload);
    let mut client_env = HashMap::new();
    for pair in text.split('\0') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => {
                client_env.insert(key.to_string(), value.to_string());
            }
            None => log::warn!("skipping malformed environment pair: {pair:?}"),
        }
    }
    client_env
}

fn parse_or_default<T>(value: Option<String>, default: T, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key} value: {raw:?}")),
    }
}

/// `NO_COLOR` is honored when present and non-empty.
fn no_color_requested(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn home_dir() -> String {
    env::var("HOME")
        .ok()
        .filter(|home| !home.is_empty())
        .or_else(|| dirs::home_dir().map(|p| p.display().to_string()))
        .unwrap_or_else(|| format!("/home/{}", env::var("USER").unwrap_or_default()))
}
