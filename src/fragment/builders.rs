//! Domain fragment constructors.
//!
//! Each is a pure function of explicit inputs so tests can feed
//! synthetic values. Missing or empty input produces an empty fragment,
//! which then vanishes from any container it is placed in.

use std::borrow::Cow;

use chrono::{DateTime, Local};

use crate::color::Color;
use crate::fragment::Fragment;
use crate::git::GitState;

/// Paths longer than this are shortened from the left.
pub const DEFAULT_MAX_DIR_LEN: usize = 60;

/// Working directory as `(<path>)` with the home prefix abbreviated to
/// `~` and long paths truncated from the left, keeping the tail.
pub fn directory(pwd: &str, home: &str, max_len: usize, color: Color) -> Fragment {
    if pwd.is_empty() {
        return Fragment::empty();
    }
    Fragment::new(format!("({})", shorten_path(pwd, home, max_len)), color)
}

fn shorten_path(pwd: &str, home: &str, max_len: usize) -> String {
    let path = if !home.is_empty() && pwd.starts_with(home) {
        format!("~{}", &pwd[home.len()..])
    } else {
        pwd.to_string()
    };

    let len = path.chars().count();
    if len <= max_len {
        return path;
    }
    let keep = max_len.saturating_sub(3);
    let tail: String = path.chars().skip(len - keep).collect();
    format!("...{tail}")
}

/// Last executed command as `['<escaped>']`.
///
/// The command is shell-escaped (with backslashes doubled for the
/// echo round-trip) so re-emitting it as a literal is safe whatever
/// quotes or metacharacters it contains. The declared width is the
/// length of the *unescaped* command plus the two enclosing brackets;
/// escaping inflation deliberately does not shift the top-line
/// centering.
pub fn last_command(raw: &str, color: Color) -> Fragment {
    if raw.is_empty() {
        return Fragment::empty();
    }
    let escaped = shell_escape::unix::escape(Cow::Borrowed(raw)).replace('\\', r"\\");
    Fragment::new(format!("['{escaped}']"), color).with_width(raw.chars().count() + 2)
}

/// Active environment as `[<glyph><name>]` where `name` is the last
/// segment of the environment path. Used for both the Python virtualenv
/// (`🐍`) and the node equivalent (`⬡ `).
pub fn virtual_env(env_path: &str, glyph: &str, color: Color) -> Fragment {
    if env_path.is_empty() {
        return Fragment::empty();
    }
    let name = env_path.rsplit('/').next().unwrap_or(env_path);
    Fragment::new(format!("[{glyph}{name}]"), color)
}

/// Local wall-clock time as `[HH:MM:SS]`.
pub fn clock(now: DateTime<Local>, color: Color) -> Fragment {
    Fragment::new(now.format("[%H:%M:%S]").to_string(), color)
}

/// Exit code of the last command as `<code> ⏎`; empty for success.
pub fn return_status(exit_code: i32, color: Color) -> Fragment {
    if exit_code == 0 {
        Fragment::empty()
    } else {
        Fragment::new(format!("{exit_code} ⏎"), color)
    }
}

/// Literal colored text, e.g. the trailing prompt arrow.
pub fn text(s: &str, color: Color) -> Fragment {
    Fragment::new(s, color)
}

/// Git badge `[<head><modifiers>]`; a failed probe maps to `None` and
/// yields an empty fragment, never an error.
pub fn git_badge(state: Option<&GitState>, color: Color) -> Fragment {
    match state {
        Some(state) => Fragment::new(state.badge(), color),
        None => Fragment::empty(),
    }
}
