//! Prompt assembly: fragments into containers into the three output
//! strings, plus the shell-source snippet that carries them.

use crate::color::Color;
use crate::compose::{RULE_CHAR, embed_in_horizontal_rule};
use crate::context::RenderContext;
use crate::fragment::{Container, builders};
use crate::git::{self, GitState};

/// The three rendered strings of one prompt draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOutput {
    pub topline: String,
    pub prompt: String,
    pub rprompt: String,
}

impl PromptOutput {
    /// The fixed three-statement snippet the shell sources.
    ///
    /// Single quotes in the top line are spliced as `'\''` so a
    /// shell-escaped last command cannot terminate the `echo` quoting;
    /// double quotes in the prompt strings are escaped for the
    /// double-quoted exports.
    pub fn shell_snippet(&self) -> String {
        format!(
            "function topline(){{\n    echo '{}'\n}};\ntopline;\nexport PROMPT=\"{}\";\nexport RPROMPT=\"{}\";\nexport LAST_CMD=\"\"\n",
            self.topline.replace('\'', "'\\''"),
            self.prompt.replace('"', "\\\""),
            self.rprompt.replace('"', "\\\""),
        )
    }
}

/// Render the full prompt for `ctx`.
///
/// Never fails: a git probe error (not a repository, timeout) degrades
/// to an empty badge and the rest of the prompt still renders.
pub fn render(ctx: &RenderContext) -> PromptOutput {
    let state = match git::probe(&ctx.pwd) {
        Ok(state) => Some(state),
        Err(e) => {
            log::debug!("git probe for {:?} skipped: {e}", ctx.pwd);
            None
        }
    };
    render_with_git(ctx, state.as_ref())
}

/// Render with an already-classified git state. Tests supply canned
/// states here instead of mocking subprocesses.
pub fn render_with_git(ctx: &RenderContext, state: Option<&GitState>) -> PromptOutput {
    let left = Container::new(
        "",
        vec![
            builders::git_badge(state, Color::Blue),
            builders::last_command(&ctx.last_cmd, Color::Green),
        ],
    );
    let center = Container::new(
        RULE_CHAR.to_string(),
        vec![builders::directory(
            &ctx.pwd,
            &ctx.home,
            builders::DEFAULT_MAX_DIR_LEN,
            Color::Teal,
        )],
    );
    let right = Container::new(
        RULE_CHAR.to_string(),
        vec![builders::clock(ctx.now, Color::Gray)],
    );
    let topline =
        embed_in_horizontal_rule(ctx.columns, left, center, right, RULE_CHAR, ctx.no_color);

    let prompt = Container::new(
        "",
        vec![
            builders::virtual_env(&ctx.virtual_env, "🐍", Color::Teal),
            builders::virtual_env(&ctx.node_virtual_env, "⬡ ", Color::Green),
            builders::text("➤ ", Color::Red),
        ],
    )
    .render(ctx.no_color);

    let rprompt = builders::return_status(ctx.last_exit_code, Color::Red).render(ctx.no_color);

    PromptOutput {
        topline,
        prompt,
        rprompt,
    }
}
