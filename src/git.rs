//! Git repository state for the prompt badge.
//!
//! Classification is pure text processing over the output of
//! `git branch`, `git status -s --porcelain=v1`, and `git tag`; the
//! probe layer runs those commands with a bounded timeout. A probe
//! failure is an expected condition (most directories are not
//! repositories) and the caller maps it to an empty fragment.

use std::fmt;
use std::io::ErrorKind;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::shell_exec::Cmd;

/// Per-invocation timeout for git commands.
pub const GIT_CMD_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitError {
    /// The directory is not inside a repository, does not exist, or git
    /// itself failed.
    NotARepository,
    /// A git invocation exceeded [`GIT_CMD_TIMEOUT`].
    TimedOut,
}

impl fmt::Display for GitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitError::NotARepository => write!(f, "not a git repository"),
            GitError::TimedOut => write!(f, "git command timed out"),
        }
    }
}

impl std::error::Error for GitError {}

/// Classified repository state: a head descriptor and the modifier
/// glyphs summarizing uncommitted changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitState {
    /// `(B) <branch>`, `(D) <name>`, or `(T) <name>`.
    pub head: String,
    /// Character-sorted glyphs, at most one per change bucket; empty
    /// when the working tree is clean.
    pub modifiers: String,
}

impl GitState {
    /// Badge text, e.g. `[(B) main|!+|]` or `[(T) v1.2.3]`.
    pub fn badge(&self) -> String {
        if self.modifiers.is_empty() {
            format!("[{}]", self.head)
        } else {
            format!("[{}|{}|]", self.head, self.modifiers)
        }
    }
}

fn detached_head_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\* \(HEAD detached at (.*)\)").expect("detached HEAD pattern is valid")
    })
}

fn current_branch_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\* (.*)").expect("branch pattern is valid"))
}

/// One bucket per change class; a bucket yields its glyph once no
/// matter how many status lines fall into it.
fn modifier_buckets() -> &'static [(Regex, char)] {
    static BUCKETS: OnceLock<Vec<(Regex, char)>> = OnceLock::new();
    BUCKETS.get_or_init(|| {
        [
            (r"(?m)^\s?A  .*$", '+'),
            (r"(?m)^\s?M .*$", '!'),
            (r"(?m)^\s?D .*$", '-'),
            (r"(?m)^\?\? .*$", '?'),
        ]
        .into_iter()
        .map(|(pattern, glyph)| {
            (
                Regex::new(pattern).expect("status pattern is valid"),
                glyph,
            )
        })
        .collect()
    })
}

/// Head descriptor from a `git branch` listing.
///
/// Precedence: a detached HEAD line wins (classified as tag or plain
/// commit by membership in the tag listing), then the starred branch,
/// then the fresh-repository fallback `(B) master`.
pub fn classify_head(branch_listing: &str, tag_listing: &str) -> String {
    if let Some(captures) = detached_head_re().captures(branch_listing) {
        let name = &captures[1];
        let marker = if tag_listing.contains(name) { "(T)" } else { "(D)" };
        return format!("{marker} {name}");
    }
    if let Some(captures) = current_branch_re().captures(branch_listing) {
        return format!("(B) {}", &captures[1]);
    }
    "(B) master".to_string()
}

/// Modifier glyphs for a short-format status listing: one glyph per
/// matched bucket, sorted by character.
pub fn classify_modifiers(status_listing: &str) -> String {
    let mut glyphs: Vec<char> = modifier_buckets()
        .iter()
        .filter(|(re, _)| re.is_match(status_listing))
        .map(|&(_, glyph)| glyph)
        .collect();
    glyphs.sort_unstable();
    glyphs.into_iter().collect()
}

/// Run the git commands in `dir` and classify the result. The tag
/// listing is only fetched when HEAD is detached.
pub fn probe(dir: &str) -> Result<GitState, GitError> {
    let branches = run_git(dir, &["branch"])?;
    let status = run_git(dir, &["status", "-s", "--porcelain=v1"])?;
    let tags = if detached_head_re().is_match(&branches) {
        run_git(dir, &["tag"])?
    } else {
        String::new()
    };
    Ok(GitState {
        head: classify_head(&branches, &tags),
        modifiers: classify_modifiers(&status),
    })
}

fn run_git(dir: &str, args: &[&str]) -> Result<String, GitError> {
    let output = Cmd::new("git")
        .args(args.iter().copied())
        .current_dir(dir)
        .timeout(GIT_CMD_TIMEOUT)
        .run()
        .map_err(|e| match e.kind() {
            ErrorKind::TimedOut => GitError::TimedOut,
            _ => GitError::NotARepository,
        })?;
    if !output.status.success() {
        return Err(GitError::NotARepository);
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("* main\n", "", "(B) main")]
    #[case("  develop\n* feature/x\n  main\n", "", "(B) feature/x")]
    #[case("", "", "(B) master")]
    #[case("* (HEAD detached at v1.2.3)\n", "v1.0.0\nv1.2.3\n", "(T) v1.2.3")]
    #[case("* (HEAD detached at v1.2.3)\n", "v1.0.0\n", "(D) v1.2.3")]
    #[case("* (HEAD detached at abc1234)\n  main\n", "", "(D) abc1234")]
    fn test_classify_head(
        #[case] branches: &str,
        #[case] tags: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(classify_head(branches, tags), expected);
    }

    #[test]
    fn test_detached_line_wins_over_other_branches() {
        let listing = "  main\n* (HEAD detached at 1a2b3c4)\n  develop\n";
        assert_eq!(classify_head(listing, ""), "(D) 1a2b3c4");
    }

    #[test]
    fn test_modifiers_sorted_and_wrapped() {
        let status = "A  new.txt\n M changed.txt\n?? untracked.txt\n";
        assert_eq!(classify_modifiers(status), "!+?");
        let state = GitState {
            head: "(B) main".to_string(),
            modifiers: classify_modifiers(status),
        };
        assert_eq!(state.badge(), "[(B) main|!+?|]");
    }

    #[test]
    fn test_each_bucket_contributes_once() {
        let status = "A  one.txt\nA  two.txt\nA  three.txt\n";
        assert_eq!(classify_modifiers(status), "+");
    }

    #[rstest]
    #[case("M  staged.rs\n", "!")]
    #[case(" M unstaged.rs\n", "!")]
    #[case("D  gone.rs\n", "-")]
    #[case(" D gone.rs\n", "-")]
    #[case("?? stray.rs\n", "?")]
    #[case("", "")]
    fn test_modifier_buckets(#[case] status: &str, #[case] expected: &str) {
        assert_eq!(classify_modifiers(status), expected);
    }

    #[test]
    fn test_mixed_modifiers_character_order() {
        let status = " D removed.txt\n M edited.txt\n";
        assert_eq!(classify_modifiers(status), "!-");
    }

    #[test]
    fn test_clean_tree_badge_has_no_bars() {
        let state = GitState {
            head: "(B) main".to_string(),
            modifiers: String::new(),
        };
        assert_eq!(state.badge(), "[(B) main]");
    }

    #[test]
    fn test_probe_nonexistent_directory() {
        assert_eq!(
            probe("/nonexistent/directory/for/test"),
            Err(GitError::NotARepository)
        );
    }

    #[test]
    fn test_probe_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let result = probe(&dir.path().display().to_string());
        assert_eq!(result, Err(GitError::NotARepository));
    }
}
