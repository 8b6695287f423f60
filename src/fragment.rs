//! Fragment and container data model for prompt content.

use crate::color::Color;

pub mod builders;

/// Smallest named piece of prompt content: raw text, a color, and a
/// declared display width that is independent of escape decoration.
///
/// The declared width defaults to the character count of the content and
/// never accounts for escape sequences; this is what keeps the top-line
/// centering math immune to how much color decoration a fragment
/// carries. Constructors may override it (see
/// [`builders::last_command`]).
#[derive(Debug, Clone)]
pub struct Fragment {
    content: String,
    color: Color,
    zero_width: bool,
    width: usize,
}

impl Fragment {
    /// Fragment rendered in zero-width color mode (the default; the
    /// compositor switches top-line fragments to raw mode).
    pub fn new(content: impl Into<String>, color: Color) -> Self {
        let content = content.into();
        let width = content.chars().count();
        Self {
            content,
            color,
            zero_width: true,
            width,
        }
    }

    /// Fragment with no content; contributes nothing to any container.
    pub fn empty() -> Self {
        Self::new("", Color::Default)
    }

    /// Override the declared width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Declared width in characters. Always 0 for empty content.
    pub fn display_width(&self) -> usize {
        if self.content.is_empty() { 0 } else { self.width }
    }

    /// Switch between zero-width and raw escape rendering.
    pub fn set_zero_width(&mut self, zero_width: bool) {
        self.zero_width = zero_width;
    }

    /// Colored rendering of the content.
    pub fn render(&self, no_color: bool) -> String {
        self.color.paint(&self.content, self.zero_width, no_color)
    }
}

/// Ordered, separator-joined group of fragments.
///
/// Fragments with empty content are excluded from both joins. The
/// separator does not count towards `display_width` (preserved source
/// behavior; the top line's fill math relies on it).
#[derive(Debug, Clone)]
pub struct Container {
    separator: String,
    fragments: Vec<Fragment>,
}

impl Container {
    pub fn new(separator: impl Into<String>, fragments: Vec<Fragment>) -> Self {
        Self {
            separator: separator.into(),
            fragments,
        }
    }

    /// Sum of the member fragments' declared widths.
    pub fn display_width(&self) -> usize {
        self.fragments.iter().map(Fragment::display_width).sum()
    }

    /// Separator-joined colored rendering of the non-empty fragments.
    pub fn render(&self, no_color: bool) -> String {
        self.fragments
            .iter()
            .filter(|f| !f.is_empty())
            .map(|f| f.render(no_color))
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    /// Separator-joined raw contents, no escape sequences.
    pub fn render_plain(&self) -> String {
        self.fragments
            .iter()
            .filter(|f| !f.is_empty())
            .map(|f| f.content().to_string())
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    /// Switch every member fragment between zero-width and raw mode.
    pub fn set_zero_width(&mut self, zero_width: bool) {
        for fragment in &mut self.fragments {
            fragment.set_zero_width(zero_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fragment_has_zero_width() {
        assert_eq!(Fragment::empty().display_width(), 0);
        // A width override on empty content still reports 0
        assert_eq!(Fragment::empty().with_width(7).display_width(), 0);
    }

    #[test]
    fn test_display_width_counts_characters_not_bytes() {
        let f = Fragment::new("3 ⏎", Color::Red);
        assert_eq!(f.display_width(), 3);
    }

    #[test]
    fn test_width_override() {
        let f = Fragment::new("['long escaped text']", Color::Green).with_width(10);
        assert_eq!(f.display_width(), 10);
    }

    #[test]
    fn test_render_is_identity_for_default_color() {
        let f = Fragment::new("plain", Color::Default);
        assert_eq!(f.render(false), "plain");
    }

    #[test]
    fn test_container_width_ignores_separator_and_empties() {
        let c = Container::new(
            "~~~",
            vec![
                Fragment::new("ab", Color::Default),
                Fragment::empty(),
                Fragment::new("cde", Color::Blue),
            ],
        );
        assert_eq!(c.display_width(), 5, "separator must not count");
    }

    #[test]
    fn test_container_join_skips_empty_fragments() {
        let c = Container::new(
            "-",
            vec![
                Fragment::new("a", Color::Default),
                Fragment::empty(),
                Fragment::new("b", Color::Default),
            ],
        );
        assert_eq!(c.render(false), "a-b");
        assert_eq!(c.render_plain(), "a-b");
    }

    #[test]
    fn test_render_plain_never_contains_escape_text() {
        let c = Container::new(
            "",
            vec![
                Fragment::new("red", Color::Red),
                Fragment::new("blue", Color::Blue),
            ],
        );
        let plain = c.render_plain();
        assert!(!plain.contains("\\e["), "plain render leaked escapes: {plain}");
        assert!(!plain.contains("%{"));
    }

    #[test]
    fn test_zero_width_toggle_changes_rendering() {
        let mut c = Container::new("", vec![Fragment::new("x", Color::Teal)]);
        assert!(c.render(false).contains("%{"));
        c.set_zero_width(false);
        let raw = c.render(false);
        assert!(!raw.contains("%{"));
        assert!(raw.contains("\\e[38;5;6m"));
    }
}
