//! Terminal color model for prompt fragments.
//!
//! Each color is bound to a fixed 256-color palette index and rendered as
//! a `\e[38;5;<idx>m` escape. The `\e` is emitted as literal text; the
//! shell expands it when the snippet is sourced. Two rendering modes
//! exist: zero-width mode wraps the escape text in zsh `%{...%}`
//! delimiters so the line editor's width accounting ignores it, raw mode
//! emits the escape text bare (used for the top line, which is not
//! line-edited).

/// Palette entry for prompt text. `Default` renders without any escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Red,
    Green,
    Yellow,
    Blue,
    Purple,
    Teal,
    Special1,
    Special2,
    Special3,
    Special4,
    Gray,
}

impl Color {
    /// Fixed 256-color palette index.
    pub fn index(self) -> u8 {
        match self {
            Color::Default => 0,
            Color::Red => 1,
            Color::Green => 2,
            Color::Yellow => 3,
            Color::Blue => 4,
            Color::Purple => 5,
            Color::Teal => 6,
            Color::Special1 => 16,
            Color::Special2 => 17,
            Color::Special3 => 18,
            Color::Special4 => 19,
            Color::Gray => 21,
        }
    }

    /// Wrap `text` in this color's escape sequence.
    ///
    /// `Default` is identity regardless of mode, as is any color when
    /// `no_color` is set.
    pub fn paint(self, text: &str, zero_width: bool, no_color: bool) -> String {
        if self == Color::Default || no_color {
            return text.to_string();
        }
        let idx = self.index();
        if zero_width {
            format!("%{{\\e[38;5;{idx}m%}}{text}%{{\\e[0;m%}}")
        } else {
            format!("\\e[38;5;{idx}m{text}\\e[0;m")
        }
    }
}
