//! Full-width top line composition.

use crate::fragment::Container;

/// Fill character for the top line, doubling as the default fragment
/// separator.
pub const RULE_CHAR: char = '~';

/// Build a line exactly `width` visible characters wide (when nothing
/// overflows): left content, then the center content horizontally
/// centered amid repeated rule characters, then right content.
///
/// All arithmetic uses declared fragment widths. Escape sequences take
/// zero visible columns on the terminal, so counting rendered bytes
/// would shrink the rule in proportion to how many colored fragments
/// are present. An odd fill puts the extra rule character on the left;
/// a center wider than the remaining budget is emitted unpadded and is
/// never truncated.
pub fn embed_in_horizontal_rule(
    width: usize,
    mut left: Container,
    mut center: Container,
    mut right: Container,
    rule_char: char,
    no_color: bool,
) -> String {
    // The top line is not line-edited; escapes must render as literal
    // text instead of being hidden behind zsh width markers.
    for container in [&mut left, &mut center, &mut right] {
        container.set_zero_width(false);
    }

    let middle_budget =
        width as i64 - left.display_width() as i64 - right.display_width() as i64;
    let fill = middle_budget - center.display_width() as i64;

    let mut middle = center.render(no_color);
    if fill > 0 {
        let fill = fill as usize;
        let left_fill = fill / 2 + fill % 2;
        let right_fill = fill / 2;
        middle = format!(
            "{}{}{}",
            rule_char.to_string().repeat(left_fill),
            middle,
            rule_char.to_string().repeat(right_fill),
        );
    }

    format!("{}{}{}", left.render(no_color), middle, right.render(no_color))
}
