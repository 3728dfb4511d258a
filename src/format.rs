//! Template rendering and display escapes
//!
//! Templates carry `${KEY}` placeholders and use `&` as the color escape.
//! The game client expects `§` instead, so every user-facing line goes through
//! [`to_display`] after substitution.

/// Color escape used in configuration templates
pub const CONFIG_ESCAPE: char = '&';

/// Color escape understood by the game client
pub const DISPLAY_ESCAPE: char = '\u{00A7}';

/// Marker substituted for the agent's own nick in WHOIS lines (dark red)
pub const WHOIS_MARKER: &str = "&4";

/// Substitute `${KEY}` placeholders
///
/// Placeholders with no matching key are left as literal text.
#[must_use]
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("${{{key}}}"), value)
    })
}

/// Rewrite `&` color escapes to the display engine's native escape
#[must_use]
pub fn to_display(text: &str) -> String {
    text.replace(CONFIG_ESCAPE, &DISPLAY_ESCAPE.to_string())
}

/// Render a template and rewrite its escapes in one step
#[must_use]
pub fn render_display(template: &str, vars: &[(&str, &str)]) -> String {
    to_display(&render(template, vars))
}

/// Replace the first `"<nick> "` token in a server reply with the WHOIS marker
#[must_use]
pub fn mark_own_nick(line: &str, nick: &str) -> String {
    if nick.is_empty() {
        return line.to_string();
    }
    line.replacen(&format!("{nick} "), WHOIS_MARKER, 1)
}
