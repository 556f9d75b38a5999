use regex::Regex;
use std::sync::OnceLock;

fn continuation_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n(?:/+ ?)+").expect("valid regex"))
}

// Whitespace is the ASCII set `[\t\n\f\r ]`; NBSP and other Unicode spaces are text.
fn leading_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[/*\t\n\f\r ]+").expect("valid regex"))
}

fn trailing_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\t\n\f\r ]+$").expect("valid regex"))
}

fn line_trailing_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\t\n\f\r ]+\n").expect("valid regex"))
}

/// Clean a raw leading comment into documentation text.
///
/// Strips `/` continuation markers after newlines, the leading run of
/// slashes/asterisks/whitespace, trailing whitespace, and any whitespace run
/// ending in a newline. Blank lines between paragraphs collapse to one newline.
///
/// `scrub(&scrub(s)) == scrub(s)` for every `s`.
pub fn scrub(raw: &str) -> String {
    let text = continuation_marker().replace_all(raw, "\n");
    let text = leading_marker().replace(&text, "");
    let text = trailing_whitespace().replace(&text, "");
    line_trailing_whitespace()
        .replace_all(&text, "\n")
        .into_owned()
}
