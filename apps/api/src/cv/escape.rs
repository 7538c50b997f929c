//! Typeset escaping and `**bold**` handling.
//!
//! Escaping runs exactly once per piece of text. Bold spans are pulled out
//! first and replaced with placeholders, the remainder is escaped, then each
//! placeholder becomes `\textbf{...}` around the independently escaped phrase.
//! Converting before escaping would escape the emphasis markup itself;
//! escaping before converting would leave the phrase escaped twice.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold span pattern is valid"));

/// Private-use code points: never produced by `escape_reserved` and never reserved.
const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Escapes the reserved characters `\ & % $ # _ { } ~ ^`, with no emphasis handling.
pub fn escape_reserved(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '$' => out.push_str(r"\$"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            // Placeholders only exist inside `escape_typeset`; stray ones in input are dropped.
            PLACEHOLDER_OPEN | PLACEHOLDER_CLOSE => {}
            other => out.push(other),
        }
    }
    out
}

/// Escapes `text` for the typesetting compiler and turns `**phrase**` into `\textbf{phrase}`.
pub fn escape_typeset(text: &str) -> String {
    let mut phrases: Vec<&str> = Vec::new();
    let mut with_placeholders = String::with_capacity(text.len());
    let mut last = 0;

    for caps in BOLD_SPAN.captures_iter(text) {
        let (Some(span), Some(phrase)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        with_placeholders.push_str(&strip_placeholders(&text[last..span.start()]));
        with_placeholders.push(PLACEHOLDER_OPEN);
        with_placeholders.push_str(&phrases.len().to_string());
        with_placeholders.push(PLACEHOLDER_CLOSE);
        phrases.push(phrase.as_str());
        last = span.end();
    }
    with_placeholders.push_str(&strip_placeholders(&text[last..]));

    if phrases.is_empty() {
        return escape_reserved(&with_placeholders);
    }

    // Escape the remainder without touching the placeholders, then reinsert.
    let mut out = String::with_capacity(with_placeholders.len() * 2);
    let mut rest = with_placeholders.as_str();
    while let Some(open) = rest.find(PLACEHOLDER_OPEN) {
        out.push_str(&escape_reserved(&rest[..open]));
        let after = &rest[open + PLACEHOLDER_OPEN.len_utf8()..];
        let Some(close) = after.find(PLACEHOLDER_CLOSE) else {
            rest = after;
            continue;
        };
        if let Some(phrase) = after[..close]
            .parse::<usize>()
            .ok()
            .and_then(|index| phrases.get(index))
        {
            out.push_str(r"\textbf{");
            out.push_str(&escape_reserved(phrase));
            out.push('}');
        }
        rest = &after[close + PLACEHOLDER_CLOSE.len_utf8()..];
    }
    out.push_str(&escape_reserved(rest));
    out
}

/// Plain-text rendering of emphasis: the `**` markers are deleted.
pub fn strip_bold(text: &str) -> String {
    text.replace("**", "")
}

fn strip_placeholders(text: &str) -> String {
    text.chars()
        .filter(|c| *c != PLACEHOLDER_OPEN && *c != PLACEHOLDER_CLOSE)
        .collect()
}
