//! Tolerant string-level CSS parser.
//!
//! Produces an ordered rule list from raw stylesheet text. Malformed
//! fragments are skipped rather than failing the whole sheet; the input is
//! whatever a live page happened to serve, so the parser never errors.

use crate::types::{CssRule, Declaration, RuleKind, FONT_FACE_SELECTOR};

/// Parse raw CSS text into an ordered list of rules.
pub fn parse(css: &str) -> Vec<CssRule> {
    let src = strip_comments(css);
    let mut rules = Vec::new();
    parse_rules(&src, None, &mut rules);
    rules
}

/// Remove `/* ... */` comments. Unterminated comments run to end of input.
pub(crate) fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let bytes = css.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
        } else {
            // Input is valid UTF-8; copy the full code point.
            let ch = css[i..].chars().next().unwrap_or('\u{fffd}');
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

fn parse_rules(src: &str, media: Option<&str>, out: &mut Vec<CssRule>) {
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        if bytes[i] == b'@' {
            i = parse_at_rule(src, i, media, out);
            continue;
        }

        // Ordinary rule: selector up to '{', body up to matching '}'.
        let Some(open) = find_byte(bytes, i, b'{') else { break };
        let Some(close) = matching_brace(bytes, open) else { break };
        let selector = collapse_whitespace(&src[i..open]);
        let declarations = parse_declarations(&src[open + 1..close]);
        if !selector.is_empty() && !declarations.is_empty() {
            out.push(CssRule {
                selector,
                declarations,
                media_query: media.map(|m| m.to_string()),
                kind: RuleKind::Style,
            });
        }
        i = close + 1;
    }
}

/// Parse one at-rule starting at `start` (which points at `@`). Returns the
/// index to resume scanning from.
fn parse_at_rule(src: &str, start: usize, media: Option<&str>, out: &mut Vec<CssRule>) -> usize {
    let bytes = src.as_bytes();

    // Statement at-rules (@import, @charset, ...) end at the semicolon.
    let open = find_byte(bytes, start, b'{');
    let semi = find_byte(bytes, start, b';');
    match (open, semi) {
        (None, Some(s)) => return s + 1,
        (None, None) => return bytes.len(),
        (Some(o), Some(s)) if s < o => return s + 1,
        _ => {}
    }

    let Some(open) = open else { return bytes.len() };
    let Some(close) = matching_brace(bytes, open) else {
        return bytes.len();
    };
    let prelude = collapse_whitespace(&src[start..open]);
    let body = &src[open + 1..close];

    if let Some(condition) = prelude.strip_prefix("@media") {
        let condition = normalize_media_condition(condition);
        // Nested rules inherit the block's condition. Media blocks do not
        // nest in practice on real pages; the innermost condition wins.
        parse_rules(body, Some(&condition), out);
    } else if prelude == FONT_FACE_SELECTOR {
        let declarations = parse_declarations(body);
        if !declarations.is_empty() {
            out.push(CssRule {
                selector: FONT_FACE_SELECTOR.to_string(),
                declarations,
                media_query: media.map(|m| m.to_string()),
                kind: RuleKind::FontFace,
            });
        }
    }
    // Other block at-rules (@keyframes, @supports, ...) are skipped: nothing
    // first-paint-critical lives there and animations are filtered anyway.

    close + 1
}

/// Split a declaration block into declarations, honoring paren nesting so
/// `url(data:...;base64,...)` style values survive.
pub(crate) fn parse_declarations(body: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    for chunk in split_top_level(body, b';') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        let Some(colon) = find_top_level(chunk.as_bytes(), b':') else {
            continue;
        };
        let property = chunk[..colon].trim().to_ascii_lowercase();
        let mut value = collapse_whitespace(&chunk[colon + 1..]);
        if property.is_empty() || value.is_empty() {
            continue;
        }
        let mut important = false;
        if let Some(stripped) = strip_important(&value) {
            value = stripped;
            important = true;
        }
        if value.is_empty() {
            continue;
        }
        declarations.push(Declaration { property, value, important });
    }
    declarations
}

/// Normalize a media condition: collapse whitespace, then drop spaces next
/// to `(`, `)`, `:` and `,` so `(min-width: 768px)` becomes
/// `(min-width:768px)` while `screen and (...)` keeps its word spacing.
pub(crate) fn normalize_media_condition(condition: &str) -> String {
    let collapsed = collapse_whitespace(condition);
    let mut out = String::with_capacity(collapsed.len());
    for ch in collapsed.chars() {
        if ch == ' ' {
            match out.chars().last() {
                Some('(') | Some(':') | Some(',') => continue,
                _ => {}
            }
            out.push(' ');
        } else {
            if matches!(ch, ')' | ':' | ',') && out.ends_with(' ') {
                out.pop();
            }
            out.push(ch);
        }
    }
    out.trim().to_string()
}

fn strip_important(value: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();
    let idx = lower.rfind("!important")?;
    // Must be a trailing marker, possibly with internal whitespace removed
    // already by collapse.
    if lower[idx + "!important".len()..].trim().is_empty() {
        Some(value[..idx].trim().to_string())
    } else {
        None
    }
}

/// Collapse runs of whitespace to single spaces and trim.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            pending = !out.is_empty();
        } else {
            if pending {
                out.push(' ');
                pending = false;
            }
            out.push(ch);
        }
    }
    out
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from..].iter().position(|&b| b == needle).map(|p| from + p)
}

/// Index of the brace matching the one at `open`.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes[open..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` at paren depth zero.
fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ if b == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// First occurrence of `needle` at paren depth zero.
fn find_top_level(bytes: &[u8], needle: u8) -> Option<usize> {
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ if b == needle && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
