//! Rule serialization and minification.

use crate::parser::strip_comments;
use crate::types::CssRule;

/// Serialize rules back to CSS text in order, grouping consecutive rules
/// that share a media condition under one `@media` block.
pub fn generate(rules: &[CssRule]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < rules.len() {
        match &rules[i].media_query {
            None => {
                write_rule(&mut out, &rules[i], "");
                i += 1;
            }
            Some(condition) => {
                out.push_str("@media ");
                out.push_str(condition);
                out.push_str(" {\n");
                while i < rules.len() && rules[i].media_query.as_deref() == Some(condition) {
                    write_rule(&mut out, &rules[i], "  ");
                    i += 1;
                }
                out.push_str("}\n");
            }
        }
    }
    out
}

fn write_rule(out: &mut String, rule: &CssRule, indent: &str) {
    out.push_str(indent);
    out.push_str(&rule.selector);
    out.push_str(" {\n");
    for decl in &rule.declarations {
        out.push_str(indent);
        out.push_str("  ");
        out.push_str(&decl.property);
        out.push_str(": ");
        out.push_str(&decl.value);
        if decl.important {
            out.push_str(" !important");
        }
        out.push_str(";\n");
    }
    out.push_str(indent);
    out.push_str("}\n");
}

/// Strip comments and non-significant whitespace, collapsing each rule onto
/// one line. Spaces inside declaration values (`margin: 0 auto`) survive.
pub fn minify(css: &str) -> String {
    let src = strip_comments(css);
    let mut out = String::with_capacity(src.len());
    let mut depth = 0usize;
    let mut pending_space = false;

    for ch in src.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if ch == '}' {
            while out.ends_with(';') || out.ends_with(' ') {
                out.pop();
            }
            out.push('}');
            depth = depth.saturating_sub(1);
            pending_space = false;
            continue;
        }
        if pending_space {
            let last = out.chars().next_back().unwrap_or('{');
            let tight_after = matches!(last, '{' | '}' | ';' | ',' | '(') || (depth > 0 && last == ':');
            let tight_before = matches!(ch, '{' | ';' | ',' | ')') || (depth > 0 && ch == ':');
            if !tight_after && !tight_before {
                out.push(' ');
            }
            pending_space = false;
        }
        if ch == '{' {
            depth += 1;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
