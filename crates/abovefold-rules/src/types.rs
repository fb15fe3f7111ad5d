//! Owned CSS rule model.
//!
//! Rules keep their original document order end to end; the pipeline never
//! re-sorts, so cascade ordering survives filtering and deduplication.

use serde::{Deserialize, Serialize};

/// Literal selector token used for font-face entries.
pub const FONT_FACE_SELECTOR: &str = "@font-face";

/// Distinguishes ordinary style rules from always-retained at-rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Ordinary selector rule.
    Style,
    /// `@font-face` rule; exempt from selector filtering.
    FontFace,
}

/// One property declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Property name, lowercased.
    pub property: String,
    /// Value text with original spacing inside the value preserved.
    pub value: String,
    /// Whether the declaration carried a trailing `!important`.
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        Self { property: property.into(), value: value.into(), important }
    }
}

/// One parsed rule in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssRule {
    /// Selector text (possibly a comma list), or [`FONT_FACE_SELECTOR`] for
    /// font-face entries. Whitespace-collapsed.
    pub selector: String,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
    /// Normalized enclosing media condition, e.g. `(min-width:768px)`.
    pub media_query: Option<String>,
    /// Rule kind.
    pub kind: RuleKind,
}

impl CssRule {
    /// Identity used for deduplication: `(selector, mediaQuery)`. Font-face
    /// entries all share the literal selector, so their declarations join
    /// the key; distinct font faces are not duplicates of each other.
    pub fn dedupe_key(&self) -> (String, Option<String>) {
        let selector = if self.is_font_face() {
            let body: Vec<String> = self
                .declarations
                .iter()
                .map(|d| format!("{}:{}", d.property, d.value))
                .collect();
            format!("{}{{{}}}", self.selector, body.join(";"))
        } else {
            self.selector.clone()
        };
        (selector, self.media_query.clone())
    }

    pub fn is_font_face(&self) -> bool {
        self.kind == RuleKind::FontFace
    }
}
