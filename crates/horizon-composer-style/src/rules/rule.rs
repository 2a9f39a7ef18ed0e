//! Single style rule definition.

use std::fmt;

/// An at-rule wrapper identity (e.g. `@media (max-width: 600px)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AtRule {
    /// At-rule name without the `@` (e.g. `media`, `font-face`).
    pub name: String,
    /// Condition parameters as written, whitespace-collapsed. Empty for
    /// parameterless at-rules.
    pub params: String,
}

impl AtRule {
    /// Create an at-rule identity. Parameters are collapsed to single
    /// spaces so identity survives reformatting.
    pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: collapse_whitespace(&params.into()),
        }
    }

    /// Identity comparison: equal names and whitespace-insensitive equal
    /// parameters. Edited text routinely differs from stored params only in
    /// spacing (`(max-width:600px)` vs `(max-width: 600px)`).
    pub fn matches(&self, other: &AtRule) -> bool {
        self.name == other.name && strip_whitespace(&self.params) == strip_whitespace(&other.params)
    }
}

impl fmt::Display for AtRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.params.is_empty() {
            write!(f, " {}", self.params)?;
        }
        Ok(())
    }
}

/// A stored style rule.
///
/// Each rule has:
/// - One or more selector strings, pseudo-state suffix stripped
/// - An optional pseudo-state shared by those selectors
/// - An optional wrapping at-rule identity
/// - The raw (normalized) declaration text
/// - Source order for deterministic rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    /// Selector strings without state suffix (e.g. `#hero`, `.card`).
    /// Empty for a single combined at-rule such as `@font-face`.
    pub selectors: Vec<String>,
    /// Pseudo-state suffix without its leading colon (`hover`). A
    /// pseudo-element keeps its second colon (`:before`).
    pub state: Option<String>,
    /// Wrapping at-rule identity, if any.
    pub at_rule: Option<AtRule>,
    /// Whether this is a single combined at-rule block with no inner
    /// selector blocks (`@font-face { … }`).
    pub single_at_rule: bool,
    /// Normalized declaration text (see [`normalize_declarations`]).
    pub declarations: String,
    /// Source order, assigned by the store.
    pub order: u32,
}

impl CssRule {
    /// Create a plain selector rule.
    pub fn new(selector: impl Into<String>, declarations: impl Into<String>) -> Self {
        Self {
            selectors: vec![selector.into()],
            state: None,
            at_rule: None,
            single_at_rule: false,
            declarations: normalize_declarations(&declarations.into()),
            order: 0,
        }
    }

    /// Attach a pseudo-state suffix.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Wrap the rule in an at-rule identity.
    pub fn in_at_rule(mut self, name: impl Into<String>, params: impl Into<String>) -> Self {
        self.at_rule = Some(AtRule::new(name, params));
        self
    }

    /// Create a single combined at-rule (`@font-face { … }`).
    pub fn single_at(name: impl Into<String>, declarations: impl Into<String>) -> Self {
        Self {
            selectors: vec![],
            state: None,
            at_rule: Some(AtRule::new(name, "")),
            single_at_rule: true,
            declarations: normalize_declarations(&declarations.into()),
            order: 0,
        }
    }

    /// The lookup identity used by the store: `selector`, `selector:state`,
    /// or `selector::element`. At-rule entries are never resolved by key;
    /// they match through their at-rule identity instead.
    pub fn selector_key(&self) -> String {
        let mut key = self.selectors.join(", ");
        if let Some(state) = &self.state {
            key.push(':');
            key.push_str(state);
        }
        key
    }
}

impl fmt::Display for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ {} }}", self.selector_key(), self.declarations)
    }
}

/// Normalize declaration text: declarations split on `;`, trimmed, rejoined
/// with `"; "` and a trailing semicolon. Makes serialize → parse a fixed
/// point regardless of the indentation the renderer chose.
pub fn normalize_declarations(raw: &str) -> String {
    let mut out = String::new();
    for decl in raw.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str("; ");
        }
        out.push_str(decl);
    }
    if !out.is_empty() {
        out.push(';');
    }
    out
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.trim().chars() {
        if ch.is_whitespace() {
            in_ws = true;
        } else {
            if in_ws && !out.is_empty() {
                out.push(' ');
            }
            in_ws = false;
            out.push(ch);
        }
    }
    out
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
