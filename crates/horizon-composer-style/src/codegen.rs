//! CSS text generation from the rule store.
//!
//! Produces the editable CSS shown in the code panel: the subset of store
//! rules applicable to a component's scope, rendered in a form that parses
//! back to identical identities and declarations.

use crate::rules::{AtRule, CssRule, RuleStore};

/// The rule scope of a selected component: the ids, classes, and element
/// types present in its subtree. Built by the host, consumed by
/// [`css_for_scope`].
#[derive(Debug, Clone, Default)]
pub struct RuleScope {
    all: bool,
    ids: Vec<String>,
    classes: Vec<String>,
    types: Vec<String>,
}

impl RuleScope {
    /// An empty scope. Matches only rules that apply document-wide
    /// (single at-rules such as `@font-face`).
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope matching every rule in the store.
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// Add an element id (without `#`) to the scope.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    /// Add a class name (without `.`) to the scope.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add an element type name to the scope.
    pub fn with_type(mut self, element: impl Into<String>) -> Self {
        self.types.push(element.into());
        self
    }

    /// Whether a stored rule belongs to this scope.
    pub fn contains(&self, rule: &CssRule) -> bool {
        if self.all || rule.single_at_rule {
            return true;
        }
        rule.selectors.iter().any(|s| self.matches_selector(s))
    }

    fn matches_selector(&self, selector: &str) -> bool {
        let mut chars = selector.char_indices().peekable();
        let mut boundary = true;
        while let Some((i, ch)) = chars.next() {
            match ch {
                '#' | '.' => {
                    let name = read_name(selector, i + 1);
                    let hit = if ch == '#' {
                        self.ids.iter().any(|id| id == name)
                    } else {
                        self.classes.iter().any(|c| c == name)
                    };
                    if hit {
                        return true;
                    }
                    skip_name(&mut chars, name.len());
                    boundary = false;
                }
                ':' => {
                    // Pseudo suffix; its name never names a scope member.
                    let name = read_name(selector, i + 1);
                    skip_name(&mut chars, name.len());
                    boundary = false;
                }
                '*' => return true,
                ' ' | '>' | '+' | '~' => boundary = true,
                '[' => {
                    // Attribute selector; skip to the closing bracket.
                    for (_, c) in chars.by_ref() {
                        if c == ']' {
                            break;
                        }
                    }
                    boundary = false;
                }
                c if boundary && (c.is_ascii_alphabetic() || c == '_' || c == '-') => {
                    let name = read_name(selector, i);
                    if self.types.iter().any(|t| t == name) {
                        return true;
                    }
                    skip_name(&mut chars, name.len().saturating_sub(ch.len_utf8()));
                    boundary = false;
                }
                _ => boundary = false,
            }
        }
        false
    }
}

fn read_name(selector: &str, from: usize) -> &str {
    let rest = &selector[from..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    &rest[..end]
}

fn skip_name(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>, len: usize) {
    for _ in 0..len {
        chars.next();
    }
}

/// Render the in-scope subset of the store as editable CSS text.
///
/// Wrapped at-rule members sharing an identity are grouped into one block
/// at the position of their first member; everything else renders in store
/// order. The output round-trips: parsing it back yields the same
/// identities and the same normalized declarations.
pub fn css_for_scope(store: &RuleStore, scope: &RuleScope) -> String {
    let mut out = String::new();
    let mut rendered_at: Vec<AtRule> = vec![];

    for (_, rule) in store.iter() {
        if !scope.contains(rule) {
            continue;
        }
        match &rule.at_rule {
            None => {
                push_block(&mut out, &render_bare(rule, 0));
            }
            Some(_) if rule.single_at_rule => {
                push_block(&mut out, &render_single_at(rule));
            }
            Some(at) => {
                if rendered_at.iter().any(|seen| seen.matches(at)) {
                    continue;
                }
                rendered_at.push(at.clone());
                let members: Vec<&CssRule> = store
                    .iter()
                    .map(|(_, r)| r)
                    .filter(|r| {
                        !r.single_at_rule
                            && r.at_rule.as_ref().is_some_and(|other| other.matches(at))
                            && scope.contains(r)
                    })
                    .collect();
                push_block(&mut out, &render_at_group(at, &members));
            }
        }
    }
    out
}

/// Render every rule in the store.
pub fn render_store(store: &RuleStore) -> String {
    css_for_scope(store, &RuleScope::all())
}

fn push_block(out: &mut String, block: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(block);
}

fn render_bare(rule: &CssRule, level: usize) -> String {
    let pad = "  ".repeat(level);
    let mut block = format!("{pad}{} {{\n", rule.selector_key());
    push_declarations(&mut block, &rule.declarations, level + 1);
    block.push_str(&pad);
    block.push('}');
    block
}

fn render_single_at(rule: &CssRule) -> String {
    let name = rule
        .at_rule
        .as_ref()
        .map(|at| at.name.as_str())
        .unwrap_or_default();
    let mut block = format!("@{name} {{\n");
    push_declarations(&mut block, &rule.declarations, 1);
    block.push('}');
    block
}

fn render_at_group(at: &AtRule, members: &[&CssRule]) -> String {
    let mut block = String::from("@");
    block.push_str(&at.name);
    if !at.params.is_empty() {
        block.push(' ');
        block.push_str(&at.params);
    }
    block.push_str(" {\n");
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            block.push('\n');
        }
        block.push_str(&render_bare(member, 1));
        block.push('\n');
    }
    block.push('}');
    block
}

fn push_declarations(block: &mut String, declarations: &str, level: usize) {
    let pad = "  ".repeat(level);
    for decl in declarations.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        block.push_str(&pad);
        block.push_str(decl);
        block.push_str(";\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::apply_css;

    fn seeded_store() -> RuleStore {
        let mut store = RuleStore::new();
        store.add(CssRule::new("#hero", "color: red"));
        store.add(CssRule::new(".card", "color: blue").with_state("hover"));
        store.add(CssRule::new("#hero", "color: green").in_at_rule("media", "(max-width: 600px)"));
        store.add(CssRule::single_at("font-face", "font-family: Inter"));
        store
    }

    #[test]
    fn renders_bare_and_state_rules() {
        let css = render_store(&seeded_store());
        assert!(css.contains("#hero {\n  color: red;\n}"));
        assert!(css.contains(".card:hover {\n  color: blue;\n}"));
    }

    #[test]
    fn renders_at_rules_grouped() {
        let mut store = seeded_store();
        store.add(CssRule::new(".card", "margin: 0").in_at_rule("media", "(max-width: 600px)"));
        let css = render_store(&store);
        // One media block containing both members.
        assert_eq!(css.matches("@media (max-width: 600px)").count(), 1);
        assert!(css.contains("  #hero {\n    color: green;\n  }"));
        assert!(css.contains("  .card {\n    margin: 0;\n  }"));
    }

    #[test]
    fn scope_filters_unrelated_rules() {
        let store = seeded_store();
        let scope = RuleScope::new().with_id("hero");
        let css = css_for_scope(&store, &scope);
        assert!(css.contains("#hero"));
        assert!(!css.contains(".card"));
        // Document-wide single at-rules always serialize.
        assert!(css.contains("@font-face"));
    }

    #[test]
    fn scope_matches_descendant_mentions() {
        let mut store = RuleStore::new();
        store.add(CssRule::new(".nav .item", "color: red"));
        let scope = RuleScope::new().with_class("item");
        assert!(!css_for_scope(&store, &scope).is_empty());

        let other = RuleScope::new().with_class("missing");
        assert!(css_for_scope(&store, &other).is_empty());
    }

    #[test]
    fn serialize_then_apply_is_identity() {
        let mut store = seeded_store();
        let before: Vec<CssRule> = store.iter().map(|(_, r)| r.clone()).collect();

        let css = render_store(&store);
        let stats = apply_css(&mut store, &css);

        assert_eq!(stats.created, 0);
        assert_eq!(stats.skipped, 0);
        let after: Vec<CssRule> = store.iter().map(|(_, r)| r.clone()).collect();
        assert_eq!(before, after);
    }
}
