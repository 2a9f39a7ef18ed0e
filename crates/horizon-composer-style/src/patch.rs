//! Reconciling parsed descriptors against the shared rule store.
//!
//! The patch engine parses freshly edited CSS text into descriptors,
//! resolves each against existing store entries by selector / pseudo-state /
//! at-rule identity, and replaces or removes the matched entries. Rules the
//! edit did not touch are left exactly as they were.

use crate::parser::{RuleDescriptor, parse_css, split_blocks};
use crate::rules::{CssRule, RuleId, RuleStore};

const TARGET: &str = "horizon_composer_style::patch";

/// Counters describing what one apply or delete did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Entries whose declarations were replaced.
    pub replaced: usize,
    /// Entries created for identities the store did not have.
    pub created: usize,
    /// Entries removed.
    pub removed: usize,
    /// Malformed blocks skipped during parsing.
    pub skipped: usize,
}

impl PatchStats {
    /// Fold another stats value into this one.
    pub fn merge(&mut self, other: PatchStats) {
        self.replaced += other.replaced;
        self.created += other.created;
        self.removed += other.removed;
        self.skipped += other.skipped;
    }
}

/// Parse edited CSS text and reconcile it into the store.
///
/// Each descriptor either replaces the declarations of the entries matching
/// its identity or creates new entries when the identity is absent.
/// Malformed blocks fail only themselves.
pub fn apply_css(store: &mut RuleStore, css: &str) -> PatchStats {
    let outcome = parse_css(css);
    let mut stats = PatchStats {
        skipped: outcome.skipped,
        ..PatchStats::default()
    };
    for descriptor in &outcome.descriptors {
        apply_descriptor(store, descriptor, &mut stats);
    }
    tracing::debug!(
        target: TARGET,
        replaced = stats.replaced,
        created = stats.created,
        skipped = stats.skipped,
        "applied css edit"
    );
    stats
}

/// Parse CSS text and remove every store entry matching a parsed identity.
/// Nothing is created; unmatched descriptors are ignored.
pub fn remove_css(store: &mut RuleStore, css: &str) -> PatchStats {
    let outcome = parse_css(css);
    let mut stats = PatchStats {
        skipped: outcome.skipped,
        ..PatchStats::default()
    };
    let mut doomed: Vec<RuleId> = vec![];
    for descriptor in &outcome.descriptors {
        doomed.extend(resolve_existing(store, descriptor));
    }
    doomed.sort();
    doomed.dedup();
    stats.removed = doomed.len();
    store.remove(&doomed);
    tracing::debug!(target: TARGET, removed = stats.removed, "removed css rules");
    stats
}

/// Extract the ID-scoped rule blocks from CSS text, in source order.
///
/// A block qualifies when its selector text begins with `#`, or when it is
/// an at-rule whose body contains an ID-scoped inner block (the whole
/// at-rule block is carried, so the condition survives the move inline).
/// Only ID-scoped rules are safe to duplicate into a replaced fragment;
/// class- and element-scoped rules stay in the shared store where sibling
/// nodes still resolve them.
pub fn extract_id_rules(css: &str) -> String {
    let mut out = String::new();
    for block in split_blocks(css) {
        if !block.complete {
            continue;
        }
        let trimmed = block.text.trim();
        let id_scoped = if trimmed.starts_with('@') {
            at_rule_body_has_id_rule(trimmed)
        } else {
            trimmed.starts_with('#')
        };
        if id_scoped {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(trimmed);
        }
    }
    out
}

fn at_rule_body_has_id_rule(block: &str) -> bool {
    let Some(open) = block.find('{') else {
        return false;
    };
    let Some(close) = block.rfind('}') else {
        return false;
    };
    if close <= open {
        return false;
    }
    split_blocks(&block[open + 1..close])
        .iter()
        .any(|inner| inner.complete && inner.text.trim_start().starts_with('#'))
}

fn apply_descriptor(store: &mut RuleStore, descriptor: &RuleDescriptor, stats: &mut PatchStats) {
    if let Some(at) = &descriptor.at_rule {
        if descriptor.single_at_rule {
            // Single combined at-rule: identity is (name, single flag).
            let found = store
                .iter()
                .find(|(_, rule)| {
                    rule.single_at_rule
                        && rule.at_rule.as_ref().is_some_and(|r| r.name == at.name)
                })
                .map(|(id, _)| id);
            match found {
                Some(id) => {
                    store.set_declarations(id, descriptor.declarations.clone());
                    stats.replaced += 1;
                }
                None => {
                    let mut rule = CssRule::single_at(at.name.clone(), descriptor.declarations.clone());
                    rule.at_rule = Some(at.clone());
                    store.add(rule);
                    stats.created += 1;
                }
            }
            return;
        }

        // Wrapped rule: identity is (name, params) narrowed by selector and
        // state, so sibling rules under the same condition stay untouched.
        for selector in &descriptor.selectors {
            let found = store
                .iter()
                .find(|(_, rule)| {
                    !rule.single_at_rule
                        && rule.at_rule.as_ref().is_some_and(|r| r.matches(at))
                        && rule.selectors.iter().any(|s| s == selector)
                        && rule.state == descriptor.state
                })
                .map(|(id, _)| id);
            match found {
                Some(id) => {
                    store.set_declarations(id, descriptor.declarations.clone());
                    stats.replaced += 1;
                }
                None => {
                    let mut rule = CssRule::new(selector.clone(), descriptor.declarations.clone());
                    rule.state = descriptor.state.clone();
                    rule.at_rule = Some(at.clone());
                    store.add(rule);
                    stats.created += 1;
                }
            }
        }
        return;
    }

    // Bare rule: exact selector-key lookup, one store entry per selector.
    for selector in &descriptor.selectors {
        let key = match &descriptor.state {
            Some(state) => format!("{selector}:{state}"),
            None => selector.clone(),
        };
        match store.find(&key) {
            Some(id) => {
                store.set_declarations(id, descriptor.declarations.clone());
                stats.replaced += 1;
            }
            None => {
                let mut rule = CssRule::new(selector.clone(), descriptor.declarations.clone());
                rule.state = descriptor.state.clone();
                store.add(rule);
                stats.created += 1;
            }
        }
    }
}

/// Resolve the store entries matching a descriptor's identity, in the
/// tie-break order: at-rule (name, params) → at-rule single flag → exact
/// `selector:state` key → exact `selector` key. Only the first applicable
/// branch is evaluated.
fn resolve_existing(store: &RuleStore, descriptor: &RuleDescriptor) -> Vec<RuleId> {
    if let Some(at) = &descriptor.at_rule {
        if descriptor.single_at_rule {
            return store
                .iter()
                .filter(|(_, rule)| {
                    rule.single_at_rule
                        && rule.at_rule.as_ref().is_some_and(|r| r.name == at.name)
                })
                .map(|(id, _)| id)
                .collect();
        }
        return store
            .iter()
            .filter(|(_, rule)| {
                !rule.single_at_rule
                    && rule.at_rule.as_ref().is_some_and(|r| r.matches(at))
                    && rule.state == descriptor.state
                    && descriptor
                        .selectors
                        .iter()
                        .any(|s| rule.selectors.contains(s))
            })
            .map(|(id, _)| id)
            .collect();
    }

    descriptor
        .selectors
        .iter()
        .filter_map(|selector| {
            let key = match &descriptor.state {
                Some(state) => format!("{selector}:{state}"),
                None => selector.clone(),
            };
            store.find(&key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> RuleStore {
        let mut store = RuleStore::new();
        store.add(CssRule::new("#hero", "color: red"));
        store.add(CssRule::new(".card", "color: blue"));
        store.add(
            CssRule::new("#hero", "color: green").in_at_rule("media", "(max-width: 600px)"),
        );
        store
    }

    #[test]
    fn replaces_existing_declarations() {
        let mut store = seeded_store();
        let stats = apply_css(&mut store, ".card { color: black; }");
        assert_eq!(stats.replaced, 1);
        assert_eq!(stats.created, 0);
        let id = store.find(".card").unwrap();
        assert_eq!(store.get(id).unwrap().declarations, "color: black;");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn creates_missing_identity() {
        let mut store = seeded_store();
        let stats = apply_css(&mut store, ".badge:hover { opacity: 1; }");
        assert_eq!(stats.created, 1);
        let id = store.find(".badge:hover").unwrap();
        assert_eq!(store.get(id).unwrap().state.as_deref(), Some("hover"));
    }

    #[test]
    fn bare_edit_leaves_media_twin_alone() {
        let mut store = seeded_store();
        apply_css(&mut store, "#hero { color: white; }");

        let media_rule = store
            .iter()
            .find(|(_, r)| r.at_rule.is_some())
            .map(|(_, r)| r.clone())
            .unwrap();
        assert_eq!(media_rule.declarations, "color: green;");

        let bare = store.find("#hero").unwrap();
        assert_eq!(store.get(bare).unwrap().declarations, "color: white;");
    }

    #[test]
    fn media_edit_targets_media_entry() {
        let mut store = seeded_store();
        let stats = apply_css(
            &mut store,
            "@media (max-width:600px) { #hero { color: yellow; } }",
        );
        assert_eq!(stats.replaced, 1);
        let media_rule = store
            .iter()
            .find(|(_, r)| r.at_rule.is_some())
            .map(|(_, r)| r.clone())
            .unwrap();
        assert_eq!(media_rule.declarations, "color: yellow;");
        // Bare twin untouched.
        let bare = store.find("#hero").unwrap();
        assert_eq!(store.get(bare).unwrap().declarations, "color: red;");
    }

    #[test]
    fn media_sibling_selectors_are_not_clobbered() {
        let mut store = seeded_store();
        store.add(CssRule::new(".card", "margin: 0").in_at_rule("media", "(max-width: 600px)"));

        apply_css(
            &mut store,
            "@media (max-width: 600px) { #hero { color: yellow; } }",
        );

        let sibling = store
            .iter()
            .find(|(_, r)| r.at_rule.is_some() && r.selectors == vec![".card"])
            .map(|(_, r)| r.clone())
            .unwrap();
        assert_eq!(sibling.declarations, "margin: 0;");
    }

    #[test]
    fn malformed_block_skips_only_itself() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let mut store = RuleStore::new();
        store.add(CssRule::new(".a", "color: blue"));
        store.add(CssRule::new(".b", "color: blue"));

        let stats = apply_css(&mut store, ".a{color:red}\n.b{color:");
        assert_eq!(stats.replaced, 1);
        assert_eq!(stats.skipped, 1);
        let a = store.find(".a").unwrap();
        let b = store.find(".b").unwrap();
        assert_eq!(store.get(a).unwrap().declarations, "color:red;");
        assert_eq!(store.get(b).unwrap().declarations, "color: blue;");
    }

    #[test]
    fn grouped_selectors_become_per_selector_entries() {
        let mut store = RuleStore::new();
        let stats = apply_css(&mut store, ".a, .b { color: red; }");
        assert_eq!(stats.created, 2);
        assert!(store.find(".a").is_some());
        assert!(store.find(".b").is_some());

        // Editing one member later touches only that entry.
        apply_css(&mut store, ".b { color: blue; }");
        let a = store.find(".a").unwrap();
        let b = store.find(".b").unwrap();
        assert_eq!(store.get(a).unwrap().declarations, "color: red;");
        assert_eq!(store.get(b).unwrap().declarations, "color: blue;");
    }

    #[test]
    fn remove_deletes_matching_entries() {
        let mut store = seeded_store();
        let stats = remove_css(&mut store, ".card { color: blue; }");
        assert_eq!(stats.removed, 1);
        assert!(store.find(".card").is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_single_at_rule() {
        let mut store = RuleStore::new();
        store.add(CssRule::single_at("font-face", "font-family: Inter"));
        store.add(CssRule::new(".a", "color: red"));

        let stats = remove_css(&mut store, "@font-face { font-family: Inter; }");
        assert_eq!(stats.removed, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn extract_only_id_rules() {
        let css = "#hero { color: red; }\n.card { color: blue; }";
        let inline = extract_id_rules(css);
        assert!(inline.contains("#hero"));
        assert!(!inline.contains(".card"));
    }

    #[test]
    fn extract_carries_at_rule_with_id_body() {
        let css = "@media (max-width: 600px) { #hero { color: blue; } }\n@media print { .card { margin: 0; } }";
        let inline = extract_id_rules(css);
        assert!(inline.contains("@media (max-width: 600px)"));
        assert!(!inline.contains("print"));
    }

    #[test]
    fn extract_skips_incomplete_blocks() {
        assert_eq!(extract_id_rules("#hero { color:"), "");
    }
}
