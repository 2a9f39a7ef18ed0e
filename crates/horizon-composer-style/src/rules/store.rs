//! Shared rule collection.

use slotmap::{SlotMap, new_key_type};

use crate::rules::CssRule;

new_key_type! {
    /// A unique identifier for a stored rule.
    ///
    /// Ids stay valid until the entry is removed; removal never invalidates
    /// the ids of other entries.
    pub struct RuleId;
}

/// The shared, host-owned collection of all active style rules for the
/// whole document.
///
/// The code panel queries it by selector / state / at-rule identity and
/// mutates it (replace declarations, remove entries) during a synchronous
/// apply. There is no interior locking: the host's cooperative
/// single-threaded event loop guarantees applies never interleave with
/// readers.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: SlotMap<RuleId, CssRule>,
    /// Source order of live entries.
    order: Vec<RuleId>,
    next_order: u32,
}

impl RuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, assigning it the next source-order slot.
    pub fn add(&mut self, mut rule: CssRule) -> RuleId {
        rule.order = self.next_order;
        self.next_order += 1;
        let id = self.rules.insert(rule);
        self.order.push(id);
        id
    }

    /// Look up a non-at-rule entry by its exact selector key
    /// (`selector` or `selector:state`).
    ///
    /// At-rule entries are skipped: a `#hero` stored inside a media query
    /// must never shadow the bare `#hero` entry. They are resolved through
    /// their at-rule identity instead.
    pub fn find(&self, selector_key: &str) -> Option<RuleId> {
        self.iter()
            .find(|(_, rule)| rule.at_rule.is_none() && rule.selector_key() == selector_key)
            .map(|(id, _)| id)
    }

    /// Get a rule by id.
    pub fn get(&self, id: RuleId) -> Option<&CssRule> {
        self.rules.get(id)
    }

    /// Get a rule mutably by id.
    pub fn get_mut(&mut self, id: RuleId) -> Option<&mut CssRule> {
        self.rules.get_mut(id)
    }

    /// Replace an entry's declaration text.
    ///
    /// Returns `false` if the id is stale.
    pub fn set_declarations(&mut self, id: RuleId, declarations: impl Into<String>) -> bool {
        match self.rules.get_mut(id) {
            Some(rule) => {
                rule.declarations = crate::rules::normalize_declarations(&declarations.into());
                true
            }
            None => false,
        }
    }

    /// Remove a batch of entries. Stale ids are ignored.
    pub fn remove(&mut self, ids: &[RuleId]) {
        for &id in ids {
            if self.rules.remove(id).is_some() {
                self.order.retain(|&o| o != id);
            }
        }
    }

    /// Iterate entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &CssRule)> {
        self.order
            .iter()
            .filter_map(|&id| self.rules.get(id).map(|rule| (id, rule)))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.rules.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assigns_source_order() {
        let mut store = RuleStore::new();
        let a = store.add(CssRule::new(".a", "color: red"));
        let b = store.add(CssRule::new(".b", "color: blue"));

        assert_eq!(store.get(a).unwrap().order, 0);
        assert_eq!(store.get(b).unwrap().order, 1);
        let keys: Vec<_> = store.iter().map(|(_, r)| r.selector_key()).collect();
        assert_eq!(keys, vec![".a", ".b"]);
    }

    #[test]
    fn find_by_key_and_state() {
        let mut store = RuleStore::new();
        store.add(CssRule::new(".card", "color: red"));
        let hover = store.add(CssRule::new(".card", "color: blue").with_state("hover"));

        assert_eq!(store.find(".card:hover"), Some(hover));
        assert_ne!(store.find(".card"), Some(hover));
        assert!(store.find(".missing").is_none());
    }

    #[test]
    fn find_skips_at_rule_entries() {
        let mut store = RuleStore::new();
        let media = store.add(CssRule::new("#hero", "color: blue").in_at_rule(
            "media",
            "(max-width: 600px)",
        ));
        let bare = store.add(CssRule::new("#hero", "color: red"));

        assert_eq!(store.find("#hero"), Some(bare));
        assert_ne!(store.find("#hero"), Some(media));
    }

    #[test]
    fn remove_preserves_other_entries() {
        let mut store = RuleStore::new();
        let a = store.add(CssRule::new(".a", "color: red"));
        let b = store.add(CssRule::new(".b", "color: blue"));

        store.remove(&[a]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.find(".b"), Some(b));
        // Removing again is harmless.
        store.remove(&[a]);
        assert_eq!(store.len(), 1);
    }
}
