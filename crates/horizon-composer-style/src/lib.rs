//! CSS rule store, parser, and patch engine for the Horizon Composer code
//! panel.
//!
//! This crate is the CSS half of the bidirectional HTML/CSS synchronization
//! engine:
//!
//! - **Rules**: the shared [`rules::RuleStore`] of every active style rule,
//!   keyed by selector / pseudo-state / at-rule identity
//! - **Parsing**: an explicit brace-depth scanner splits edited text into
//!   blocks, and a `cssparser`-backed descriptor parser turns each block
//!   into a [`parser::RuleDescriptor`] with per-block error recovery
//! - **Patching**: [`patch::apply_css`] and [`patch::remove_css`] reconcile
//!   descriptors against the store without corrupting unrelated rules
//! - **Codegen**: [`codegen::css_for_scope`] renders a component's scoped
//!   rules back into editable text that round-trips
//!
//! # Example
//!
//! ```
//! use horizon_composer_style::prelude::*;
//!
//! let mut store = RuleStore::new();
//! store.add(CssRule::new("#hero", "color: red"));
//!
//! // A hand-edited buffer comes back from the panel:
//! let stats = apply_css(&mut store, "#hero { color: blue; }\n.card { margin: 0; }");
//! assert_eq!(stats.replaced, 1);
//! assert_eq!(stats.created, 1);
//! ```

pub mod codegen;
pub mod parser;
pub mod patch;
pub mod rules;

mod error;

pub use error::{Error, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::codegen::{RuleScope, css_for_scope, render_store};
    pub use crate::parser::{ParseOutcome, RuleDescriptor, parse_css};
    pub use crate::patch::{PatchStats, apply_css, extract_id_rules, remove_css};
    pub use crate::rules::{AtRule, CssRule, RuleId, RuleStore};
}
