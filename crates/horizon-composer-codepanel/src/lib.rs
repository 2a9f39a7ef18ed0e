//! Code panel for Horizon Composer.
//!
//! Lets a user view and hand-edit the HTML and CSS of the currently
//! selected canvas component, then reconciles those edits back into the
//! live component tree and the shared style rule store. The surrounding
//! visual editor (component tree, rendering, selection, panel chrome,
//! text widgets) sits behind the [`host::EditorHost`] and
//! [`host::PanelChrome`] traits.
//!
//! Control flow: a selection change or component mutation in the host
//! re-serializes the component into the two edit buffers; the user edits
//! and applies; the patch engine reconciles the edited CSS against the
//! shared rule store (or replaces the component's markup for HTML edits);
//! the host re-renders and the next refresh closes the loop.
//!
//! Everything runs synchronously inside host-delivered UI events on the
//! host's cooperative single-threaded loop. The only deferred work is the
//! text-widget re-measure after a panel width transition, tracked as a
//! deadline polled by the host's event loop.
//!
//! # Example
//!
//! ```ignore
//! use horizon_composer_codepanel::prelude::*;
//! use std::time::Instant;
//!
//! let mut command = CodePanelCommand::new(CodePanelOptions::default());
//! // First activation builds the editor and opens the panel.
//! command.run(&mut host, &mut chrome, &events, Instant::now());
//! ```

pub mod buffer;
pub mod command;
pub mod editor;
pub mod host;
pub mod options;
pub mod panel;
pub mod serializer;
pub mod signal;

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::buffer::{EditBuffer, EditBuffers};
    pub use crate::command::CodePanelCommand;
    pub use crate::editor::{ApplyOutcome, CodeEditor, DeleteOutcome};
    pub use crate::host::{CssInliner, EditorHost, PanelChrome};
    pub use crate::options::{CodePanelOptions, SplitSizing};
    pub use crate::panel::{PanelMachine, PanelState};
    pub use crate::serializer::{serialize_css, serialize_html};
    pub use crate::signal::{ConnectionGuard, ConnectionId, EditorEvents, Signal};

    pub use horizon_composer_style::codegen::RuleScope;
    pub use horizon_composer_style::patch::PatchStats;
    pub use horizon_composer_style::rules::{CssRule, RuleStore};
}
