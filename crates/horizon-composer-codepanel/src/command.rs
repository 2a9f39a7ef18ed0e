//! Command-scope ownership of the code editor.
//!
//! The host registers an open-code command; the editor instance is lazily
//! created on first activation and reused on subsequent opens. Ownership is
//! explicit: the instance lives in the command registration scope, and
//! unregistering the command tears it down.

use std::time::Instant;

use crate::editor::CodeEditor;
use crate::host::{CssInliner, EditorHost, PanelChrome};
use crate::options::CodePanelOptions;
use crate::signal::EditorEvents;

/// The open-code command: lazily builds one [`CodeEditor`] and drives its
/// open/close lifecycle.
pub struct CodePanelCommand {
    options: CodePanelOptions,
    editor: Option<CodeEditor>,
    inliner: Option<Box<dyn CssInliner>>,
}

impl CodePanelCommand {
    /// Create the command with the given options.
    pub fn new(options: CodePanelOptions) -> Self {
        Self {
            options,
            editor: None,
            inliner: None,
        }
    }

    /// Provide the CSS inliner handed to the editor at first build. Only
    /// meaningful with the `inline_css` option.
    pub fn with_inliner(mut self, inliner: Box<dyn CssInliner>) -> Self {
        self.inliner = Some(inliner);
        self
    }

    /// Run the command: build the editor on first activation, then open
    /// the panel. Returns the editor for follow-up calls.
    pub fn run<H: EditorHost>(
        &mut self,
        host: &mut H,
        chrome: &mut dyn PanelChrome,
        events: &EditorEvents,
        now: Instant,
    ) -> &mut CodeEditor {
        let editor = self.editor.get_or_insert_with(|| {
            let mut editor = CodeEditor::new(self.options.clone());
            if let Some(inliner) = self.inliner.take() {
                editor.set_inliner(inliner);
            }
            editor.build(events);
            editor
        });
        editor.open(host, chrome, now);
        editor
    }

    /// Stop the command: close the panel if the editor exists.
    pub fn stop(&mut self, chrome: &mut dyn PanelChrome) {
        if let Some(editor) = &mut self.editor {
            editor.close(chrome);
        }
    }

    /// The editor, if it has been built.
    pub fn editor(&mut self) -> Option<&mut CodeEditor> {
        self.editor.as_mut()
    }

    /// Unregister: tear the editor down and drop it.
    pub fn unregister(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            editor.teardown();
        }
    }
}
