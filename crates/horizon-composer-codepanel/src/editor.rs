//! Code editor orchestration.
//!
//! Ties the panel machine, the edit buffers, the serializer, and the patch
//! engine together over the host traits. All operations run synchronously
//! to completion inside a host-delivered UI event; none of them suspend,
//! and none of them throw to the host: empty or unchanged input is a
//! no-op, malformed CSS blocks fail only themselves.

use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;
use std::time::Instant;

use horizon_composer_style::patch::{self, PatchStats};

use crate::buffer::EditBuffers;
use crate::host::{CssInliner, EditorHost, PanelChrome};
use crate::options::CodePanelOptions;
use crate::panel::PanelMachine;
use crate::serializer::{serialize_css, serialize_html};
use crate::signal::{ConnectionGuard, EditorEvents};

const TARGET: &str = "horizon_composer_codepanel::editor";

/// What an apply operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Nothing happened: empty input, unchanged input, no selection, or
    /// the panel was never built.
    Noop,
    /// The edit was applied.
    Applied(PatchStats),
}

/// Result of a delete-selected-CSS operation: the buffer text with the
/// selected ranges excised, plus the store mutation counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// The CSS buffer text after deletion.
    pub text: String,
    /// Store entries removed and blocks skipped.
    pub stats: PatchStats,
}

/// The code editor: serializes the selected component into the edit
/// buffers and reconciles edited text back into the component tree and
/// the shared rule store.
pub struct CodeEditor {
    options: CodePanelOptions,
    panel: PanelMachine,
    buffers: Option<EditBuffers>,
    dirty: Rc<Cell<bool>>,
    guards: Vec<ConnectionGuard<()>>,
    inliner: Option<Box<dyn CssInliner>>,
}

impl CodeEditor {
    /// Create an editor. Call [`build`](Self::build) before use.
    pub fn new(options: CodePanelOptions) -> Self {
        let panel = PanelMachine::new(&options);
        Self {
            options,
            panel,
            buffers: None,
            dirty: Rc::new(Cell::new(false)),
            guards: vec![],
            inliner: None,
        }
    }

    /// Install the CSS inliner used under the `inline_css` option.
    pub fn set_inliner(&mut self, inliner: Box<dyn CssInliner>) {
        self.inliner = Some(inliner);
    }

    /// The configured options.
    pub fn options(&self) -> &CodePanelOptions {
        &self.options
    }

    /// Whether [`build`](Self::build) has run and teardown has not.
    pub fn is_built(&self) -> bool {
        self.buffers.is_some()
    }

    /// Build the panel state: create the edit buffers and subscribe to the
    /// host's component events. Subscriptions are held as RAII guards so a
    /// torn-down panel cannot be re-entered.
    pub fn build(&mut self, events: &EditorEvents) {
        if self.is_built() {
            return;
        }
        self.buffers = Some(EditBuffers::new(self.options.inline_css));
        let dirty = self.dirty.clone();
        self.guards
            .push(events.component_updated.connect_scoped(move |_| dirty.set(true)));
        let dirty = self.dirty.clone();
        self.guards
            .push(events.component_added.connect_scoped(move |_| dirty.set(true)));
        tracing::debug!(target: TARGET, "code panel built");
    }

    /// Release the subscriptions and drop the edit buffers.
    pub fn teardown(&mut self) {
        self.guards.clear();
        self.buffers = None;
        self.dirty.set(false);
        tracing::debug!(target: TARGET, "code panel torn down");
    }

    /// Open the edit surface and refresh its contents from the current
    /// selection. Idempotent while already open.
    pub fn open<H: EditorHost>(
        &mut self,
        host: &mut H,
        chrome: &mut dyn PanelChrome,
        now: Instant,
    ) {
        self.panel.open(chrome, now);
        self.refresh_contents(host, chrome);
    }

    /// Close the edit surface.
    pub fn close(&mut self, chrome: &mut dyn PanelChrome) {
        self.panel.close(chrome);
    }

    /// Drain pending work: a content refresh if a component event arrived
    /// since the last pump, and the post-resize viewer re-measure once its
    /// deadline passes. The host calls this from its event loop, after its
    /// own synchronous state changes, which is what keeps refreshes
    /// ordered after the mutations that caused them.
    pub fn pump<H: EditorHost>(
        &mut self,
        host: &mut H,
        chrome: &mut dyn PanelChrome,
        now: Instant,
    ) {
        if self.dirty.replace(false) {
            self.refresh_contents(host, chrome);
        }
        self.panel.poll_settle(chrome, now);
    }

    /// Re-serialize the selected component into the buffers and the text
    /// widgets. Skipped while the panel is closed (no wasted work for an
    /// invisible surface) and when nothing is selected (buffers keep their
    /// prior content).
    pub fn refresh_contents<H: EditorHost>(
        &mut self,
        host: &mut H,
        chrome: &mut dyn PanelChrome,
    ) {
        if !self.panel.is_open() {
            return;
        }
        let Some(buffers) = &mut self.buffers else {
            return;
        };
        let Some(component) = host.selected_component() else {
            tracing::debug!(target: TARGET, "no selection; keeping buffer contents");
            return;
        };

        let html = serialize_html(host, component, &self.options);
        if self.options.inline_css {
            let css = serialize_css(host, component);
            let inlined = match &self.inliner {
                Some(inliner) => inliner.inline(&html, &css),
                None => {
                    tracing::warn!(target: TARGET, "inline_css set but no inliner installed");
                    html
                }
            };
            buffers.html.load(inlined.as_str());
            chrome.display_html(&inlined);
        } else {
            buffers.html.load(html.as_str());
            chrome.display_html(&html);
            let css = serialize_css(host, component);
            if let Some(css_buffer) = &mut buffers.css {
                css_buffer.load(css.as_str());
                chrome.display_css(&css);
            }
        }
    }

    /// Apply edited HTML text.
    ///
    /// ID-scoped rules are lifted out of the current CSS text and appended
    /// to the markup as a trailing style block; class- and element-scoped
    /// rules stay in the shared store, where sibling nodes still resolve
    /// them. The tree root has its contents replaced (the root node itself
    /// survives); any other node is replaced wholesale and the new node
    /// reselected.
    pub fn apply_html<H: EditorHost>(
        &mut self,
        host: &mut H,
        html_text: &str,
        css_text: &str,
    ) -> ApplyOutcome {
        let Some(buffers) = &mut self.buffers else {
            return ApplyOutcome::Noop;
        };
        let trimmed = html_text.trim();
        if buffers.html.is_noop(trimmed) {
            return ApplyOutcome::Noop;
        }
        let Some(component) = host.selected_component() else {
            tracing::debug!(target: TARGET, "apply_html with no selection");
            return ApplyOutcome::Noop;
        };

        let mut html = trimmed.to_string();
        if self.options.inline_css {
            let css = serialize_css(host, component);
            if let Some(inliner) = &self.inliner {
                html = inliner.inline(&html, &css);
            } else {
                tracing::warn!(target: TARGET, "inline_css set but no inliner installed");
            }
        } else {
            let id_rules = patch::extract_id_rules(css_text);
            if !id_rules.is_empty() {
                html.push_str("<style>");
                html.push_str(&id_rules);
                html.push_str("</style>");
            }
        }

        if host.is_root(component) {
            host.set_root_contents(&html);
        } else {
            let replacement = host.replace_component(component, &html);
            host.select(replacement);
        }

        buffers.html.mark_applied(trimmed);
        tracing::debug!(target: TARGET, "applied html edit");
        ApplyOutcome::Applied(PatchStats::default())
    }

    /// Apply edited CSS text against the shared rule store.
    pub fn apply_css<H: EditorHost>(&mut self, host: &mut H, css_text: &str) -> ApplyOutcome {
        if self.options.inline_css {
            return ApplyOutcome::Noop;
        }
        let Some(buffers) = &mut self.buffers else {
            return ApplyOutcome::Noop;
        };
        let Some(css_buffer) = &mut buffers.css else {
            return ApplyOutcome::Noop;
        };
        let trimmed = css_text.trim();
        if css_buffer.is_noop(trimmed) {
            return ApplyOutcome::Noop;
        }

        let stats = patch::apply_css(host.rule_store_mut(), trimmed);
        css_buffer.mark_applied(trimmed);
        ApplyOutcome::Applied(stats)
    }

    /// Remove the rules inside the user's selected text ranges from the
    /// store, and return the buffer text with those ranges excised.
    pub fn delete_selected_css<H: EditorHost>(
        &mut self,
        host: &mut H,
        chrome: &mut dyn PanelChrome,
        css_text: &str,
        ranges: &[Range<usize>],
    ) -> DeleteOutcome {
        let mut outcome = DeleteOutcome {
            text: css_text.to_string(),
            stats: PatchStats::default(),
        };
        if !self.options.clean_css || self.options.inline_css || self.buffers.is_none() {
            return outcome;
        }

        let mut ordered: Vec<Range<usize>> = vec![];
        for range in ranges {
            match css_text.get(range.clone()) {
                Some(selection) => {
                    outcome
                        .stats
                        .merge(patch::remove_css(host.rule_store_mut(), selection));
                    ordered.push(range.clone());
                }
                None => {
                    tracing::warn!(target: TARGET, ?range, "ignoring invalid selection range");
                }
            }
        }

        // Excise back to front so earlier ranges keep their offsets.
        ordered.sort_by(|a, b| b.start.cmp(&a.start));
        for range in ordered {
            if outcome.text.get(range.clone()).is_some() {
                outcome.text.replace_range(range, "");
            }
        }

        if let Some(buffers) = &mut self.buffers
            && let Some(css_buffer) = &mut buffers.css
        {
            css_buffer.load(outcome.text.as_str());
            chrome.display_css(&outcome.text);
        }
        outcome
    }
}
