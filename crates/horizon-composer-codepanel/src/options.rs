//! Code panel configuration.

use std::time::Duration;

/// Width percentages for the canvas / side-panel pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSizing {
    /// Canvas width, percent.
    pub canvas: f32,
    /// Side-panel width, percent.
    pub panel: f32,
}

impl SplitSizing {
    /// Create a sizing pair.
    pub fn new(canvas: f32, panel: f32) -> Self {
        Self { canvas, panel }
    }
}

/// Options recognized by the code panel.
#[derive(Debug, Clone, PartialEq)]
pub struct CodePanelOptions {
    /// Split widths while the panel is open.
    pub open_split: SplitSizing,
    /// Split widths while the panel is closed.
    pub closed_split: SplitSizing,
    /// Skip canvas/side-panel resizing on open and close.
    pub preserve_width: bool,
    /// Serialize the component's canonical exported markup, stripped of
    /// editor data attributes, instead of the live rendered markup.
    pub clear_data: bool,
    /// Append the component's attached script body to the HTML buffer.
    pub edit_js: bool,
    /// Serialize CSS inlined into the HTML via the host's inliner instead
    /// of as a separate editable buffer. Disables the CSS buffer and all
    /// rule-store patching.
    pub inline_css: bool,
    /// Enable the delete-selected-CSS affordance.
    pub clean_css: bool,
    /// How long the chrome's width transition runs before the text widgets
    /// are re-measured.
    pub settle_delay: Duration,
}

impl Default for CodePanelOptions {
    fn default() -> Self {
        Self {
            open_split: SplitSizing::new(65.0, 35.0),
            closed_split: SplitSizing::new(85.0, 15.0),
            preserve_width: false,
            clear_data: false,
            edit_js: false,
            inline_css: false,
            clean_css: true,
            settle_delay: Duration::from_millis(300),
        }
    }
}
