//! Panel open/close state machine.

use std::time::{Duration, Instant};

use crate::host::PanelChrome;
use crate::options::{CodePanelOptions, SplitSizing};

const TARGET: &str = "horizon_composer_codepanel::panel";

/// Whether the edit surface is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Edit surface hidden; serialization is skipped.
    Closed,
    /// Edit surface visible.
    Open,
}

/// Drives panel visibility, the canvas/side-panel split widths, and the
/// post-transition re-measure of the text widgets.
///
/// Invoked only from host-delivered UI events; it never runs concurrently
/// with itself. The settle deadline is plain state polled by the host's
/// event loop; there is no timer thread, and firing the refresh twice
/// only re-measures twice.
#[derive(Debug)]
pub struct PanelMachine {
    state: PanelState,
    settle_delay: Duration,
    settle_deadline: Option<Instant>,
    preserve_width: bool,
    open_split: SplitSizing,
    closed_split: SplitSizing,
}

impl PanelMachine {
    /// Create a machine in the `Closed` state.
    pub fn new(options: &CodePanelOptions) -> Self {
        Self {
            state: PanelState::Closed,
            settle_delay: options.settle_delay,
            settle_deadline: None,
            preserve_width: options.preserve_width,
            open_split: options.open_split,
            closed_split: options.closed_split,
        }
    }

    /// Current state.
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Whether the panel is open.
    pub fn is_open(&self) -> bool {
        self.state == PanelState::Open
    }

    /// Open the edit surface. Idempotent: re-opening an open panel just
    /// re-shows it (the caller re-serializes either way).
    pub fn open(&mut self, chrome: &mut dyn PanelChrome, now: Instant) {
        self.state = PanelState::Open;
        chrome.set_panel_visible(true);
        // Re-measure once the chrome's width transition has settled.
        self.settle_deadline = Some(now + self.settle_delay);
        if !self.preserve_width {
            chrome.set_split_widths(self.open_split.canvas, self.open_split.panel);
        }
        tracing::debug!(target: TARGET, "panel opened");
    }

    /// Close the edit surface and restore the closed split widths.
    pub fn close(&mut self, chrome: &mut dyn PanelChrome) {
        self.state = PanelState::Closed;
        chrome.set_panel_visible(false);
        self.settle_deadline = None;
        if !self.preserve_width {
            chrome.set_split_widths(self.closed_split.canvas, self.closed_split.panel);
        }
        tracing::debug!(target: TARGET, "panel closed");
    }

    /// Fire the pending viewer refresh once its deadline has passed.
    pub fn poll_settle(&mut self, chrome: &mut dyn PanelChrome, now: Instant) {
        if let Some(deadline) = self.settle_deadline
            && now >= deadline
        {
            self.settle_deadline = None;
            chrome.refresh_viewers();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct ChromeLog {
        visible: Option<bool>,
        widths: Vec<(f32, f32)>,
        refreshes: usize,
    }

    impl PanelChrome for ChromeLog {
        fn set_panel_visible(&mut self, visible: bool) {
            self.visible = Some(visible);
        }
        fn set_split_widths(&mut self, canvas: f32, panel: f32) {
            self.widths.push((canvas, panel));
        }
        fn display_html(&mut self, _text: &str) {}
        fn display_css(&mut self, _text: &str) {}
        fn refresh_viewers(&mut self) {
            self.refreshes += 1;
        }
    }

    #[test]
    fn open_applies_open_split() {
        let mut machine = PanelMachine::new(&CodePanelOptions::default());
        let mut chrome = ChromeLog::default();
        machine.open(&mut chrome, Instant::now());

        assert!(machine.is_open());
        assert_eq!(chrome.visible, Some(true));
        assert_eq!(chrome.widths, vec![(65.0, 35.0)]);
    }

    #[test]
    fn close_restores_closed_split() {
        let mut machine = PanelMachine::new(&CodePanelOptions::default());
        let mut chrome = ChromeLog::default();
        machine.open(&mut chrome, Instant::now());
        machine.close(&mut chrome);

        assert!(!machine.is_open());
        assert_eq!(chrome.visible, Some(false));
        assert_eq!(chrome.widths.last(), Some(&(85.0, 15.0)));
    }

    #[test]
    fn preserve_width_skips_resizing() {
        let options = CodePanelOptions {
            preserve_width: true,
            ..CodePanelOptions::default()
        };
        let mut machine = PanelMachine::new(&options);
        let mut chrome = ChromeLog::default();
        machine.open(&mut chrome, Instant::now());
        machine.close(&mut chrome);
        assert!(chrome.widths.is_empty());
    }

    #[test]
    fn settle_refresh_fires_once_after_delay() {
        let mut machine = PanelMachine::new(&CodePanelOptions::default());
        let mut chrome = ChromeLog::default();
        let t0 = Instant::now();
        machine.open(&mut chrome, t0);

        machine.poll_settle(&mut chrome, t0 + Duration::from_millis(100));
        assert_eq!(chrome.refreshes, 0);

        machine.poll_settle(&mut chrome, t0 + Duration::from_millis(400));
        assert_eq!(chrome.refreshes, 1);

        machine.poll_settle(&mut chrome, t0 + Duration::from_millis(800));
        assert_eq!(chrome.refreshes, 1);
    }

    #[test]
    fn close_disarms_pending_refresh() {
        let mut machine = PanelMachine::new(&CodePanelOptions::default());
        let mut chrome = ChromeLog::default();
        let t0 = Instant::now();
        machine.open(&mut chrome, t0);
        machine.close(&mut chrome);
        machine.poll_settle(&mut chrome, t0 + Duration::from_secs(1));
        assert_eq!(chrome.refreshes, 0);
    }
}
