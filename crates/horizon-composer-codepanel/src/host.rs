//! Host editor interface boundary.
//!
//! The surrounding visual editor (component tree, rendering, selection,
//! panel chrome, text widgets) sits behind these traits. The code panel
//! consumes them; it never owns the component tree or the rule store.

use horizon_composer_style::codegen::RuleScope;
use horizon_composer_style::rules::RuleStore;

/// The host editor's component tree and rule store, as consumed by the
/// code panel.
///
/// Component references are transient: the panel re-acquires the selection
/// through [`selected_component`](Self::selected_component) on every
/// operation and never caches one across renders.
pub trait EditorHost {
    /// Host-chosen component identity.
    type ComponentId: Copy + PartialEq;

    /// The currently selected component, if any.
    fn selected_component(&self) -> Option<Self::ComponentId>;

    /// Whether the component is the tree root ("wrapper").
    fn is_root(&self, component: Self::ComponentId) -> bool;

    /// The live rendered outer markup of the component, its own tag
    /// included.
    fn rendered_markup(&self, component: Self::ComponentId) -> String;

    /// The live rendered inner markup, without the component's own tag.
    /// Used for the tree root, whose wrapping tag is never edited.
    fn rendered_inner_markup(&self, component: Self::ComponentId) -> String;

    /// The canonical exported markup, editor data attributes stripped.
    fn exported_markup(&self, component: Self::ComponentId) -> String;

    /// The script body attached to the component, if any.
    fn script_body(&self, component: Self::ComponentId) -> Option<String>;

    /// Show or hide the editor-only "selected" visual marker class on the
    /// component's rendered element.
    fn set_selection_marker(&mut self, component: Self::ComponentId, visible: bool);

    /// Replace a non-root component with new markup, returning the newly
    /// created node.
    fn replace_component(&mut self, target: Self::ComponentId, html: &str) -> Self::ComponentId;

    /// Replace the whole tree's contents. The root node itself survives.
    fn set_root_contents(&mut self, html: &str);

    /// Select a component.
    fn select(&mut self, component: Self::ComponentId);

    /// The rule scope of the component's subtree.
    fn rule_scope(&self, component: Self::ComponentId) -> RuleScope;

    /// The shared rule store.
    fn rule_store(&self) -> &RuleStore;

    /// The shared rule store, for mutation during a synchronous apply.
    fn rule_store_mut(&mut self) -> &mut RuleStore;
}

/// The panel/splitter chrome and the two syntax-highlighting text widgets.
pub trait PanelChrome {
    /// Show or hide the edit surface.
    fn set_panel_visible(&mut self, visible: bool);

    /// Resize the canvas / side-panel pair, in percent.
    fn set_split_widths(&mut self, canvas: f32, panel: f32);

    /// Replace the HTML widget's text.
    fn display_html(&mut self, text: &str);

    /// Replace the CSS widget's text.
    fn display_css(&mut self, text: &str);

    /// Re-measure the text widgets' layout after a width change.
    fn refresh_viewers(&mut self);
}

/// Third-party CSS-to-inline-style conversion, used only under the
/// `inline_css` option.
pub trait CssInliner {
    /// Inline the given stylesheet into the markup.
    fn inline(&self, html: &str, css: &str) -> String;
}
