//! Serializing the selected component into the edit buffers.

use horizon_composer_style::codegen;

use crate::host::EditorHost;
use crate::options::CodePanelOptions;

/// Produce the editable HTML text for a component.
///
/// With `clear_data`, the canonical exported markup is used. Otherwise the
/// live rendered element is read: inner markup for the tree root (its own
/// wrapping tag is not editable), outer markup for any other node. The
/// editor-only selection marker is removed before the read and restored
/// after, unconditionally, so it can never leak into emitted text. With
/// `edit_js`, a present script body is appended in a script tag.
pub fn serialize_html<H: EditorHost>(
    host: &mut H,
    component: H::ComponentId,
    options: &CodePanelOptions,
) -> String {
    host.set_selection_marker(component, false);
    let mut result = if options.clear_data {
        host.exported_markup(component)
    } else if host.is_root(component) {
        host.rendered_inner_markup(component)
    } else {
        host.rendered_markup(component)
    };
    host.set_selection_marker(component, true);

    if options.edit_js
        && let Some(script) = host.script_body(component)
        && !script.is_empty()
    {
        result.push_str("<script>");
        result.push_str(&script);
        result.push_str("</script>");
    }

    result
}

/// Produce the editable CSS text for a component: the store rules in the
/// component's scope, rendered by the shared code generator.
pub fn serialize_css<H: EditorHost>(host: &H, component: H::ComponentId) -> String {
    codegen::css_for_scope(host.rule_store(), &host.rule_scope(component))
}
