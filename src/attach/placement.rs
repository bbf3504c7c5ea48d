//! Where an indicator goes in a field's layout.

use crate::config::{EngineConfig, HostSelectors};
use crate::dom::{Document, Selector};
use crate::Result;

/// The nodes a placement decision works from.
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext {
    /// The (now hidden) description element.
    pub description: u64,
    /// The label found for the description.
    pub label: u64,
    /// Closest field container, or the description's parent.
    pub property: u64,
}

/// Which rule placed the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementSlot {
    /// Appended to the field label, after a sibling icon when one exists.
    LabelText { after_icon: bool },
    /// Appended to the property editor's label area.
    EditorLabelArea { after_icon: bool },
    /// Appended to a block list/grid content title.
    BlockTitle { after_icon: bool },
    /// Absolutely positioned in the container's top-right corner.
    ContainerCorner,
    /// Right after the description element.
    AfterDescription,
}

impl PlacementSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LabelText { .. } => "label",
            Self::EditorLabelArea { .. } => "editor-label",
            Self::BlockTitle { .. } => "block-title",
            Self::ContainerCorner => "corner",
            Self::AfterDescription => "after-description",
        }
    }
}

/// Inserts an indicator wrapper into the document.
pub trait PlacementPolicy {
    fn place(
        &self,
        doc: &mut Document,
        selectors: &HostSelectors,
        config: &EngineConfig,
        cx: &PlacementContext,
        wrapper: u64,
    ) -> Result<PlacementSlot>;
}

/// Ordered fallback rules; the first that finds a home wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackPlacement;

impl PlacementPolicy for FallbackPlacement {
    fn place(
        &self,
        doc: &mut Document,
        selectors: &HostSelectors,
        config: &EngineConfig,
        cx: &PlacementContext,
        wrapper: u64,
    ) -> Result<PlacementSlot> {
        let property = cx.property;

        if let Some(label) = doc.find_first(property, &selectors.placement_label) {
            let after_icon = append_after_icon(doc, label, &selectors.sibling_icon, wrapper)?;
            doc.set_style(wrapper, "margin-left", &config.wrapper_margin_left);
            return Ok(PlacementSlot::LabelText { after_icon });
        }

        let editor = doc
            .find_first(property, &selectors.property_editor)
            .or_else(|| doc.closest(property, &selectors.property_editor));
        if let Some(area) = editor.and_then(|e| doc.find_first(e, &selectors.editor_label_area)) {
            let after_icon = append_after_icon(doc, area, &selectors.sibling_icon, wrapper)?;
            return Ok(PlacementSlot::EditorLabelArea { after_icon });
        }

        let title = doc
            .closest(property, &selectors.block_scope)
            .and_then(|scope| doc.find_first(scope, &selectors.block_title));
        if let Some(title) = title {
            let after_icon = append_after_icon(doc, title, &selectors.sibling_icon, wrapper)?;
            return Ok(PlacementSlot::BlockTitle { after_icon });
        }

        if let Some(container) = doc.closest(property, &selectors.corner_container) {
            if !matches!(doc.style_value(container, "position"), Some("relative" | "absolute")) {
                doc.set_style(container, "position", "relative");
            }
            let corner = doc.create_element("div");
            if let Some(node) = doc.get_mut(corner) {
                node.apply_style_attr("position: absolute; top: 8px; right: 8px; z-index: 100");
            }
            doc.append_child(corner, wrapper)?;
            doc.append_child(container, corner)?;
            return Ok(PlacementSlot::ContainerCorner);
        }

        doc.insert_after(cx.description, wrapper)?;
        Ok(PlacementSlot::AfterDescription)
    }
}

/// Put `wrapper` right after an existing sibling icon inside `host`, or at
/// the end of `host` when there is none. Returns whether an icon was found.
fn append_after_icon(doc: &mut Document, host: u64, icon: &Selector, wrapper: u64) -> Result<bool> {
    match doc.find_first(host, icon) {
        Some(existing) => {
            doc.insert_after(existing, wrapper)?;
            Ok(true)
        }
        None => {
            doc.append_child(host, wrapper)?;
            Ok(false)
        }
    }
}
