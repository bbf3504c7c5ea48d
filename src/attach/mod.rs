//! Turning inline descriptions into indicators.
//!
//! For each description: skip it if already handled, keep it inline if it is
//! too short or has no label, otherwise hide it, build an indicator and hand
//! the wrapper to the placement policy. Any failure leaves the description
//! visible.

mod placement;

pub use placement::{FallbackPlacement, PlacementContext, PlacementPolicy, PlacementSlot};

use crate::classes;
use crate::config::{EngineConfig, HostSelectors};
use crate::dom::Document;
use crate::markup::inner_markup;
use crate::Result;

/// A description captured at attachment time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionRecord {
    /// The source element.
    pub source: u64,
    /// Original inner markup, shown in the tooltip.
    pub markup: String,
    /// Length of the trimmed text, in characters.
    pub text_len: usize,
}

/// An attached indicator control.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    /// The focusable control element.
    pub control: u64,
    /// Its wrapper element.
    pub wrapper: u64,
    pub slot: PlacementSlot,
    pub description: DescriptionRecord,
}

/// Why a description stayed inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeepVisibleReason {
    TooShort,
    NoLabel,
    /// The field container already holds an indicator wrapper.
    AlreadyWrapped,
    /// Attachment hit an error part way through.
    Failed,
}

impl KeepVisibleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TooShort => "too short",
            Self::NoLabel => "no label",
            Self::AlreadyWrapped => "already wrapped",
            Self::Failed => "failed",
        }
    }
}

/// Result of one attachment attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachOutcome {
    Attached(Indicator),
    /// Already processed or already marked keep-visible; nothing changed.
    Skipped,
    KeptVisible(KeepVisibleReason),
}

/// Whether `id` has already been through attachment.
pub fn is_settled(doc: &Document, id: u64) -> bool {
    doc.has_class(id, classes::PROCESSED) || doc.has_class(id, classes::KEEP_VISIBLE)
}

/// Leave a description inline and make sure nothing keeps it hidden.
pub fn keep_visible(doc: &mut Document, description: u64) {
    doc.remove_class(description, classes::HIDDEN);
    doc.add_class(description, classes::KEEP_VISIBLE);
    if doc.style_value(description, "visibility").is_some() {
        doc.set_style(description, "visibility", "visible");
    }
}

/// Runs attachment with one configuration and placement policy.
pub struct Attacher<'a> {
    pub selectors: &'a HostSelectors,
    pub config: &'a EngineConfig,
    pub policy: &'a dyn PlacementPolicy,
}

impl Attacher<'_> {
    /// Attach an indicator for `description`. Never fails: errors degrade to
    /// keeping the description visible.
    pub fn attach(&self, doc: &mut Document, description: u64) -> AttachOutcome {
        match self.try_attach(doc, description) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Attachment failed for description {}: {}", description, e);
                keep_visible(doc, description);
                AttachOutcome::KeptVisible(KeepVisibleReason::Failed)
            }
        }
    }

    fn keep(&self, doc: &mut Document, description: u64, reason: KeepVisibleReason) -> AttachOutcome {
        tracing::debug!("Description {} stays inline: {}", description, reason.as_str());
        keep_visible(doc, description);
        AttachOutcome::KeptVisible(reason)
    }

    fn try_attach(&self, doc: &mut Document, description: u64) -> Result<AttachOutcome> {
        if !doc.contains(description) {
            return Err(crate::Error::NodeNotFound(description));
        }
        if is_settled(doc, description) {
            return Ok(AttachOutcome::Skipped);
        }

        let text_len = doc.text_content(description).trim().chars().count();
        if text_len == 0 || text_len < self.config.min_length {
            return Ok(self.keep(doc, description, KeepVisibleReason::TooShort));
        }

        let container = doc.closest(description, &self.selectors.field_container);
        let Some(property) = container.or_else(|| doc.parent(description)) else {
            return Ok(self.keep(doc, description, KeepVisibleReason::NoLabel));
        };
        let already_wrapped = doc
            .descendants(property)
            .into_iter()
            .any(|id| doc.has_class(id, classes::WRAPPER));
        if already_wrapped {
            return Ok(self.keep(doc, description, KeepVisibleReason::AlreadyWrapped));
        }

        let record = DescriptionRecord {
            source: description,
            markup: inner_markup(doc, description),
            text_len,
        };
        doc.add_class(description, classes::HIDDEN);

        let Some(label) = self.find_label(doc, description, container) else {
            return Ok(self.keep(doc, description, KeepVisibleReason::NoLabel));
        };

        if let Some(node) = doc.get_mut(label) {
            if let Some(title) = node.remove_attr("title") {
                node.set_attr(classes::TITLE_BACKUP_ATTR, &title);
            }
        }

        let (wrapper, control) = self.build_indicator(doc)?;
        let cx = PlacementContext {
            description,
            label,
            property,
        };
        let slot = match self.policy.place(doc, self.selectors, self.config, &cx, wrapper) {
            Ok(slot) => slot,
            Err(e) => {
                doc.remove(wrapper).ok();
                return Err(e);
            }
        };
        tracing::debug!("Indicator {} placed at {} for description {}", control, slot.as_str(), description);

        doc.add_class(description, classes::PROCESSED);
        Ok(AttachOutcome::Attached(Indicator {
            control,
            wrapper,
            slot,
            description: record,
        }))
    }

    /// Label inside the field container, else the nearest preceding label sibling.
    fn find_label(&self, doc: &Document, description: u64, container: Option<u64>) -> Option<u64> {
        container
            .and_then(|c| doc.find_first(c, &self.selectors.label))
            .or_else(|| {
                doc.preceding_siblings(description)
                    .into_iter()
                    .find(|&sibling| self.selectors.label.matches(doc, sibling))
            })
    }

    fn build_indicator(&self, doc: &mut Document) -> Result<(u64, u64)> {
        let wrapper = doc.create_element("span");
        doc.add_class(wrapper, classes::WRAPPER);

        let control = doc.create_element("span");
        doc.add_class(control, classes::INDICATOR);
        doc.set_attr(control, "role", "button");
        doc.set_attr(control, "tabindex", "0");
        doc.set_attr(control, "aria-label", &self.config.indicator_label);
        let glyph = doc.create_text(&self.config.indicator_char);
        doc.append_child(control, glyph)?;
        doc.append_child(wrapper, control)?;
        Ok((wrapper, control))
    }
}
