//! Early hiding of raw descriptions while the engine starts.
//!
//! The guard hides descriptions inside field containers (an injected style
//! rule plus inline `visibility: hidden`), keeps re-hiding new ones on a
//! short ticker, and arms a fallback that reveals anything still
//! unprocessed. The first successful discovery pass cancels it.

use crate::attach::keep_visible;
use crate::classes;
use crate::config::{EngineConfig, HostSelectors};
use crate::dom::Document;
use crate::timer::{Scheduler, TimerKind};
use crate::Result;

/// State of the flash guard.
#[derive(Debug, Default)]
pub struct FlashGuard {
    fallback: Option<u64>,
    watch: Option<u64>,
    style_node: Option<u64>,
}

impl FlashGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the fallback is still armed.
    pub fn is_armed(&self) -> bool {
        self.fallback.is_some()
    }

    /// Hide descriptions now and arm the watch ticker and the fallback timer.
    pub fn arm(
        &mut self,
        doc: &mut Document,
        selectors: &HostSelectors,
        config: &EngineConfig,
        scheduler: &mut Scheduler,
    ) -> Result<()> {
        if self.is_armed() {
            return Ok(());
        }
        self.inject_style(doc, selectors)?;
        let hidden = hide_descriptions(doc, selectors);
        tracing::debug!("Flash guard hid {} description(s)", hidden);
        self.fallback = Some(scheduler.schedule(TimerKind::FlashFallback, config.flash_fallback()));
        self.watch = Some(scheduler.schedule_ticker(TimerKind::FlashWatch, config.flash_watch_interval()));
        Ok(())
    }

    fn inject_style(&mut self, doc: &mut Document, selectors: &HostSelectors) -> Result<()> {
        if let Some(existing) = doc.element_by_id(classes::FLASH_STYLE_ID) {
            self.style_node = Some(existing);
            return Ok(());
        }
        let rule = selectors
            .flash_scope
            .as_str()
            .split(',')
            .map(|scope| format!("{} {}", scope.trim(), selectors.description.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let style = doc.create_element("style");
        doc.set_attr(style, "id", classes::FLASH_STYLE_ID);
        let text = doc.create_text(&format!("{rule} {{ visibility: hidden !important; }}"));
        doc.append_child(style, text)?;
        let head = doc.first_by_tag("head").unwrap_or_else(|| doc.root());
        doc.append_child(head, style)?;
        self.style_node = Some(style);
        Ok(())
    }

    /// Watch ticker fired: hide descriptions that appeared since the last tick.
    pub fn on_watch(&mut self, doc: &mut Document, selectors: &HostSelectors) {
        hide_descriptions(doc, selectors);
    }

    /// Fallback fired: the engine never finished its first pass.
    pub fn on_fallback(&mut self, doc: &mut Document, selectors: &HostSelectors, scheduler: &mut Scheduler) -> Result<usize> {
        self.fallback = None;
        scheduler.cancel_slot(&mut self.watch);
        let stuck: Vec<u64> = doc
            .find_all(doc.root(), &selectors.description)
            .into_iter()
            .filter(|&id| {
                doc.style_value(id, "visibility") == Some("hidden")
                    && !doc.has_class(id, classes::PROCESSED)
                    && !doc.has_class(id, classes::HIDDEN)
            })
            .collect();
        for &id in &stuck {
            keep_visible(doc, id);
        }
        self.remove_style(doc)?;
        tracing::warn!("Flash guard fallback revealed {} description(s)", stuck.len());
        Ok(stuck.len())
    }

    /// Discovery finished a pass; stand down.
    pub fn cancel(&mut self, doc: &mut Document, scheduler: &mut Scheduler) -> Result<()> {
        if self.fallback.is_none() && self.watch.is_none() {
            return Ok(());
        }
        scheduler.cancel_slot(&mut self.fallback);
        scheduler.cancel_slot(&mut self.watch);
        self.remove_style(doc)?;
        tracing::debug!("Flash guard cancelled");
        Ok(())
    }

    fn remove_style(&mut self, doc: &mut Document) -> Result<()> {
        if let Some(style) = self.style_node.take() {
            if doc.contains(style) {
                doc.remove(style)?;
            }
        }
        Ok(())
    }

    /// Whether the injected rule currently suppresses `description`.
    pub fn suppresses(&self, doc: &Document, selectors: &HostSelectors, description: u64) -> bool {
        self.style_node.is_some_and(|s| doc.contains(s))
            && doc.closest(description, &selectors.flash_scope).is_some()
            && !doc.has_class(description, classes::KEEP_VISIBLE)
            && !doc.has_class(description, classes::PROCESSED)
    }
}

/// Inline-hide unsettled descriptions inside flash-scope containers.
fn hide_descriptions(doc: &mut Document, selectors: &HostSelectors) -> usize {
    let mut targets: Vec<u64> = doc
        .find_all(doc.root(), &selectors.flash_scope)
        .into_iter()
        .flat_map(|scope| doc.find_all(scope, &selectors.description))
        .filter(|&id| {
            !doc.has_class(id, classes::KEEP_VISIBLE)
                && !doc.has_class(id, classes::PROCESSED)
                && doc.style_value(id, "visibility") != Some("visible")
                && doc.style_value(id, "visibility") != Some("hidden")
        })
        .collect();
    targets.sort_unstable();
    targets.dedup();
    for &id in &targets {
        doc.set_style(id, "visibility", "hidden");
    }
    targets.len()
}
