//! The engine: one document, one shared tooltip, and everything wired
//! between them.
//!
//! The host feeds input through [`Engine::dispatch`] and moves time forward
//! with [`Engine::advance`]. Structural changes to the document (by the
//! host or by the engine itself) are drained from the mutation log after
//! every event and every fired timer.

use crate::attach::{AttachOutcome, Attacher, FallbackPlacement, Indicator, KeepVisibleReason, PlacementPolicy};
use crate::classes;
use crate::config::{EngineConfig, HostSelectors, RouteFilter};
use crate::discovery::{newly_added_descriptions, scan_descriptions, MutationWatcher};
use crate::dom::Document;
use crate::event::{DeviceKind, Key, UiEvent};
use crate::flash_guard::FlashGuard;
use crate::geometry::{Point, Size};
use crate::timer::{Scheduler, TimerKind};
use crate::tooltip::{SharedTooltip, TextEstimate, TooltipCtx, TooltipMeasure, Visibility};
use crate::{Error, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Default viewport when the host does not report one.
pub const DEFAULT_VIEWPORT: Size = Size {
    width: 1280.0,
    height: 800.0,
};

/// What one discovery pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    /// Indicator controls created, in document order.
    pub attached: Vec<u64>,
    /// Descriptions left inline, with the reason.
    pub kept_visible: Vec<(u64, KeepVisibleReason)>,
    /// Descriptions already settled by an earlier pass.
    pub skipped: usize,
}

impl PassReport {
    fn record(&mut self, description: u64, outcome: &AttachOutcome) {
        match outcome {
            AttachOutcome::Attached(indicator) => self.attached.push(indicator.control),
            AttachOutcome::Skipped => self.skipped += 1,
            AttachOutcome::KeptVisible(reason) => self.kept_visible.push((description, *reason)),
        }
    }

    /// Number of descriptions kept inline for `reason`.
    pub fn kept_for(&self, reason: KeepVisibleReason) -> usize {
        self.kept_visible.iter().filter(|(_, r)| *r == reason).count()
    }
}

pub struct Engine {
    doc: Document,
    config: EngineConfig,
    selectors: HostSelectors,
    routes: RouteFilter,
    device: DeviceKind,
    viewport: Size,
    scheduler: Scheduler,
    tooltip: Option<SharedTooltip>,
    /// Attached indicators by control node.
    indicators: HashMap<u64, Indicator>,
    watcher: MutationWatcher,
    guard: FlashGuard,
    listening: bool,
    measure: Box<dyn TooltipMeasure>,
    placement: Box<dyn PlacementPolicy>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("nodes", &self.doc.len())
            .field("device", &self.device)
            .field("viewport", &self.viewport)
            .field("indicators", &self.indicators.len())
            .field("state", &self.visibility())
            .field("listening", &self.listening)
            .finish()
    }
}

impl Engine {
    /// Build an engine over `doc`. Selectors and route patterns are compiled
    /// once here.
    pub fn new(doc: Document, config: EngineConfig) -> Result<Self> {
        let selectors = config.selectors.compile()?;
        let routes = config.activation.compile()?;
        Ok(Self {
            doc,
            config,
            selectors,
            routes,
            device: DeviceKind::default(),
            viewport: DEFAULT_VIEWPORT,
            scheduler: Scheduler::new(),
            tooltip: None,
            indicators: HashMap::new(),
            watcher: MutationWatcher::new(),
            guard: FlashGuard::new(),
            listening: false,
            measure: Box::new(TextEstimate::default()),
            placement: Box::new(FallbackPlacement),
        })
    }

    pub fn with_device(mut self, device: DeviceKind) -> Self {
        self.device = device;
        self
    }

    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_measure(mut self, measure: Box<dyn TooltipMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn with_placement(mut self, placement: Box<dyn PlacementPolicy>) -> Self {
        self.placement = placement;
        self
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for host-side changes; they are picked up on the next
    /// `dispatch` or `advance`.
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selectors(&self) -> &HostSelectors {
        &self.selectors
    }

    pub fn device(&self) -> DeviceKind {
        self.device
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn tooltip(&self) -> Option<&SharedTooltip> {
        self.tooltip.as_ref()
    }

    pub fn visibility(&self) -> Visibility {
        self.tooltip.as_ref().map(SharedTooltip::state).unwrap_or_default()
    }

    pub fn indicators(&self) -> impl Iterator<Item = &Indicator> {
        self.indicators.values()
    }

    pub fn indicator(&self, control: u64) -> Option<&Indicator> {
        self.indicators.get(&control)
    }

    /// The indicator created for `description`, if any.
    pub fn indicator_for_description(&self, description: u64) -> Option<&Indicator> {
        self.indicators.values().find(|i| i.description.source == description)
    }

    pub fn is_active(&self) -> bool {
        self.listening
    }

    pub fn watcher(&self) -> &MutationWatcher {
        &self.watcher
    }

    pub fn flash_guard(&self) -> &FlashGuard {
        &self.guard
    }

    /// Whether `description` would be rendered inline right now.
    pub fn is_description_visible(&self, description: u64) -> bool {
        !self.doc.has_class(description, classes::HIDDEN)
            && self.doc.style_value(description, "visibility") != Some("hidden")
            && !self.guard.suppresses(&self.doc, &self.selectors, description)
    }

    /// Whether the activation predicate accepts `route`.
    pub fn route_is_active(&self, route: &str) -> bool {
        self.routes.is_active(route)
    }

    /// Start the flash guard. Call before [`Engine::activate`].
    pub fn install_flash_guard(&mut self) -> Result<()> {
        self.guard
            .arm(&mut self.doc, &self.selectors, &self.config, &mut self.scheduler)
    }

    /// Run discovery over the whole document and start listening.
    ///
    /// Safe to call again: settled descriptions are skipped, the tooltip is
    /// reused and the watcher is reconnected.
    pub fn activate(&mut self) -> Result<PassReport> {
        self.pump_mutations();
        if self.tooltip.is_none() {
            self.tooltip = Some(SharedTooltip::install(&mut self.doc)?);
        }
        self.listening = true;

        let candidates = scan_descriptions(&self.doc, &self.selectors);
        let report = self.attach_all(&candidates);
        tracing::debug!(
            "Discovery pass: {} attached, {} kept visible, {} skipped",
            report.attached.len(),
            report.kept_visible.len(),
            report.skipped
        );

        self.guard.cancel(&mut self.doc, &mut self.scheduler)?;
        // Our own insertions are not new host content.
        self.doc.take_mutations();
        self.watcher
            .observe(&self.doc, &self.selectors, &mut self.scheduler);
        Ok(report)
    }

    /// Stop listening: disconnect the watcher, hide the tooltip and drop its
    /// timers. Indicators already in the document stay.
    pub fn teardown(&mut self) -> Result<()> {
        self.watcher.disconnect(&mut self.scheduler);
        if let Some((tooltip, mut cx)) = self.split() {
            tooltip.shutdown(&mut cx)?;
        }
        self.listening = false;
        self.doc.take_mutations();
        Ok(())
    }

    fn attach_all(&mut self, candidates: &[u64]) -> PassReport {
        let attacher = Attacher {
            selectors: &self.selectors,
            config: &self.config,
            policy: self.placement.as_ref(),
        };
        let mut report = PassReport::default();
        for &description in candidates {
            let outcome = attacher.attach(&mut self.doc, description);
            report.record(description, &outcome);
            if let AttachOutcome::Attached(indicator) = outcome {
                self.indicators.insert(indicator.control, indicator);
            }
        }
        report
    }

    fn split(&mut self) -> Option<(&mut SharedTooltip, TooltipCtx<'_>)> {
        let tooltip = self.tooltip.as_mut()?;
        let cx = TooltipCtx {
            doc: &mut self.doc,
            scheduler: &mut self.scheduler,
            config: &self.config,
            viewport: self.viewport,
            device: self.device,
            measure: self.measure.as_ref(),
        };
        Some((tooltip, cx))
    }

    /// The attached indicator at or above `target`.
    fn indicator_at(&self, target: u64) -> Option<u64> {
        std::iter::once(target)
            .chain(self.doc.ancestors(target))
            .find(|id| self.indicators.contains_key(id))
    }

    fn within_tooltip(&self, target: u64) -> bool {
        self.tooltip
            .as_ref()
            .is_some_and(|t| self.doc.is_inclusive_ancestor(t.element(), target))
    }

    fn within_class(&self, target: u64, class: &str) -> bool {
        std::iter::once(target)
            .chain(self.doc.ancestors(target))
            .any(|id| self.doc.has_class(id, class))
    }

    fn content_of(&self, indicator: u64) -> String {
        self.indicators
            .get(&indicator)
            .map(|i| i.description.markup.clone())
            .unwrap_or_default()
    }

    /// Feed one input event.
    pub fn dispatch(&mut self, event: UiEvent) {
        if !self.listening {
            return;
        }
        let name = event.name();
        if let Err(e) = self.handle_event(event) {
            match e {
                Error::InvalidTransition { .. } => tracing::debug!("Ignored {}: {}", name, e),
                _ => tracing::warn!("Error handling {}: {}", name, e),
            }
        }
        self.pump_mutations();
    }

    fn handle_event(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::PointerEnter { target } => {
                if self.device.is_touch() {
                    return Ok(());
                }
                if let Some(indicator) = self.indicator_at(target) {
                    let content = self.content_of(indicator);
                    if let Some((tooltip, mut cx)) = self.split() {
                        tooltip.request_show(&mut cx, indicator, &content, false)?;
                    }
                } else if self.within_tooltip(target) {
                    if let Some((tooltip, mut cx)) = self.split() {
                        tooltip.pointer_entered_tooltip(&mut cx);
                    }
                }
            }
            UiEvent::PointerLeave { target } => {
                if self.device.is_touch() {
                    return Ok(());
                }
                let tooltip_element = self.tooltip.as_ref().map(SharedTooltip::element);
                if let Some(indicator) = self.indicator_at(target) {
                    if let Some((tooltip, mut cx)) = self.split() {
                        tooltip.pointer_left_indicator(&mut cx, indicator);
                    }
                } else if tooltip_element == Some(target) {
                    if let Some((tooltip, mut cx)) = self.split() {
                        tooltip.pointer_left_tooltip(&mut cx)?;
                    }
                }
            }
            UiEvent::Click { target } => {
                if let Some(indicator) = self.indicator_at(target) {
                    self.toggle(indicator)?;
                } else if !self.within_tooltip(target) && !self.within_class(target, classes::WRAPPER) {
                    self.force_hide("outside click")?;
                }
            }
            UiEvent::KeyDown { target, key } => {
                if key == Key::Escape {
                    self.force_hide("escape")?;
                } else if key.activates() {
                    if let Some(indicator) = self.indicator_at(target) {
                        self.toggle(indicator)?;
                    }
                }
            }
            UiEvent::PointerDown { target, position } => {
                if self.within_tooltip(target) && self.within_class(target, classes::DRAG_HANDLE) {
                    self.begin_drag(position)?;
                }
            }
            UiEvent::PointerMove { position } => {
                if matches!(self.visibility(), Visibility::Dragging { .. }) {
                    if let Some((tooltip, mut cx)) = self.split() {
                        tooltip.update_drag(&mut cx, position)?;
                    }
                }
            }
            UiEvent::PointerUp { .. } => {
                if matches!(self.visibility(), Visibility::Dragging { .. }) {
                    if let Some((tooltip, mut cx)) = self.split() {
                        tooltip.end_drag(&mut cx)?;
                    }
                }
            }
            UiEvent::Scroll { target } => {
                // Scrolling the tooltip's own content must not close it.
                if !self.within_tooltip(target) {
                    self.force_hide("scroll")?;
                }
            }
            UiEvent::Resize { viewport } => {
                self.viewport = viewport;
                self.force_hide("resize")?;
            }
            UiEvent::LayoutChanged => {
                if let Some(indicator) = self.visibility().indicator() {
                    if !self.doc.rect(indicator).is_within(self.viewport) {
                        self.force_hide("indicator left viewport")?;
                    }
                }
            }
        }
        Ok(())
    }

    fn toggle(&mut self, indicator: u64) -> Result<()> {
        let content = self.content_of(indicator);
        if let Some((tooltip, mut cx)) = self.split() {
            tooltip.toggle(&mut cx, indicator, &content)?;
        }
        Ok(())
    }

    fn begin_drag(&mut self, pointer: Point) -> Result<()> {
        if let Some((tooltip, mut cx)) = self.split() {
            tooltip.begin_drag(&mut cx, pointer)?;
        }
        Ok(())
    }

    fn force_hide(&mut self, trigger: &str) -> Result<()> {
        if self.visibility() == Visibility::Hidden {
            return Ok(());
        }
        tracing::debug!("Forced close: {}", trigger);
        if let Some((tooltip, mut cx)) = self.split() {
            tooltip.request_hide(&mut cx, true)?;
        }
        Ok(())
    }

    /// Move the virtual clock forward by `dt`, firing every timer that
    /// comes due on the way, earliest first.
    pub fn advance(&mut self, dt: Duration) {
        self.pump_mutations();
        let deadline = self.scheduler.now() + dt;
        while let Some((_, kind)) = self.scheduler.pop_due(deadline) {
            if let Err(e) = self.on_timer(kind) {
                tracing::warn!("Timer {:?} failed: {}", kind, e);
            }
            self.pump_mutations();
        }
        self.scheduler.settle(deadline);
    }

    fn on_timer(&mut self, kind: TimerKind) -> Result<()> {
        match kind {
            TimerKind::ShowTooltip => {
                if let Some((tooltip, mut cx)) = self.split() {
                    tooltip.on_show_timer(&mut cx)?;
                }
            }
            TimerKind::HoverLeaveGrace => {
                if let Some((tooltip, mut cx)) = self.split() {
                    tooltip.on_leave_timer(&mut cx)?;
                }
            }
            TimerKind::MutationDebounce => self.process_batch(),
            TimerKind::FlashFallback => {
                self.guard
                    .on_fallback(&mut self.doc, &self.selectors, &mut self.scheduler)?;
            }
            TimerKind::FlashWatch => self.guard.on_watch(&mut self.doc, &self.selectors),
        }
        Ok(())
    }

    fn process_batch(&mut self) {
        let batch = self.watcher.take_batch();
        let fresh: Vec<u64> = newly_added_descriptions(&self.doc, &self.selectors, &batch).collect();
        if fresh.is_empty() {
            return;
        }
        let report = self.attach_all(&fresh);
        tracing::debug!(
            "Mutation batch of {} record(s): {} attached, {} kept visible",
            batch.len(),
            report.attached.len(),
            report.kept_visible.len()
        );
        // The insertions just made are ours.
        self.doc.take_mutations();
    }

    /// Drain the mutation log: forget removed indicators and queue
    /// insertions for the watcher.
    fn pump_mutations(&mut self) {
        let records = self.doc.take_mutations();
        if records.is_empty() {
            return;
        }

        // Moved nodes also show up as removed; only nodes that left the
        // document count.
        let removed: Vec<u64> = self
            .indicators
            .values()
            .filter(|i| !self.doc.contains(i.control) || !self.doc.contains(i.description.source))
            .map(|i| i.control)
            .collect();
        for control in removed {
            self.indicators.remove(&control);
            let bound = self.visibility().indicator() == Some(control);
            if let Some((tooltip, mut cx)) = self.split() {
                tooltip.forget(control);
                if bound {
                    if let Err(e) = tooltip.request_hide(&mut cx, true) {
                        tracing::warn!("Failed to hide tooltip for removed indicator {}: {}", control, e);
                    }
                }
            }
            tracing::debug!("Indicator {} removed with its field", control);
        }

        if self.listening && self.watcher.is_connected() {
            let quiet = self.config.debounce();
            self.watcher
                .record(&self.doc, &mut self.scheduler, records, quiet);
        }
    }
}
