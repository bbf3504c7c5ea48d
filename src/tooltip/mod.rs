//! The shared tooltip and its visibility state machine.
//!
//! There is exactly one tooltip element per page. Every trigger (hover,
//! click, keyboard, drag, forced close, timers) goes through
//! [`SharedTooltip`], which owns the state, the pending show timer, the
//! hover grace timer and the remembered drag positions.

mod measure;
mod state;

pub use measure::{FixedSize, TextEstimate, TooltipMeasure};
pub use state::Visibility;

use crate::classes;
use crate::config::EngineConfig;
use crate::dom::Document;
use crate::event::DeviceKind;
use crate::geometry::{anchored_position, arrow_toward, drag_position, refit_position, Point, Position, Rect, Size};
use crate::markup::parse_fragment_into;
use crate::timer::{Scheduler, TimerKind};
use crate::{Error, Result};
use std::collections::HashMap;
use std::time::Duration;

const DRAG_HANDLE_MARKUP: &str =
    r#"<div class="fieldhint-drag-handle" title="Drag to move tooltip"><i class="icon icon-navigation"></i></div>"#;

/// Everything a transition may touch besides the tooltip itself.
pub struct TooltipCtx<'a> {
    pub doc: &'a mut Document,
    pub scheduler: &'a mut Scheduler,
    pub config: &'a EngineConfig,
    pub viewport: Size,
    pub device: DeviceKind,
    pub measure: &'a dyn TooltipMeasure,
}

/// The page-wide tooltip.
#[derive(Debug)]
pub struct SharedTooltip {
    element: u64,
    state: Visibility,
    /// Payload waiting for the show timer.
    pending: Option<String>,
    /// Payload currently rendered.
    content: String,
    position: Position,
    size: Size,
    flipped_above: bool,
    arrow_left: f32,
    /// Remembered drag positions by indicator node.
    custom_positions: HashMap<u64, Position>,
    show_timer: Option<u64>,
    leave_timer: Option<u64>,
    pointer_over: bool,
    next_ident: u64,
}

impl SharedTooltip {
    /// Create the tooltip element under `<body>` (or the root), reusing an
    /// existing one so repeated initialization stays single-instance.
    pub fn install(doc: &mut Document) -> Result<Self> {
        let existing = doc
            .iter_ids()
            .filter(|&id| doc.has_class(id, classes::TOOLTIP))
            .min();
        let element = match existing {
            Some(id) => id,
            None => {
                let host = doc.first_by_tag("body").unwrap_or_else(|| doc.root());
                let id = doc.create_element("div");
                doc.add_class(id, classes::TOOLTIP);
                doc.set_attr(id, "role", "tooltip");
                doc.set_style(id, "pointer-events", "none");
                doc.append_child(host, id)?;
                id
            }
        };
        Ok(Self {
            element,
            state: Visibility::Hidden,
            pending: None,
            content: String::new(),
            position: Position::default(),
            size: Size::default(),
            flipped_above: false,
            arrow_left: 0.0,
            custom_positions: HashMap::new(),
            show_timer: None,
            leave_timer: None,
            pointer_over: false,
            next_ident: 0,
        })
    }

    pub fn element(&self) -> u64 {
        self.element
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn flipped_above(&self) -> bool {
        self.flipped_above
    }

    pub fn arrow_left(&self) -> f32 {
        self.arrow_left
    }

    /// The indicator bound to a visible tooltip.
    pub fn active_indicator(&self) -> Option<u64> {
        if self.state.is_shown() {
            self.state.indicator()
        } else {
            None
        }
    }

    pub fn custom_position(&self, indicator: u64) -> Option<Position> {
        self.custom_positions.get(&indicator).copied()
    }

    /// Drop the remembered position of a removed indicator.
    pub fn forget(&mut self, indicator: u64) {
        self.custom_positions.remove(&indicator);
    }

    fn set_state(&mut self, next: Visibility) {
        if self.state.name() != next.name() || self.state.indicator() != next.indicator() {
            tracing::debug!(
                "tooltip: {} -> {} (indicator {:?})",
                self.state.name(),
                next.name(),
                next.indicator()
            );
        }
        self.state = next;
    }

    /// Ask for the tooltip to show `content` for `indicator`.
    ///
    /// `explicit` requests (click, keyboard) pin the tooltip. Hover requests
    /// never displace a pinned tooltip.
    pub fn request_show(&mut self, cx: &mut TooltipCtx<'_>, indicator: u64, content: &str, explicit: bool) -> Result<()> {
        if !explicit {
            if self.state.is_pinned() {
                tracing::debug!("tooltip: hover on {} ignored while {}", indicator, self.state.name());
                return Ok(());
            }
            let same_hover = self.state == (Visibility::ShownHover { indicator })
                || self.state == (Visibility::PendingShow { indicator, pinned: false });
            if same_hover {
                cx.scheduler.cancel_slot(&mut self.leave_timer);
                return Ok(());
            }
        }

        cx.scheduler.cancel_slot(&mut self.show_timer);
        cx.scheduler.cancel_slot(&mut self.leave_timer);
        self.pending = Some(content.to_string());
        self.set_state(Visibility::PendingShow { indicator, pinned: explicit });

        let delay = if cx.device.is_touch() {
            Duration::ZERO
        } else {
            cx.config.tooltip_delay()
        };
        if delay.is_zero() {
            self.render(cx)
        } else {
            self.show_timer = Some(cx.scheduler.schedule(TimerKind::ShowTooltip, delay));
            Ok(())
        }
    }

    /// Hide the tooltip. A pinned tooltip only hides when `force` is set.
    ///
    /// Returns whether the tooltip is now hidden.
    pub fn request_hide(&mut self, cx: &mut TooltipCtx<'_>, force: bool) -> Result<bool> {
        if self.state.is_pinned() && !force {
            return Ok(false);
        }
        cx.scheduler.cancel_slot(&mut self.show_timer);
        cx.scheduler.cancel_slot(&mut self.leave_timer);
        self.pending = None;
        self.content.clear();
        self.pointer_over = false;

        let el = self.element;
        cx.doc.remove_class(el, classes::VISIBLE);
        cx.doc.remove_class(el, classes::DRAGGING);
        cx.doc.set_style(el, "pointer-events", "none");
        cx.doc.clear_children(el)?;
        clear_active_flags(cx.doc);

        self.set_state(Visibility::Hidden);
        Ok(true)
    }

    /// Click/keyboard activation: close if pinned to `indicator`, else pin it open.
    pub fn toggle(&mut self, cx: &mut TooltipCtx<'_>, indicator: u64, content: &str) -> Result<()> {
        if self.state.is_pinned() && self.state.indicator() == Some(indicator) {
            self.request_hide(cx, true).map(|_| ())
        } else {
            self.request_show(cx, indicator, content, true)
        }
    }

    /// Show timer fired.
    pub fn on_show_timer(&mut self, cx: &mut TooltipCtx<'_>) -> Result<()> {
        self.show_timer = None;
        self.render(cx)
    }

    fn render(&mut self, cx: &mut TooltipCtx<'_>) -> Result<()> {
        let Visibility::PendingShow { indicator, pinned } = self.state else {
            return Ok(());
        };
        let content = self.pending.take().unwrap_or_default();
        if !cx.doc.contains(indicator) {
            self.request_hide(cx, true)?;
            return Ok(());
        }

        let el = self.element;
        cx.doc.remove_class(el, classes::VISIBLE);
        cx.doc.set_style(el, "pointer-events", "none");
        cx.doc.clear_children(el)?;
        parse_fragment_into(cx.doc, el, DRAG_HANDLE_MARKUP)?;
        let body = cx.doc.create_element("div");
        cx.doc.append_child(el, body)?;
        if parse_fragment_into(cx.doc, body, &content).is_err() {
            // Keep the text readable even when the markup is not well-formed.
            cx.doc.clear_children(body)?;
            let text = cx.doc.create_text(&content);
            cx.doc.append_child(body, text)?;
        }

        let text = cx.doc.text_content(body);
        let max_width = cx.config.tooltip_max_width;
        self.size = cx.measure.measure(&text, max_width);
        self.ensure_identifier(cx.doc, indicator);
        let margins = &cx.config.margins;

        let remembered = if pinned {
            self.custom_positions.get(&indicator).copied()
        } else {
            None
        };
        match remembered {
            Some(saved) => {
                self.position = refit_position(saved, cx.viewport, self.size, margins);
                self.flipped_above = false;
                self.arrow_left = arrow_toward(cx.doc.rect(indicator), self.position.left, self.size, margins);
            }
            None => {
                let placement = anchored_position(cx.doc.rect(indicator), self.size, cx.viewport, margins);
                self.position = placement.position;
                self.flipped_above = placement.flipped_above;
                self.arrow_left = placement.arrow_left;
            }
        }

        self.apply_position(cx.doc);
        cx.doc.set_style(el, "max-width", &px(max_width));
        cx.doc.set_style(el, classes::ARROW_PROPERTY, &px(self.arrow_left));
        if self.flipped_above {
            cx.doc.add_class(el, classes::ABOVE);
        } else {
            cx.doc.remove_class(el, classes::ABOVE);
        }
        cx.doc.add_class(el, classes::VISIBLE);

        clear_active_flags(cx.doc);
        if pinned {
            cx.doc.add_class(indicator, classes::ACTIVE);
        }
        cx.doc.set_style(el, "pointer-events", "auto");

        self.content = content;
        self.set_state(if pinned {
            Visibility::ShownPinned { indicator }
        } else {
            Visibility::ShownHover { indicator }
        });
        Ok(())
    }

    fn apply_position(&self, doc: &mut Document) {
        doc.set_style(self.element, "top", &px(self.position.top));
        doc.set_style(self.element, "left", &px(self.position.left));
        doc.set_rect(self.element, Rect::from_position(self.position, self.size));
    }

    /// The indicator's identifier, assigned on first use.
    pub fn ensure_identifier(&mut self, doc: &mut Document, indicator: u64) -> String {
        if let Some(existing) = doc.attr(indicator, classes::ID_ATTR) {
            return existing.to_string();
        }
        self.next_ident += 1;
        let identifier = format!("fieldhint-{}", self.next_ident);
        doc.set_attr(indicator, classes::ID_ATTR, &identifier);
        identifier
    }

    /// Start moving a pinned tooltip.
    pub fn begin_drag(&mut self, cx: &mut TooltipCtx<'_>, pointer: Point) -> Result<()> {
        let Visibility::ShownPinned { indicator } = self.state else {
            return Err(Error::InvalidTransition {
                state: self.state.name(),
                action: "begin drag",
            });
        };
        let start = Rect::from_position(self.position, self.size);
        cx.doc.add_class(self.element, classes::DRAGGING);
        self.set_state(Visibility::Dragging {
            indicator,
            pointer_start: pointer,
            start,
        });
        Ok(())
    }

    /// Follow the pointer and remember the result for the bound indicator.
    pub fn update_drag(&mut self, cx: &mut TooltipCtx<'_>, pointer: Point) -> Result<Position> {
        let Visibility::Dragging {
            indicator,
            pointer_start,
            start,
        } = self.state
        else {
            return Err(Error::InvalidTransition {
                state: self.state.name(),
                action: "drag",
            });
        };
        self.position = drag_position(
            pointer.delta_from(pointer_start),
            start,
            cx.viewport,
            self.size,
            &cx.config.margins,
        );
        self.apply_position(cx.doc);
        self.custom_positions.insert(indicator, self.position);
        Ok(self.position)
    }

    pub fn end_drag(&mut self, cx: &mut TooltipCtx<'_>) -> Result<()> {
        let Visibility::Dragging { indicator, .. } = self.state else {
            return Err(Error::InvalidTransition {
                state: self.state.name(),
                action: "end drag",
            });
        };
        cx.doc.remove_class(self.element, classes::DRAGGING);
        self.set_state(Visibility::ShownPinned { indicator });
        Ok(())
    }

    /// Pointer left an indicator: hide a hover tooltip after the grace period
    /// unless the pointer reaches the tooltip first.
    pub fn pointer_left_indicator(&mut self, cx: &mut TooltipCtx<'_>, indicator: u64) {
        if !self.state.is_hover_bound_to(indicator) {
            return;
        }
        cx.scheduler.cancel_slot(&mut self.leave_timer);
        self.leave_timer = Some(cx.scheduler.schedule(TimerKind::HoverLeaveGrace, cx.config.hover_grace()));
    }

    /// Hover grace timer fired.
    pub fn on_leave_timer(&mut self, cx: &mut TooltipCtx<'_>) -> Result<()> {
        self.leave_timer = None;
        if !self.pointer_over {
            self.request_hide(cx, false)?;
        }
        Ok(())
    }

    pub fn pointer_entered_tooltip(&mut self, cx: &mut TooltipCtx<'_>) {
        // Hidden tooltips take no pointer events.
        if !self.state.is_shown() {
            return;
        }
        self.pointer_over = true;
        cx.scheduler.cancel_slot(&mut self.leave_timer);
    }

    pub fn pointer_left_tooltip(&mut self, cx: &mut TooltipCtx<'_>) -> Result<()> {
        self.pointer_over = false;
        self.request_hide(cx, false).map(|_| ())
    }

    /// Cancel outstanding timers and hide; used on teardown.
    pub fn shutdown(&mut self, cx: &mut TooltipCtx<'_>) -> Result<()> {
        self.request_hide(cx, true).map(|_| ())
    }
}

fn clear_active_flags(doc: &mut Document) {
    let active: Vec<u64> = doc
        .iter_ids()
        .filter(|&id| doc.has_class(id, classes::ACTIVE))
        .collect();
    for id in active {
        doc.remove_class(id, classes::ACTIVE);
    }
}

fn px(value: f32) -> String {
    format!("{value}px")
}
