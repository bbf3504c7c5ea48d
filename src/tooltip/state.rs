//! Visibility states of the shared tooltip.

use crate::geometry::{Point, Rect};

/// Lifecycle of the one tooltip on the page. Every state but `Hidden` is
/// bound to exactly one indicator (by node ID).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    /// Show timer armed; `pinned` records an explicit (click/keyboard) request.
    PendingShow { indicator: u64, pinned: bool },
    ShownHover { indicator: u64 },
    ShownPinned { indicator: u64 },
    Dragging {
        indicator: u64,
        pointer_start: Point,
        start: Rect,
    },
}

impl Visibility {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::PendingShow { pinned: false, .. } => "pending hover show",
            Self::PendingShow { pinned: true, .. } => "pending pinned show",
            Self::ShownHover { .. } => "shown on hover",
            Self::ShownPinned { .. } => "pinned",
            Self::Dragging { .. } => "dragging",
        }
    }

    /// The indicator this state is bound to.
    pub fn indicator(&self) -> Option<u64> {
        match *self {
            Self::Hidden => None,
            Self::PendingShow { indicator, .. }
            | Self::ShownHover { indicator }
            | Self::ShownPinned { indicator }
            | Self::Dragging { indicator, .. } => Some(indicator),
        }
    }

    /// Pinned states only close on an explicit or forced hide.
    pub fn is_pinned(&self) -> bool {
        matches!(
            self,
            Self::PendingShow { pinned: true, .. } | Self::ShownPinned { .. } | Self::Dragging { .. }
        )
    }

    pub fn is_shown(&self) -> bool {
        matches!(
            self,
            Self::ShownHover { .. } | Self::ShownPinned { .. } | Self::Dragging { .. }
        )
    }

    /// Whether a hover-leave should start the grace timer.
    pub fn is_hover_bound_to(&self, target: u64) -> bool {
        match *self {
            Self::ShownHover { indicator } => indicator == target,
            Self::PendingShow { indicator, pinned: false } => indicator == target,
            _ => false,
        }
    }
}
