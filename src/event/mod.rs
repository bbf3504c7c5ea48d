//! Input events fed to the engine by the host.

use crate::geometry::{Point, Size};

/// Keys the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Other,
}

impl Key {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "ENTER" | "RETURN" => Self::Enter,
            "SPACE" | " " => Self::Space,
            "ESCAPE" | "ESC" => Self::Escape,
            _ => Self::Other,
        }
    }

    /// Map a legacy DOM `keyCode`.
    pub fn from_code(code: u32) -> Self {
        match code {
            13 => Self::Enter,
            32 => Self::Space,
            27 => Self::Escape,
            _ => Self::Other,
        }
    }

    /// Keys that activate a focused indicator.
    pub fn activates(&self) -> bool {
        matches!(self, Self::Enter | Self::Space)
    }
}

/// Whether the host device has hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    #[default]
    Pointer,
    Touch,
}

impl DeviceKind {
    pub fn is_touch(&self) -> bool {
        matches!(self, Self::Touch)
    }
}

/// One input event. `target` is the innermost node the event hit.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    PointerEnter { target: u64 },
    PointerLeave { target: u64 },
    Click { target: u64 },
    KeyDown { target: u64, key: Key },
    PointerDown { target: u64, position: Point },
    PointerMove { position: Point },
    PointerUp { position: Point },
    /// Scroll of any scrollable container (captured at the document).
    Scroll { target: u64 },
    Resize { viewport: Size },
    /// Element rects changed without a scroll or resize.
    LayoutChanged,
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PointerEnter { .. } => "pointerenter",
            Self::PointerLeave { .. } => "pointerleave",
            Self::Click { .. } => "click",
            Self::KeyDown { .. } => "keydown",
            Self::PointerDown { .. } => "pointerdown",
            Self::PointerMove { .. } => "pointermove",
            Self::PointerUp { .. } => "pointerup",
            Self::Scroll { .. } => "scroll",
            Self::Resize { .. } => "resize",
            Self::LayoutChanged => "layoutchanged",
        }
    }
}
