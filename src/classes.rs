//! Class names and attributes the engine writes into the host document.
//!
//! These are the hooks the stylesheet collaborator keys on.

pub const INDICATOR: &str = "fieldhint-indicator";
pub const WRAPPER: &str = "fieldhint-wrapper";
pub const HIDDEN: &str = "fieldhint-hidden";
pub const PROCESSED: &str = "fieldhint-processed";
pub const KEEP_VISIBLE: &str = "fieldhint-keep-visible";
pub const TOOLTIP: &str = "fieldhint-tooltip";
pub const VISIBLE: &str = "fieldhint-visible";
/// Tooltip modifier: positioned above its indicator.
pub const ABOVE: &str = "fieldhint-bottom";
pub const ACTIVE: &str = "fieldhint-active";
pub const DRAGGING: &str = "fieldhint-dragging";
pub const DRAG_HANDLE: &str = "fieldhint-drag-handle";

/// Lazily assigned indicator identifier.
pub const ID_ATTR: &str = "data-fieldhint-id";
/// Where a label's native `title` is moved to.
pub const TITLE_BACKUP_ATTR: &str = "data-original-title";
/// Custom property carrying the arrow offset.
pub const ARROW_PROPERTY: &str = "--arrow-left";
/// `id` of the flash guard's injected stylesheet.
pub const FLASH_STYLE_ID: &str = "fieldhint-flash-prevention";
