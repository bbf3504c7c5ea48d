//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the stock behavior. Loaded once when the engine is built.

use crate::dom::Selector;
use crate::geometry::Margins;
use crate::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("field-hint")
        .join("config.json")
}

/// Tunables for the tooltip engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum trimmed description length that gets an indicator. Empty
    /// descriptions never qualify.
    pub min_length: usize,
    /// Delay before a tooltip renders on pointer devices.
    pub tooltip_delay_ms: u64,
    pub tooltip_max_width: f32,
    pub indicator_char: String,
    pub indicator_label: String,
    /// Grace period after leaving an indicator before a hover tooltip hides.
    pub hover_grace_ms: u64,
    /// Quiet period that closes a mutation batch.
    pub debounce_ms: u64,
    pub flash_fallback_ms: u64,
    pub flash_watch_interval_ms: u64,
    /// Left margin given to wrappers placed next to label text.
    pub wrapper_margin_left: String,
    pub margins: Margins,
    pub selectors: SelectorConfig,
    pub activation: ActivationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_length: 0,
            tooltip_delay_ms: 200,
            tooltip_max_width: 320.0,
            indicator_char: "i".into(),
            indicator_label: "View property description".into(),
            hover_grace_ms: 100,
            debounce_ms: 150,
            flash_fallback_ms: 3000,
            flash_watch_interval_ms: 50,
            wrapper_margin_left: "6px".into(),
            margins: Margins::default(),
            selectors: SelectorConfig::default(),
            activation: ActivationConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load from `path` (or the default path), falling back to defaults on any error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Using default config ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn tooltip_delay(&self) -> Duration {
        Duration::from_millis(self.tooltip_delay_ms)
    }

    pub fn hover_grace(&self) -> Duration {
        Duration::from_millis(self.hover_grace_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn flash_fallback(&self) -> Duration {
        Duration::from_millis(self.flash_fallback_ms)
    }

    pub fn flash_watch_interval(&self) -> Duration {
        Duration::from_millis(self.flash_watch_interval_ms)
    }
}

/// Host selectors, as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub field_container: String,
    pub description: String,
    pub label: String,
    pub placement_label: String,
    pub sibling_icon: String,
    pub property_editor: String,
    pub editor_label_area: String,
    pub block_scope: String,
    pub block_title: String,
    pub corner_container: String,
    pub flash_scope: String,
    pub dynamic_regions: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            field_container: r#".umb-property, [data-element="property"], .control-group, .umb-el-wrap"#.into(),
            description: ".control-description".into(),
            label: "label".into(),
            placement_label: "label[for], .umb-property-editor label, label".into(),
            sibling_icon: ".mini-rollback-icon".into(),
            property_editor: ".umb-property-editor".into(),
            editor_label_area: ".umb-property-editor__label, .control-label".into(),
            block_scope: "[data-element]".into(),
            block_title: ".umb-block-list__content-title, .umb-block-grid__content-title".into(),
            corner_container: ".umb-property, .umb-property-editor".into(),
            flash_scope: r#".umb-property, [data-element="property"]"#.into(),
            dynamic_regions: ".umb-editor, .umb-block-list, .umb-block-grid, [data-element]".into(),
        }
    }
}

impl SelectorConfig {
    pub fn compile(&self) -> Result<HostSelectors> {
        Ok(HostSelectors {
            field_container: Selector::parse(&self.field_container)?,
            description: Selector::parse(&self.description)?,
            label: Selector::parse(&self.label)?,
            placement_label: Selector::parse(&self.placement_label)?,
            sibling_icon: Selector::parse(&self.sibling_icon)?,
            property_editor: Selector::parse(&self.property_editor)?,
            editor_label_area: Selector::parse(&self.editor_label_area)?,
            block_scope: Selector::parse(&self.block_scope)?,
            block_title: Selector::parse(&self.block_title)?,
            corner_container: Selector::parse(&self.corner_container)?,
            flash_scope: Selector::parse(&self.flash_scope)?,
            dynamic_regions: Selector::parse(&self.dynamic_regions)?,
        })
    }
}

/// Compiled host selectors.
#[derive(Debug, Clone)]
pub struct HostSelectors {
    pub field_container: Selector,
    pub description: Selector,
    pub label: Selector,
    pub placement_label: Selector,
    pub sibling_icon: Selector,
    pub property_editor: Selector,
    pub editor_label_area: Selector,
    pub block_scope: Selector,
    pub block_title: Selector,
    pub corner_container: Selector,
    pub flash_scope: Selector,
    pub dynamic_regions: Selector,
}

/// Which navigation routes activate the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// A route must match at least one of these.
    pub include: Vec<String>,
    /// A route matching any of these is rejected.
    pub exclude: Vec<String>,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            include: vec![r"#/content/content/edit/".into()],
            exclude: vec![r"#/settings/".into(), r"#/member/".into(), r"#/media/".into()],
        }
    }
}

impl ActivationConfig {
    pub fn compile(&self) -> Result<RouteFilter> {
        let compile_all = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| Regex::new(p))
                .collect::<std::result::Result<Vec<_>, _>>()
        };
        Ok(RouteFilter {
            include: compile_all(&self.include)?,
            exclude: compile_all(&self.exclude)?,
        })
    }
}

/// Compiled activation predicate.
#[derive(Debug, Clone)]
pub struct RouteFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl RouteFilter {
    pub fn is_active(&self, route: &str) -> bool {
        self.include.iter().any(|r| r.is_match(route)) && !self.exclude.iter().any(|r| r.is_match(route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config.tooltip_delay_ms, 200);
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.margins.viewport, 20.0);
        assert!(config.selectors.compile().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config =
            EngineConfig::from_json_str(r#"{"min_length": 40, "margins": {"drag": 4}}"#).unwrap();
        assert_eq!(config.min_length, 40);
        assert_eq!(config.margins.drag, 4.0);
        assert_eq!(config.margins.viewport, 20.0);
    }

    #[test]
    fn test_bad_selector_is_reported() {
        let mut config = EngineConfig::default();
        config.selectors.description = "..".into();
        assert!(matches!(config.selectors.compile(), Err(crate::Error::Selector { .. })));
    }

    #[test]
    fn test_route_filter() {
        let routes = ActivationConfig::default().compile().unwrap();
        assert!(routes.is_active("https://cms.example/umbraco#/content/content/edit/1234"));
        assert!(!routes.is_active("https://cms.example/umbraco#/media/media/edit/1234"));
        assert!(!routes.is_active("https://cms.example/umbraco#/settings/documentTypes"));
    }
}
