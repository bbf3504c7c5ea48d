//! Shared test helpers.

use field_hint::config::EngineConfig;
use field_hint::dom::Selector;
use field_hint::engine::Engine;
use field_hint::event::UiEvent;
use field_hint::geometry::{Rect, Size};
use field_hint::markup::parse_document;
use field_hint::tooltip::FixedSize;
use std::time::Duration;

pub const VIEWPORT: Size = Size {
    width: 1280.0,
    height: 800.0,
};

/// Every rendered tooltip measures this in tests.
pub const TOOLTIP_SIZE: Size = Size {
    width: 200.0,
    height: 80.0,
};

/// A content editor page: two labelled fields, an empty description and a
/// description with no label anywhere.
pub const EDIT_PAGE: &str = r#"<html>
<head><title>Edit</title></head>
<body>
  <div class="umb-editor" id="editor">
    <div class="umb-property" id="title-field">
      <label for="title" title="Page title">Title</label>
      <div class="umb-property-editor"><input id="title" /></div>
      <div class="control-description" id="title-desc">Enter the title shown in the navigation menu.</div>
    </div>
    <div class="umb-property" id="body-field">
      <label for="body">Body<span class="mini-rollback-icon">r</span></label>
      <div class="control-description" id="body-desc">Main page content. <strong>Supports</strong> rich text.</div>
    </div>
    <div class="umb-property" id="empty-field">
      <label for="empty">Empty</label>
      <div class="control-description" id="empty-desc"></div>
    </div>
  </div>
  <div class="orphan-area" id="orphan-area">
    <div class="control-description" id="orphan-desc">A description with no label anywhere.</div>
  </div>
</body>
</html>"#;

/// A field as a block editor would insert it later.
#[allow(dead_code)]
pub fn field_markup(name: &str) -> String {
    format!(
        r#"<div class="umb-property" id="{name}-field"><label for="{name}">{name}</label><div class="control-description" id="{name}-desc">Help text for the {name} field.</div></div>"#
    )
}

/// Engine over `markup` with the test viewport and a fixed tooltip size.
#[allow(dead_code)]
pub fn engine_for(markup: &str) -> Engine {
    engine_with(markup, EngineConfig::default())
}

#[allow(dead_code)]
pub fn engine_with(markup: &str, config: EngineConfig) -> Engine {
    let doc = parse_document(markup).expect("Fixture markup should parse");
    Engine::new(doc, config)
        .expect("Config should compile")
        .with_viewport(VIEWPORT)
        .with_measure(Box::new(FixedSize(TOOLTIP_SIZE)))
}

/// Engine over [`EDIT_PAGE`] after its first discovery pass.
#[allow(dead_code)]
pub fn active_edit_page() -> Engine {
    let mut engine = engine_for(EDIT_PAGE);
    engine.activate().expect("Activation should succeed");
    engine
}

/// Node with the given `id` attribute.
#[allow(dead_code)]
pub fn by_id(engine: &Engine, html_id: &str) -> u64 {
    engine
        .doc()
        .element_by_id(html_id)
        .unwrap_or_else(|| panic!("No element with id {html_id:?}"))
}

/// First node matching `selector`.
#[allow(dead_code)]
pub fn find(engine: &Engine, selector: &str) -> u64 {
    find_all(engine, selector)
        .first()
        .copied()
        .unwrap_or_else(|| panic!("No node matches {selector:?}"))
}

#[allow(dead_code)]
pub fn find_all(engine: &Engine, selector: &str) -> Vec<u64> {
    let selector = Selector::parse(selector).expect("Test selector should parse");
    engine.doc().find_all(engine.doc().root(), &selector)
}

/// Indicator control attached for the description with `html_id`.
#[allow(dead_code)]
pub fn indicator_of(engine: &Engine, html_id: &str) -> u64 {
    let description = by_id(engine, html_id);
    engine
        .indicator_for_description(description)
        .unwrap_or_else(|| panic!("No indicator for {html_id:?}"))
        .control
}

/// Lay out `id` at the given box.
#[allow(dead_code)]
pub fn place(engine: &mut Engine, id: u64, rect: Rect) {
    engine.doc_mut().set_rect(id, rect);
}

#[allow(dead_code)]
pub fn click(engine: &mut Engine, target: u64) {
    engine.dispatch(UiEvent::Click { target });
}

#[allow(dead_code)]
pub fn advance_ms(engine: &mut Engine, ms: u64) {
    engine.advance(Duration::from_millis(ms));
}
