//! Tests for indicator attachment and the placement fallback rules.

mod common;

use common::*;
use field_hint::attach::{
    AttachOutcome, Attacher, FallbackPlacement, KeepVisibleReason, PlacementContext, PlacementPolicy, PlacementSlot,
};
use field_hint::classes;
use field_hint::config::{EngineConfig, HostSelectors};
use field_hint::dom::Document;
use field_hint::markup::parse_document;
use field_hint::{Error, Result};

#[test]
fn test_labelled_description_becomes_indicator_on_label() {
    let engine = active_edit_page();
    let doc = engine.doc();
    let desc = by_id(&engine, "title-desc");
    let label = find(&engine, "label[for=\"title\"]");

    let indicator = engine.indicator_for_description(desc).expect("Title should get an indicator");
    assert_eq!(indicator.description.text_len, 45);
    assert_eq!(indicator.slot, PlacementSlot::LabelText { after_icon: false });
    assert_eq!(doc.parent(indicator.wrapper), Some(label), "Wrapper goes on the label");
    assert_eq!(doc.children(label).last().copied(), Some(indicator.wrapper));
    assert_eq!(doc.style_value(indicator.wrapper, "margin-left"), Some("6px"));

    assert!(doc.has_class(desc, classes::HIDDEN));
    assert!(doc.has_class(desc, classes::PROCESSED));
    assert!(!engine.is_description_visible(desc));
}

#[test]
fn test_indicator_control_markup() {
    let engine = active_edit_page();
    let doc = engine.doc();
    let control = indicator_of(&engine, "title-desc");

    assert!(doc.has_class(control, classes::INDICATOR));
    assert_eq!(doc.attr(control, "role"), Some("button"));
    assert_eq!(doc.attr(control, "tabindex"), Some("0"));
    assert_eq!(doc.attr(control, "aria-label"), Some("View property description"));
    assert_eq!(doc.text_content(control), "i");
    assert!(doc.attr(control, classes::ID_ATTR).is_none(), "Identifier is assigned on first use");
}

#[test]
fn test_label_title_moves_to_backup_attribute() {
    let engine = active_edit_page();
    let label = find(&engine, "label[for=\"title\"]");
    assert_eq!(engine.doc().attr(label, "title"), None);
    assert_eq!(engine.doc().attr(label, classes::TITLE_BACKUP_ATTR), Some("Page title"));
}

#[test]
fn test_indicator_goes_after_existing_sibling_icon() {
    let engine = active_edit_page();
    let doc = engine.doc();
    let indicator = engine
        .indicator_for_description(by_id(&engine, "body-desc"))
        .expect("Body should get an indicator");
    let icon = find(&engine, ".mini-rollback-icon");

    assert_eq!(indicator.slot, PlacementSlot::LabelText { after_icon: true });
    assert_eq!(doc.preceding_siblings(indicator.wrapper).first().copied(), Some(icon));
    assert!(indicator.description.markup.contains("<strong>Supports</strong>"));
}

#[test]
fn test_description_without_label_stays_visible() {
    let mut engine = engine_for(EDIT_PAGE);
    let report = engine.activate().unwrap();
    let orphan = by_id(&engine, "orphan-desc");

    assert_eq!(report.kept_for(KeepVisibleReason::NoLabel), 1);
    assert!(engine.doc().has_class(orphan, classes::KEEP_VISIBLE));
    assert!(!engine.doc().has_class(orphan, classes::HIDDEN));
    assert!(engine.is_description_visible(orphan));
    assert!(engine.indicator_for_description(orphan).is_none());
}

#[test]
fn test_empty_description_stays_inline() {
    let mut engine = engine_for(EDIT_PAGE);
    let report = engine.activate().unwrap();
    let empty = by_id(&engine, "empty-desc");

    assert_eq!(report.kept_for(KeepVisibleReason::TooShort), 1);
    assert!(engine.doc().has_class(empty, classes::KEEP_VISIBLE));
    assert_eq!(report.attached.len(), 2);
}

#[test]
fn test_minimum_length_threshold() {
    let config = EngineConfig {
        min_length: 40,
        ..EngineConfig::default()
    };
    let mut engine = engine_with(EDIT_PAGE, config);
    let report = engine.activate().unwrap();

    let body = by_id(&engine, "body-desc");
    assert!(engine.indicator_for_description(body).is_none(), "38 characters is below 40");
    assert!(engine.is_description_visible(body));
    assert!(engine.indicator_for_description(by_id(&engine, "title-desc")).is_some());
    assert_eq!(report.kept_for(KeepVisibleReason::TooShort), 2);
}

#[test]
fn test_attachment_is_idempotent() {
    let mut engine = engine_for(EDIT_PAGE);
    let first = engine.activate().unwrap();
    let second = engine.activate().unwrap();

    assert_eq!(first.attached.len(), 2);
    assert!(second.attached.is_empty());
    assert_eq!(second.skipped, 4);
    assert_eq!(find_all(&engine, ".fieldhint-wrapper").len(), 2);
    assert_eq!(find_all(&engine, ".fieldhint-tooltip").len(), 1, "Only one shared tooltip");
}

#[test]
fn test_attacher_skips_settled_description() {
    let mut doc = parse_document(EDIT_PAGE).unwrap();
    let config = EngineConfig::default();
    let selectors = config.selectors.compile().unwrap();
    let attacher = Attacher {
        selectors: &selectors,
        config: &config,
        policy: &FallbackPlacement,
    };
    let desc = doc.element_by_id("title-desc").unwrap();

    assert!(matches!(attacher.attach(&mut doc, desc), AttachOutcome::Attached(_)));
    assert_eq!(attacher.attach(&mut doc, desc), AttachOutcome::Skipped);
}

#[test]
fn test_existing_wrapper_keeps_description_visible() {
    let markup = r#"<div class="umb-editor">
      <div class="umb-property">
        <label for="x">X<span class="fieldhint-wrapper"><span class="fieldhint-indicator">i</span></span></label>
        <div class="control-description" id="x-desc">Rendered twice by the host.</div>
      </div>
    </div>"#;
    let mut engine = engine_for(markup);
    let report = engine.activate().unwrap();
    let desc = by_id(&engine, "x-desc");

    assert_eq!(report.kept_for(KeepVisibleReason::AlreadyWrapped), 1);
    assert!(engine.is_description_visible(desc));
    assert_eq!(find_all(&engine, ".fieldhint-wrapper").len(), 1);
}

struct BrokenPlacement;

impl PlacementPolicy for BrokenPlacement {
    fn place(
        &self,
        _doc: &mut Document,
        _selectors: &HostSelectors,
        _config: &EngineConfig,
        _cx: &PlacementContext,
        _wrapper: u64,
    ) -> Result<PlacementSlot> {
        Err(Error::Other("no room for an indicator".into()))
    }
}

#[test]
fn test_placement_failure_fails_safe() {
    let mut engine = engine_for(EDIT_PAGE).with_placement(Box::new(BrokenPlacement));
    let report = engine.activate().unwrap();
    let title = by_id(&engine, "title-desc");

    assert!(report.attached.is_empty());
    assert_eq!(report.kept_for(KeepVisibleReason::Failed), 2);
    assert!(engine.is_description_visible(title));
    assert!(engine.doc().has_class(title, classes::KEEP_VISIBLE));
    assert!(find_all(&engine, ".fieldhint-wrapper").is_empty(), "No orphan wrapper is left behind");
}

/// Run the fallback policy for the only description in `markup`.
fn place_only_description(markup: &str) -> (Document, u64, u64, PlacementSlot) {
    let mut doc = parse_document(markup).unwrap();
    let config = EngineConfig::default();
    let selectors = config.selectors.compile().unwrap();
    let description = doc.find_first(doc.root(), &selectors.description).unwrap();
    let property = doc
        .closest(description, &selectors.field_container)
        .or_else(|| doc.parent(description))
        .unwrap();
    let cx = PlacementContext {
        description,
        label: property,
        property,
    };
    let wrapper = doc.create_element("span");
    let slot = FallbackPlacement
        .place(&mut doc, &selectors, &config, &cx, wrapper)
        .unwrap();
    (doc, description, wrapper, slot)
}

#[test]
fn test_fallback_editor_label_area() {
    let (doc, _, wrapper, slot) = place_only_description(
        r#"<div class="umb-property">
          <div class="umb-property-editor"><div class="umb-property-editor__label">Heading</div></div>
          <p class="control-description">d</p>
        </div>"#,
    );
    assert_eq!(slot, PlacementSlot::EditorLabelArea { after_icon: false });
    let area = doc.parent(wrapper).unwrap();
    assert!(doc.has_class(area, "umb-property-editor__label"));
}

#[test]
fn test_fallback_block_title() {
    let (doc, _, wrapper, slot) = place_only_description(
        r#"<div data-element="block-item">
          <div class="umb-block-list__content-title">Block</div>
          <div class="umb-el-wrap"><p class="control-description">d</p></div>
        </div>"#,
    );
    assert_eq!(slot, PlacementSlot::BlockTitle { after_icon: false });
    assert!(doc.has_class(doc.parent(wrapper).unwrap(), "umb-block-list__content-title"));
}

#[test]
fn test_fallback_container_corner() {
    let (doc, _, wrapper, slot) = place_only_description(
        r#"<div class="umb-property" id="prop"><p class="control-description">d</p></div>"#,
    );
    assert_eq!(slot, PlacementSlot::ContainerCorner);
    let prop = doc.element_by_id("prop").unwrap();
    assert_eq!(doc.style_value(prop, "position"), Some("relative"));

    let corner = doc.parent(wrapper).unwrap();
    assert_eq!(doc.parent(corner), Some(prop));
    assert_eq!(doc.style_value(corner, "position"), Some("absolute"));
    assert_eq!(doc.style_value(corner, "top"), Some("8px"));
    assert_eq!(doc.style_value(corner, "right"), Some("8px"));
    assert_eq!(doc.style_value(corner, "z-index"), Some("100"));
}

#[test]
fn test_fallback_corner_keeps_existing_positioning() {
    let (doc, _, _, slot) = place_only_description(
        r#"<div class="umb-property" id="prop" style="position: absolute"><p class="control-description">d</p></div>"#,
    );
    assert_eq!(slot, PlacementSlot::ContainerCorner);
    let prop = doc.element_by_id("prop").unwrap();
    assert_eq!(doc.style_value(prop, "position"), Some("absolute"));
}

#[test]
fn test_fallback_after_description() {
    let (doc, description, wrapper, slot) =
        place_only_description(r#"<div class="plain"><p class="control-description">d</p><p>next</p></div>"#);
    assert_eq!(slot, PlacementSlot::AfterDescription);
    assert_eq!(doc.preceding_siblings(wrapper).first().copied(), Some(description));
}
