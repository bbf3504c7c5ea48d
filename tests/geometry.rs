//! Tests for tooltip placement and drag clamping.

use field_hint::geometry::{
    anchored_position, drag_position, refit_position, Margins, Point, Position, Rect, Size,
};

fn viewport() -> Size {
    Size::new(1280.0, 800.0)
}

fn tooltip() -> Size {
    Size::new(200.0, 80.0)
}

#[test]
fn test_default_placement_is_below_and_centered() {
    let anchor = Rect::new(600.0, 100.0, 16.0, 16.0);
    let placement = anchored_position(anchor, tooltip(), viewport(), &Margins::default());

    assert!(!placement.flipped_above);
    assert_eq!(placement.position, Position::new(126.0, 508.0));
    assert_eq!(placement.arrow_left, 100.0, "Arrow should point at the anchor center");
}

#[test]
fn test_left_edge_clamp_and_arrow_minimum() {
    let anchor = Rect::new(0.0, 100.0, 16.0, 16.0);
    let placement = anchored_position(anchor, tooltip(), viewport(), &Margins::default());

    assert_eq!(placement.position.left, 20.0);
    assert_eq!(placement.arrow_left, 15.0);
}

#[test]
fn test_right_edge_clamp_and_arrow_maximum() {
    let anchor = Rect::new(1270.0, 100.0, 10.0, 16.0);
    let placement = anchored_position(anchor, tooltip(), viewport(), &Margins::default());

    assert_eq!(placement.position.left, 1060.0);
    assert_eq!(placement.arrow_left, 175.0);
}

#[test]
fn test_flips_above_near_bottom_edge() {
    let anchor = Rect::new(600.0, 740.0, 16.0, 16.0);
    assert!(anchor.bottom() + 10.0 + tooltip().height > viewport().height - 20.0);

    let placement = anchored_position(anchor, tooltip(), viewport(), &Margins::default());

    assert!(placement.flipped_above);
    assert_eq!(placement.position.top, 650.0);
    assert!(placement.position.top + tooltip().height <= anchor.top());
}

#[test]
fn test_flip_never_goes_above_top_margin() {
    // Tall tooltip that fits neither below nor above the anchor.
    let tall = Size::new(200.0, 700.0);
    let anchor = Rect::new(600.0, 300.0, 16.0, 16.0);
    let placement = anchored_position(anchor, tall, viewport(), &Margins::default());

    assert!(placement.flipped_above);
    assert_eq!(placement.position.top, 20.0);
}

#[test]
fn test_anchored_position_stays_inside_viewport() {
    let margins = Margins::default();
    let sizes = [Size::new(200.0, 80.0), Size::new(320.0, 240.0), Size::new(1200.0, 700.0)];
    let mut checked = 0;
    for size in sizes {
        for x in (-100..=1400).step_by(75) {
            for y in (-100..=900).step_by(50) {
                let anchor = Rect::new(x as f32, y as f32, 16.0, 16.0);
                let p = anchored_position(anchor, size, viewport(), &margins).position;
                assert!(
                    p.left >= 20.0 && p.left + size.width <= viewport().width - 20.0,
                    "Horizontal overflow for anchor {:?} size {:?}: {:?}",
                    anchor,
                    size,
                    p
                );
                assert!(
                    p.top >= 20.0 && p.top + size.height <= viewport().height - 20.0,
                    "Vertical overflow for anchor {:?} size {:?}: {:?}",
                    anchor,
                    size,
                    p
                );
                checked += 1;
            }
        }
    }
    assert!(checked > 500);
}

#[test]
fn test_same_inputs_give_same_output_after_other_viewports() {
    let anchor = Rect::new(600.0, 100.0, 16.0, 16.0);
    let margins = Margins::default();
    let first = anchored_position(anchor, tooltip(), viewport(), &margins);
    anchored_position(anchor, tooltip(), Size::new(400.0, 300.0), &margins);
    let again = anchored_position(anchor, tooltip(), viewport(), &margins);
    assert_eq!(first, again);
}

#[test]
fn test_drag_moves_by_pointer_delta() {
    let start = Rect::new(100.0, 100.0, 200.0, 80.0);
    let p = drag_position(Point::new(50.0, 30.0), start, viewport(), tooltip(), &Margins::default());
    assert_eq!(p, Position::new(130.0, 150.0));
}

#[test]
fn test_drag_clamps_to_viewport_margin() {
    let start = Rect::new(100.0, 100.0, 200.0, 80.0);
    let margins = Margins::default();

    let far = drag_position(Point::new(5000.0, 5000.0), start, viewport(), tooltip(), &margins);
    assert_eq!(far, Position::new(710.0, 1070.0));

    let behind = drag_position(Point::new(-5000.0, -5000.0), start, viewport(), tooltip(), &margins);
    assert_eq!(behind, Position::new(10.0, 10.0));
}

#[test]
fn test_drag_of_oversized_tooltip_keeps_top_left_margin() {
    let huge = Size::new(2000.0, 1000.0);
    let start = Rect::new(0.0, 0.0, huge.width, huge.height);
    let p = drag_position(Point::new(300.0, 300.0), start, viewport(), huge, &Margins::default());
    assert_eq!(p, Position::new(10.0, 10.0));
}

#[test]
fn test_refit_pulls_remembered_position_into_smaller_viewport() {
    let remembered = Position::new(700.0, 1200.0);
    let p = refit_position(remembered, Size::new(800.0, 600.0), tooltip(), &Margins::default());
    assert_eq!(p, Position::new(510.0, 590.0));
}
