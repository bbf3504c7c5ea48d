//! Tooltip sizing.

use crate::geometry::Size;

const AVG_GLYPH_WIDTH: f32 = 7.0;
const LINE_HEIGHT: f32 = 18.0;
const PADDING_H: f32 = 12.0;
const PADDING_V: f32 = 10.0;
/// Height of the drag handle row above the content.
const HANDLE_HEIGHT: f32 = 14.0;

/// Measures the rendered tooltip for a given text payload.
pub trait TooltipMeasure {
    fn measure(&self, text: &str, max_width: f32) -> Size;
}

/// Fixed-advance estimate: word-wraps at `max_width` and stacks lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextEstimate;

impl TooltipMeasure for TextEstimate {
    fn measure(&self, text: &str, max_width: f32) -> Size {
        let content_width = (max_width - PADDING_H * 2.0).max(AVG_GLYPH_WIDTH);
        let mut widest: f32 = 0.0;
        let mut lines = 0usize;

        for paragraph in text.lines().map(str::trim).filter(|p| !p.is_empty()) {
            let mut line_width: f32 = 0.0;
            lines += 1;
            for word in paragraph.split_whitespace() {
                let word_width = word.chars().count() as f32 * AVG_GLYPH_WIDTH;
                let with_space = if line_width > 0.0 { AVG_GLYPH_WIDTH } else { 0.0 };
                if line_width > 0.0 && line_width + with_space + word_width > content_width {
                    widest = widest.max(line_width);
                    line_width = word_width.min(content_width);
                    lines += 1;
                } else {
                    line_width = (line_width + with_space + word_width).min(content_width);
                }
            }
            widest = widest.max(line_width);
        }

        let lines = lines.max(1) as f32;
        Size::new(
            (widest + PADDING_H * 2.0).min(max_width),
            lines * LINE_HEIGHT + HANDLE_HEIGHT + PADDING_V * 2.0,
        )
    }
}

/// Always reports the same size. Handy when the host measures elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct FixedSize(pub Size);

impl TooltipMeasure for FixedSize {
    fn measure(&self, _text: &str, _max_width: f32) -> Size {
        self.0
    }
}
