use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

use crate::coords::{Rect, Vec2};

/// Smallest pixel size text is rasterized at.
pub const MIN_TEXT_SIZE: f32 = 1.0;

/// Largest pixel size text is rasterized at; the height of the default
/// master texture.
pub const MAX_TEXT_SIZE: f32 = 1024.0;

/// Clamps a requested text size into `[MIN_TEXT_SIZE, MAX_TEXT_SIZE]`. NaN
/// becomes the minimum.
pub fn clamp_text_size(size: f32) -> f32 {
    if size.is_nan() {
        MIN_TEXT_SIZE
    } else {
        size.clamp(MIN_TEXT_SIZE, MAX_TEXT_SIZE)
    }
}

/// One rasterized glyph placed in texture space.
#[derive(Debug, Clone)]
pub struct PlacedGlyph {
    pub x: i32,
    pub y: i32,
    pub width: usize,
    pub height: usize,
    /// Row-major 8-bit coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// A laid-out, rasterized line of text and its bounding rectangle.
#[derive(Debug, Clone)]
pub struct GlyphRun {
    pub glyphs: Vec<PlacedGlyph>,
    /// Starts at the anchor and reaches the right/bottom extent of the ink and
    /// advances. Empty when nothing is visible.
    pub bounds: Rect,
}

impl GlyphRun {
    /// Lays out `text` with its line box top-left at `anchor`. `size` is
    /// clamped with [`clamp_text_size`].
    pub fn layout(font: &fontdue::Font, text: &str, size: f32, anchor: Vec2) -> Self {
        let size = clamp_text_size(size);

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings { x: anchor.x, y: anchor.y, ..LayoutSettings::default() });
        layout.append(&[font], &TextStyle::new(text, size, 0));

        let mut glyphs = Vec::new();
        let mut right = anchor.x;
        let mut bottom = anchor.y;

        for g in layout.glyphs() {
            if g.width == 0 || g.height == 0 || !g.char_data.rasterize() {
                continue;
            }
            let (metrics, coverage) = font.rasterize_indexed(g.key.glyph_index, g.key.px);
            right = right
                .max(g.x + metrics.width as f32)
                .max(g.x - metrics.xmin as f32 + metrics.advance_width);
            bottom = bottom.max(g.y + metrics.height as f32);

            glyphs.push(PlacedGlyph {
                x: g.x.round() as i32,
                y: g.y.round() as i32,
                width: metrics.width,
                height: metrics.height,
                coverage,
            });
        }

        let bounds = if glyphs.is_empty() {
            Rect::from_origin_size(anchor, Vec2::zero())
        } else {
            Rect::from_min_max(anchor, Vec2::new(right.ceil(), bottom.ceil()))
        };

        Self { glyphs, bounds }
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::test_fonts::fixture_font;

    #[test]
    fn bounds_start_at_anchor_and_cover_ink() {
        let font = fixture_font();
        let anchor = Vec2::new(400.0, 400.0);
        let run = GlyphRun::layout(&font, "EDIT ME", 80.0, anchor);

        assert_eq!(run.glyphs.len(), 6);
        assert_eq!(run.bounds.origin, anchor);
        assert!(run.bounds.size.x > 100.0 && run.bounds.size.y > 40.0);
        for g in &run.glyphs {
            assert!(g.y as f32 >= anchor.y);
            assert!((g.x + g.width as i32) as f32 <= run.bounds.max().x);
            assert!((g.y + g.height as i32) as f32 <= run.bounds.max().y);
            assert_eq!(g.coverage.len(), g.width * g.height);
        }
    }

    #[test]
    fn whitespace_only_is_empty() {
        let font = fixture_font();
        let run = GlyphRun::layout(&font, "   ", 40.0, Vec2::new(5.0, 5.0));
        assert!(run.is_empty());
        assert!(run.bounds.is_empty());
    }

    #[test]
    fn oversized_text_is_rasterized_at_the_cap() {
        let font = fixture_font();
        let run = GlyphRun::layout(&font, "I", 1.0e5, Vec2::zero());
        assert!(run.bounds.size.y <= MAX_TEXT_SIZE * 1.5);
        assert!(run.glyphs[0].height as f32 <= MAX_TEXT_SIZE);
    }

    #[test]
    fn clamp_text_size_handles_extremes() {
        assert_eq!(clamp_text_size(80.0), 80.0);
        assert_eq!(clamp_text_size(1.0e5), MAX_TEXT_SIZE);
        assert_eq!(clamp_text_size(f32::INFINITY), MAX_TEXT_SIZE);
        assert_eq!(clamp_text_size(-3.0), MIN_TEXT_SIZE);
        assert_eq!(clamp_text_size(f32::NAN), MIN_TEXT_SIZE);
    }
}
