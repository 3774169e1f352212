use std::path::{Path, PathBuf};

use crate::coords::{Rect, Vec2};
use crate::paint::Rgba8;
use crate::text::clamp_text_size;

/// Common surface of anything placed on the master texture.
///
/// Hit-testing and dragging only go through this trait.
pub trait Placed {
    /// Top-left placement point in texture space.
    fn anchor(&self) -> Vec2;

    fn set_anchor(&mut self, anchor: Vec2);

    /// Rectangle produced by the most recent compositor pass.
    ///
    /// `None` until the layer has been composited once, or when the last pass
    /// could not render it.
    fn bounding_rect(&self) -> Option<Rect>;
}

/// Stable reference into one of the two layer lists.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LayerRef {
    Text(usize),
    Icon(usize),
}

/// A run of text drawn in a single font, size and color.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub text: String,
    pub anchor: Vec2,
    /// Opaque font identifier, usually a file name such as `arial.ttf`.
    pub font: String,
    /// Point size; one point is one texel on the master texture.
    pub size: f32,
    pub color: Rgba8,
    pub(crate) bounds: Option<Rect>,
}

impl TextLayer {
    pub const DEFAULT_TEXT: &'static str = "EDIT ME";
    pub const DEFAULT_ANCHOR: Vec2 = Vec2::new(400.0, 400.0);
    pub const DEFAULT_SIZE: f32 = 80.0;
    pub const DEFAULT_FONT: &'static str = "arial.ttf";

    pub fn new(text: impl Into<String>, anchor: Vec2) -> Self {
        Self {
            text: text.into(),
            anchor,
            ..Self::default()
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    /// Sizes outside the rasterizable range are clamped.
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = clamp_text_size(size);
        self
    }

    pub fn with_color(mut self, color: Rgba8) -> Self {
        self.color = color;
        self
    }
}

impl Default for TextLayer {
    fn default() -> Self {
        Self {
            text: Self::DEFAULT_TEXT.to_string(),
            anchor: Self::DEFAULT_ANCHOR,
            font: Self::DEFAULT_FONT.to_string(),
            size: Self::DEFAULT_SIZE,
            color: Rgba8::WHITE,
            bounds: None,
        }
    }
}

impl Placed for TextLayer {
    fn anchor(&self) -> Vec2 {
        self.anchor
    }

    fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    fn bounding_rect(&self) -> Option<Rect> {
        self.bounds
    }
}

/// An image file shrunk to fit inside `max_size` and drawn at `anchor`.
#[derive(Debug, Clone, PartialEq)]
pub struct IconLayer {
    pub path: PathBuf,
    pub anchor: Vec2,
    pub max_size: Vec2,
    pub(crate) bounds: Option<Rect>,
}

impl IconLayer {
    pub const DEFAULT_ANCHOR: Vec2 = Vec2::new(300.0, 300.0);
    pub const DEFAULT_SIZE: Vec2 = Vec2::new(150.0, 150.0);

    pub fn new(path: impl Into<PathBuf>, anchor: Vec2, max_size: Vec2) -> Self {
        Self {
            path: path.into(),
            anchor,
            max_size,
            bounds: None,
        }
    }

    /// Icon with the default placement and target box.
    pub fn at_default(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Self::DEFAULT_ANCHOR, Self::DEFAULT_SIZE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Placed for IconLayer {
    fn anchor(&self) -> Vec2 {
        self.anchor
    }

    fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    /// Always the configured box `(x, y, w, h)` once composited, regardless of
    /// the aspect-fitted image size.
    fn bounding_rect(&self) -> Option<Rect> {
        self.bounds
    }
}

/// Partial update of a [`TextLayer`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextEdit {
    pub text: Option<String>,
    pub size: Option<f32>,
    pub font: Option<String>,
    pub color: Option<Rgba8>,
}

impl TextEdit {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }

    pub fn size(size: f32) -> Self {
        Self { size: Some(size), ..Self::default() }
    }

    pub fn font(font: impl Into<String>) -> Self {
        Self { font: Some(font.into()), ..Self::default() }
    }

    pub fn color(color: Rgba8) -> Self {
        Self { color: Some(color), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.size.is_none() && self.font.is_none() && self.color.is_none()
    }

    /// Applies the edit in place. The size is clamped like
    /// [`TextLayer::with_size`].
    pub fn apply_to(self, layer: &mut TextLayer) {
        if let Some(text) = self.text {
            layer.text = text;
        }
        if let Some(size) = self.size {
            layer.size = clamp_text_size(size);
        }
        if let Some(font) = self.font {
            layer.font = font;
        }
        if let Some(color) = self.color {
            layer.color = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_defaults_match_fresh_layer() {
        let t = TextLayer::default();
        assert_eq!(t.text, "EDIT ME");
        assert_eq!(t.anchor, Vec2::new(400.0, 400.0));
        assert_eq!(t.size, 80.0);
        assert_eq!(t.font, "arial.ttf");
        assert_eq!(t.color, Rgba8::WHITE);
        assert_eq!(t.bounding_rect(), None);
    }

    #[test]
    fn partial_edit_keeps_untouched_fields() {
        let mut t = TextLayer::default();
        TextEdit { size: Some(40.0), color: Some(Rgba8::BLACK), ..TextEdit::default() }.apply_to(&mut t);
        assert_eq!(t.size, 40.0);
        assert_eq!(t.color, Rgba8::BLACK);
        assert_eq!(t.text, "EDIT ME");
        assert_eq!(t.font, "arial.ttf");
    }

    #[test]
    fn size_edits_are_clamped() {
        let mut t = TextLayer::default();
        TextEdit::size(1.0e5).apply_to(&mut t);
        assert_eq!(t.size, crate::text::MAX_TEXT_SIZE);
        TextEdit::size(f32::NAN).apply_to(&mut t);
        assert_eq!(t.size, crate::text::MIN_TEXT_SIZE);
        assert_eq!(TextLayer::default().with_size(0.0).size, crate::text::MIN_TEXT_SIZE);
    }

    #[test]
    fn empty_edit_is_detected() {
        assert!(TextEdit::default().is_empty());
        assert!(!TextEdit::text("hi").is_empty());
    }

    #[test]
    fn placed_anchor_round_trips_through_trait_object() {
        let mut icon = IconLayer::at_default("logo.png");
        let placed: &mut dyn Placed = &mut icon;
        placed.set_anchor(Vec2::new(12.0, 34.0));
        assert_eq!(placed.anchor(), Vec2::new(12.0, 34.0));
        assert_eq!(icon.max_size, Vec2::new(150.0, 150.0));
    }
}
