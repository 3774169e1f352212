use std::path::PathBuf;

use crate::coords::Vec2;
use crate::error::{LayerError, LayerKind};

use super::layer::{IconLayer, LayerRef, Placed, TextEdit, TextLayer};

/// Ordered text and icon layers plus the dirty flag consumed by the compositor.
///
/// Both lists keep insertion order, which is paint order. Every successful
/// mutation marks the stack dirty; only a compositor pass clears it.
#[derive(Debug, Clone)]
pub struct LayerStack {
    texts: Vec<TextLayer>,
    icons: Vec<IconLayer>,
    dirty: bool,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStack {
    /// Empty stack; dirty so the first frame composites the background.
    pub fn new() -> Self {
        Self {
            texts: Vec::new(),
            icons: Vec::new(),
            dirty: true,
        }
    }

    // ── text ──────────────────────────────────────────────────────────────

    /// Appends a default text layer and returns its index.
    pub fn add_text(&mut self) -> usize {
        self.push_text(TextLayer::default())
    }

    pub fn push_text(&mut self, layer: TextLayer) -> usize {
        self.texts.push(layer);
        self.mark_dirty();
        log::trace!("text layer added, {} total", self.texts.len());
        self.texts.len() - 1
    }

    pub fn remove_text(&mut self, index: usize) -> Result<TextLayer, LayerError> {
        check(LayerKind::Text, index, self.texts.len())?;
        let removed = self.texts.remove(index);
        self.mark_dirty();
        log::trace!("text layer {index} removed");
        Ok(removed)
    }

    /// Applies a partial edit. An empty edit leaves the dirty flag alone.
    pub fn update_text(&mut self, index: usize, edit: TextEdit) -> Result<(), LayerError> {
        check(LayerKind::Text, index, self.texts.len())?;
        if edit.is_empty() {
            return Ok(());
        }
        edit.apply_to(&mut self.texts[index]);
        self.mark_dirty();
        Ok(())
    }

    pub fn texts(&self) -> &[TextLayer] {
        &self.texts
    }

    pub fn text(&self, index: usize) -> Option<&TextLayer> {
        self.texts.get(index)
    }

    // ── icons ─────────────────────────────────────────────────────────────

    pub fn add_icon(&mut self, path: impl Into<PathBuf>, x: f32, y: f32, w: f32, h: f32) -> usize {
        self.push_icon(IconLayer::new(path, Vec2::new(x, y), Vec2::new(w, h)))
    }

    pub fn push_icon(&mut self, layer: IconLayer) -> usize {
        self.icons.push(layer);
        self.mark_dirty();
        log::trace!("icon layer added, {} total", self.icons.len());
        self.icons.len() - 1
    }

    pub fn remove_icon(&mut self, index: usize) -> Result<IconLayer, LayerError> {
        check(LayerKind::Icon, index, self.icons.len())?;
        let removed = self.icons.remove(index);
        self.mark_dirty();
        log::trace!("icon layer {index} removed");
        Ok(removed)
    }

    pub fn icons(&self) -> &[IconLayer] {
        &self.icons
    }

    pub fn icon(&self, index: usize) -> Option<&IconLayer> {
        self.icons.get(index)
    }

    // ── shared ────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.texts.len() + self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.icons.is_empty()
    }

    pub fn placed(&self, layer: LayerRef) -> Option<&dyn Placed> {
        match layer {
            LayerRef::Text(i) => self.texts.get(i).map(|l| l as &dyn Placed),
            LayerRef::Icon(i) => self.icons.get(i).map(|l| l as &dyn Placed),
        }
    }

    /// Moves a layer's anchor and marks the stack dirty.
    pub fn set_anchor(&mut self, layer: LayerRef, anchor: Vec2) -> Result<(), LayerError> {
        let target: &mut dyn Placed = match layer {
            LayerRef::Text(i) => {
                check(LayerKind::Text, i, self.texts.len())?;
                &mut self.texts[i]
            }
            LayerRef::Icon(i) => {
                check(LayerKind::Icon, i, self.icons.len())?;
                &mut self.icons[i]
            }
        };
        target.set_anchor(anchor);
        self.mark_dirty();
        Ok(())
    }

    /// Both lists for the compositor, which is the only writer of bounds.
    pub(crate) fn layers_mut(&mut self) -> (&mut [TextLayer], &mut [IconLayer]) {
        (&mut self.texts, &mut self.icons)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

fn check(kind: LayerKind, index: usize, len: usize) -> Result<(), LayerError> {
    if index < len {
        Ok(())
    } else {
        Err(LayerError::IndexOutOfRange { kind, index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_tracks_adds_minus_valid_removes() {
        let mut s = LayerStack::new();
        s.add_text();
        s.add_text();
        s.add_icon("a.png", 0.0, 0.0, 10.0, 10.0);
        assert!(s.remove_text(5).is_err());
        assert!(s.remove_icon(0).is_ok());
        assert!(s.remove_icon(0).is_err());
        s.add_text();
        assert!(s.remove_text(0).is_ok());
        assert_eq!(s.len(), 2);
        assert_eq!(s.texts().len(), 2);
        assert!(s.icons().is_empty());
    }

    #[test]
    fn out_of_range_reports_kind_and_len() {
        let mut s = LayerStack::new();
        s.add_icon("a.png", 0.0, 0.0, 1.0, 1.0);
        let err = s.remove_icon(3).unwrap_err();
        assert_eq!(err, LayerError::IndexOutOfRange { kind: LayerKind::Icon, index: 3, len: 1 });
        assert_eq!(s.icons().len(), 1);
    }

    #[test]
    fn mutations_mark_dirty() {
        let mut s = LayerStack::new();
        s.clear_dirty();
        s.add_text();
        assert!(s.is_dirty());

        s.clear_dirty();
        s.update_text(0, TextEdit::text("HELLO")).unwrap();
        assert!(s.is_dirty());
        assert_eq!(s.text(0).unwrap().text, "HELLO");

        s.clear_dirty();
        s.set_anchor(LayerRef::Text(0), Vec2::new(1.0, 2.0)).unwrap();
        assert!(s.is_dirty());
    }

    #[test]
    fn empty_edit_keeps_stack_clean() {
        let mut s = LayerStack::new();
        s.add_text();
        s.clear_dirty();
        s.update_text(0, TextEdit::default()).unwrap();
        assert!(!s.is_dirty());
    }

    #[test]
    fn failed_update_leaves_layers_untouched() {
        let mut s = LayerStack::new();
        s.add_text();
        s.clear_dirty();
        assert!(s.update_text(1, TextEdit::size(10.0)).is_err());
        assert!(!s.is_dirty());
        assert_eq!(s.text(0).unwrap().size, 80.0);
    }

    #[test]
    fn placed_resolves_both_kinds() {
        let mut s = LayerStack::new();
        s.add_text();
        s.add_icon("b.png", 5.0, 6.0, 7.0, 8.0);
        assert_eq!(s.placed(LayerRef::Text(0)).unwrap().anchor(), Vec2::new(400.0, 400.0));
        assert_eq!(s.placed(LayerRef::Icon(0)).unwrap().anchor(), Vec2::new(5.0, 6.0));
        assert!(s.placed(LayerRef::Icon(1)).is_none());
    }
}
