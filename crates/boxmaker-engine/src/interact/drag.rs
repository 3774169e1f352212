use crate::coords::Vec2;
use crate::scene::{LayerRef, LayerStack, Placed};

/// Topmost layer under a texture-space point.
///
/// Text layers are tested last-to-first, then icon layers last-to-first, so
/// text always wins over icons. Layers without a rectangle never hit.
pub fn hit_test(layers: &LayerStack, p: Vec2) -> Option<LayerRef> {
    let hits = |placed: &dyn Placed| placed.bounding_rect().is_some_and(|r| r.contains(p));

    let text = layers
        .texts()
        .iter()
        .rposition(|l| hits(l))
        .map(LayerRef::Text);

    text.or_else(|| layers.icons().iter().rposition(|l| hits(l)).map(LayerRef::Icon))
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        layer: LayerRef,
        /// Half size of the rectangle at press time; used while the layer has no rectangle.
        half: Vec2,
    },
}

/// Moves a layer so the pointer stays at the center of its rectangle.
///
/// `Idle → Dragging` on a successful press, back to `Idle` on release or
/// cancel. The new anchor is `pointer - size / 2` with the size halved to
/// whole texels.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn active(&self) -> Option<LayerRef> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { layer, .. } => Some(layer),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active().is_some()
    }

    /// Hit-tests `p` and starts dragging whatever is on top.
    pub fn press(&mut self, layers: &LayerStack, p: Vec2) -> Option<LayerRef> {
        let layer = hit_test(layers, p)?;
        self.begin(layers, layer).then_some(layer)
    }

    /// Starts dragging `layer`. Fails for layers that do not exist or have
    /// never been composited.
    pub fn begin(&mut self, layers: &LayerStack, layer: LayerRef) -> bool {
        let Some(rect) = layers.placed(layer).and_then(|l| l.bounding_rect()) else {
            return false;
        };
        self.state = DragState::Dragging { layer, half: half_size(rect.size) };
        log::trace!("drag started on {layer:?}");
        true
    }

    /// Re-anchors the dragged layer under `p`. Returns whether anything moved.
    pub fn drag_to(&mut self, layers: &mut LayerStack, p: Vec2) -> bool {
        let DragState::Dragging { layer, half } = self.state else {
            return false;
        };
        let half = layers
            .placed(layer)
            .and_then(|l| l.bounding_rect())
            .map_or(half, |r| half_size(r.size));

        if layers.set_anchor(layer, p - half).is_err() {
            // The layer vanished underneath us.
            self.cancel();
            return false;
        }
        true
    }

    pub fn release(&mut self) {
        if let DragState::Dragging { layer, .. } = self.state {
            log::trace!("drag released on {layer:?}");
        }
        self.state = DragState::Idle;
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

fn half_size(size: Vec2) -> Vec2 {
    (size / 2.0).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;

    fn stack_with_text_rects(rects: &[Rect]) -> LayerStack {
        let mut s = LayerStack::new();
        for _ in rects {
            s.add_text();
        }
        let (texts, _) = s.layers_mut();
        for (t, r) in texts.iter_mut().zip(rects) {
            t.bounds = Some(*r);
        }
        s
    }

    #[test]
    fn overlap_resolves_to_later_layer() {
        let s = stack_with_text_rects(&[
            Rect::new(100.0, 100.0, 200.0, 100.0),
            Rect::new(150.0, 120.0, 200.0, 100.0),
        ]);
        assert_eq!(hit_test(&s, Vec2::new(160.0, 130.0)), Some(LayerRef::Text(1)));
        assert_eq!(hit_test(&s, Vec2::new(110.0, 110.0)), Some(LayerRef::Text(0)));
        assert_eq!(hit_test(&s, Vec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn text_wins_over_icon() {
        let mut s = stack_with_text_rects(&[Rect::new(0.0, 0.0, 50.0, 50.0)]);
        s.add_icon("i.png", 0.0, 0.0, 50.0, 50.0);
        let (_, icons) = s.layers_mut();
        icons[0].bounds = Some(Rect::new(0.0, 0.0, 50.0, 50.0));

        assert_eq!(hit_test(&s, Vec2::new(10.0, 10.0)), Some(LayerRef::Text(0)));
    }

    #[test]
    fn layer_without_rect_never_hits() {
        let mut s = LayerStack::new();
        s.add_text();
        assert_eq!(hit_test(&s, Vec2::new(400.0, 400.0)), None);
        assert!(!DragController::new().begin(&s, LayerRef::Text(0)));
    }

    #[test]
    fn drag_centers_rect_on_pointer() {
        let mut s = stack_with_text_rects(&[Rect::new(100.0, 100.0, 51.0, 31.0)]);
        let mut drag = DragController::new();
        assert_eq!(drag.press(&s, Vec2::new(120.0, 110.0)), Some(LayerRef::Text(0)));

        let pointer = Vec2::new(500.0, 300.0);
        assert!(drag.drag_to(&mut s, pointer));
        assert!(s.is_dirty());

        let anchor = s.texts()[0].anchor;
        assert_eq!(anchor, Vec2::new(475.0, 285.0));
        let center = Rect::from_origin_size(anchor, Vec2::new(51.0, 31.0)).center();
        assert!((center.x - pointer.x).abs() <= 1.0);
        assert!((center.y - pointer.y).abs() <= 1.0);
    }

    #[test]
    fn release_returns_to_idle() {
        let mut s = stack_with_text_rects(&[Rect::new(0.0, 0.0, 10.0, 10.0)]);
        let mut drag = DragController::new();
        drag.press(&s, Vec2::new(5.0, 5.0));
        assert!(drag.is_dragging());
        drag.release();
        assert_eq!(drag.state(), DragState::Idle);
        assert!(!drag.drag_to(&mut s, Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn removed_layer_cancels_drag() {
        let mut s = stack_with_text_rects(&[Rect::new(0.0, 0.0, 10.0, 10.0)]);
        let mut drag = DragController::new();
        drag.press(&s, Vec2::new(5.0, 5.0));
        s.remove_text(0).unwrap();
        assert!(!drag.drag_to(&mut s, Vec2::new(50.0, 50.0)));
        assert!(!drag.is_dragging());
    }
}
