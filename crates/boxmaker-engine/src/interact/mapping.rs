use crate::coords::{TextureSize, Vec2, Viewport};

/// Maps viewport pixels linearly onto a texel space and truncates to whole
/// texels.
///
/// The mapping ignores the 3D projection: the full viewport covers the full
/// `space`, whatever the camera shows. Degenerate viewports map to the origin.
pub fn screen_to_texture(pointer: Vec2, viewport: Viewport, space: TextureSize) -> Vec2 {
    if !viewport.is_valid() {
        return Vec2::zero();
    }
    Vec2::new(
        pointer.x / viewport.width * space.width as f32,
        pointer.y / viewport.height * space.height as f32,
    )
    .trunc()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEX: TextureSize = TextureSize::new(2048, 1024);

    #[test]
    fn corners_map_to_texture_corners() {
        let vp = Viewport::new(1000.0, 500.0);
        assert_eq!(screen_to_texture(Vec2::zero(), vp, TEX), Vec2::zero());
        assert_eq!(screen_to_texture(Vec2::new(1000.0, 500.0), vp, TEX), Vec2::new(2048.0, 1024.0));
    }

    #[test]
    fn truncates_to_whole_texels() {
        let vp = Viewport::new(1000.0, 1000.0);
        assert_eq!(screen_to_texture(Vec2::new(0.9, 0.9), vp, TEX), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn zero_sized_viewport_maps_to_origin() {
        let vp = Viewport::new(0.0, 10.0);
        assert_eq!(screen_to_texture(Vec2::new(5.0, 5.0), vp, TEX), Vec2::zero());
    }
}
