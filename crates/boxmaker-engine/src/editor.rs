//! Editor facade: the single entry point collaborators drive.
//!
//! Owns the scene, the compositor, both controllers and the renderers. CPU
//! work (rebuilds, hit-testing, camera updates) never needs a device, so
//! everything except [`Editor::render_frame`] runs headless.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::camera::{OrbitCamera, OrbitController};
use crate::compose::{decode_image, fit_to_texture_limit, Compositor, CompositorConfig, RebuildReport};
use crate::coords::{TextureSize, Vec2, Viewport};
use crate::error::{AssetError, LayerError};
use crate::geometry::BoxParams;
use crate::input::{MouseButton, MouseWheelDelta};
use crate::interact::{screen_to_texture, DragController};
use crate::paint::Rgba8;
use crate::render::{BackdropRenderer, BoxRenderer, LightParams, RenderCtx, RenderTarget};
use crate::scene::{IconLayer, InteractionMode, LayerRef, SceneState, TextEdit, TextLayer};
use crate::text::FontSystem;

/// Editor configuration.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub texture_size: TextureSize,
    pub wrap_size: TextureSize,
    pub box_params: BoxParams,
    /// Degrees of rotation per pointer pixel.
    pub orbit_sensitivity: f32,
    /// Zoom change per wheel line.
    pub wheel_step: f32,
    /// Pixel wheel deltas are divided by this to get lines.
    pub pixels_per_line: f32,
    pub camera: OrbitCamera,
    /// Texel space the viewport is linearly mapped onto for hit-testing.
    pub pointer_space: TextureSize,
    /// Searched before the platform font directories.
    pub font_dirs: Vec<PathBuf>,
    pub background: Rgba8,
    /// Surface clear color behind the backdrop.
    pub clear_color: Rgba8,
    pub light: LightParams,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let texture_size = TextureSize::new(2048, 1024);
        Self {
            texture_size,
            wrap_size: TextureSize::new(1024, 1024),
            box_params: BoxParams::default(),
            orbit_sensitivity: 0.5,
            wheel_step: 0.5,
            pixels_per_line: 40.0,
            camera: OrbitCamera::default(),
            pointer_space: texture_size,
            font_dirs: Vec::new(),
            background: Rgba8::WHITE,
            clear_color: Rgba8::BLACK,
            light: LightParams::default(),
        }
    }
}

pub struct Editor {
    config: EditorConfig,
    scene: SceneState,
    compositor: Compositor,
    drag: DragController,
    orbit: OrbitController,
    primary_down: bool,

    /// Compositor output not yet written to the GPU.
    texture_pending: bool,
    backdrop_pending: Option<RgbaImage>,

    box_renderer: BoxRenderer,
    backdrop_renderer: BackdropRenderer,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let fonts = FontSystem::new(config.font_dirs.iter().cloned());
        Self::with_fonts(config, fonts)
    }

    /// Builds an editor around an already configured font system.
    pub fn with_fonts(config: EditorConfig, fonts: FontSystem) -> Self {
        let compositor = Compositor::new(
            CompositorConfig {
                texture_size: config.texture_size,
                wrap_size: config.wrap_size,
            },
            fonts,
        );

        Self {
            scene: SceneState::new(config.background, config.camera),
            compositor,
            drag: DragController::new(),
            orbit: OrbitController::new(config.orbit_sensitivity),
            primary_down: false,
            texture_pending: false,
            backdrop_pending: None,
            box_renderer: BoxRenderer::new(config.light),
            backdrop_renderer: BackdropRenderer::new(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.scene.camera
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn fonts_mut(&mut self) -> &mut FontSystem {
        self.scene.layers.mark_dirty();
        self.compositor.fonts_mut()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn is_edit_mode(&self) -> bool {
        self.scene.mode() == InteractionMode::Edit
    }

    // --- scene mutations ---

    pub fn set_background_color(&mut self, color: Rgba8) {
        self.scene.set_background(color);
    }

    /// Uses `path` as wrap art. The file is re-read on the next rebuild even
    /// if the same path was set before.
    pub fn set_wrap_image(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.compositor.forget(&path);
        log::info!("wrap image set: {}", path.display());
        self.scene.set_wrap_image(Some(path));
    }

    pub fn clear_wrap_image(&mut self) {
        self.scene.set_wrap_image(None);
    }

    /// Decodes a backdrop image now; it reaches the GPU on the next frame.
    ///
    /// On failure the current backdrop stays in place.
    pub fn set_backdrop_image(&mut self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let path = path.as_ref();
        let img = decode_image(path).inspect_err(|e| log::warn!("backdrop kept: {e}"))?;
        log::info!("backdrop set: {} ({}x{})", path.display(), img.width(), img.height());
        self.backdrop_pending = Some(img);
        Ok(())
    }

    pub fn add_text_layer(&mut self) -> usize {
        let index = self.scene.layers.add_text();
        log::trace!("text layer {index} added");
        index
    }

    pub fn update_text_layer(&mut self, index: usize, edit: TextEdit) -> Result<(), LayerError> {
        self.scene.layers.update_text(index, edit)
    }

    pub fn remove_text_layer(&mut self, index: usize) -> Result<TextLayer, LayerError> {
        let removed = self.scene.layers.remove_text(index)?;
        self.drag.cancel();
        log::trace!("text layer {index} removed");
        Ok(removed)
    }

    pub fn add_icon_layer(&mut self, path: impl Into<PathBuf>, x: f32, y: f32, w: f32, h: f32) -> usize {
        let index = self.scene.layers.add_icon(path, x, y, w, h);
        log::trace!("icon layer {index} added");
        index
    }

    pub fn remove_icon_layer(&mut self, index: usize) -> Result<IconLayer, LayerError> {
        let removed = self.scene.layers.remove_icon(index)?;
        self.drag.cancel();
        log::trace!("icon layer {index} removed");
        Ok(removed)
    }

    /// Switches between orbiting and layer editing. Entering edit mode faces
    /// the box front-on; any drag in progress is dropped either way.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        let mode = if enabled { InteractionMode::Edit } else { InteractionMode::Orbit };
        self.scene.set_mode(mode);
        self.drag.cancel();
        log::debug!("interaction mode: {mode:?}");
    }

    // --- frames ---

    /// Recomposites the master texture if anything changed since the last pass.
    pub fn prepare_frame(&mut self) -> Option<RebuildReport> {
        if !self.scene.is_dirty() {
            return None;
        }

        let background = self.scene.background();
        let wrap = self.scene.wrap_image().map(Path::to_path_buf);
        let report = self.compositor.rebuild(background, wrap.as_deref(), &mut self.scene.layers);
        self.texture_pending = true;

        if !report.is_clean() {
            log::debug!("rebuild finished with {} skipped asset(s)", report.errors.len());
        }
        Some(report)
    }

    /// Rebuilds if needed, uploads pending rasters, then draws the backdrop and the box.
    pub fn render_frame(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.prepare_frame();

        if self.texture_pending {
            let buffer = self.compositor.buffer();
            self.box_renderer.upload_texture(ctx, buffer.size(), &buffer.flipped_bytes());
            self.texture_pending = false;
        }

        if let Some(img) = self.backdrop_pending.take() {
            let img = fit_to_texture_limit(img, ctx.device.limits().max_texture_dimension_2d);
            let size = TextureSize::new(img.width(), img.height());
            self.backdrop_renderer.set_image(ctx, size, img.as_raw());
        }

        self.backdrop_renderer.render(ctx, target);
        self.box_renderer.render(ctx, target, self.config.box_params, &self.scene.camera);
    }

    // --- pointer input ---

    /// Primary press: starts a layer drag in edit mode, an orbit otherwise.
    ///
    /// Returns the layer that started dragging, if any.
    pub fn on_pointer_down(&mut self, pos: Vec2, viewport: Viewport, button: MouseButton) -> Option<LayerRef> {
        if button != MouseButton::Left {
            return None;
        }
        self.primary_down = true;

        match self.scene.mode() {
            InteractionMode::Orbit => {
                self.orbit.on_drag_start(pos);
                None
            }
            InteractionMode::Edit => {
                // Hit-testing needs rectangles from the current layer state.
                self.prepare_frame();
                let p = screen_to_texture(pos, viewport, self.config.pointer_space);
                let hit = self.drag.press(&self.scene.layers, p);
                if let Some(layer) = hit {
                    log::debug!("dragging {layer:?} from {p:?}");
                }
                hit
            }
        }
    }

    pub fn on_pointer_move(&mut self, pos: Vec2, viewport: Viewport) {
        // Tracked regardless of buttons so the next press starts from here.
        let delta = self.orbit.on_drag_move(pos);

        match self.scene.mode() {
            InteractionMode::Orbit => {
                if self.primary_down {
                    self.scene.camera.apply(delta);
                }
            }
            InteractionMode::Edit => {
                if self.drag.is_dragging() {
                    let p = screen_to_texture(pos, viewport, self.config.pointer_space);
                    self.drag.drag_to(&mut self.scene.layers, p);
                }
            }
        }
    }

    /// Ends an orbit or layer drag. Layers only move on pointer motion.
    pub fn on_pointer_up(&mut self, button: MouseButton) {
        if button != MouseButton::Left {
            return;
        }
        self.drag.release();
        self.primary_down = false;
    }

    /// Zooms in orbit mode; ignored while editing.
    pub fn on_wheel(&mut self, delta: MouseWheelDelta) {
        if self.is_edit_mode() {
            return;
        }
        let lines = match delta {
            MouseWheelDelta::Line { y, .. } => y,
            MouseWheelDelta::Pixel { y, .. } => y / self.config.pixels_per_line.max(1.0),
        };
        self.scene.camera.zoom_by(lines * self.config.wheel_step);
        log::trace!("zoom now {}", self.scene.camera.zoom);
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Placed;

    const VIEW: Viewport = Viewport::new(1024.0, 512.0);

    fn headless() -> Editor {
        Editor::with_fonts(EditorConfig::default(), FontSystem::with_dirs(Vec::new()))
    }

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, image::Rgba([200, 0, 0, 255])).save(&path).unwrap();
        path
    }

    #[test]
    fn orbit_drag_rotates_only_while_held() {
        let mut ed = headless();
        let start = *ed.camera();

        ed.on_pointer_move(Vec2::new(10.0, 10.0), VIEW);
        assert_eq!(ed.camera().yaw, start.yaw);

        ed.on_pointer_down(Vec2::new(10.0, 10.0), VIEW, MouseButton::Left);
        ed.on_pointer_move(Vec2::new(30.0, 0.0), VIEW);
        assert_eq!(ed.camera().yaw, start.yaw + 10.0);
        assert_eq!(ed.camera().pitch, start.pitch - 5.0);

        ed.on_pointer_up(MouseButton::Left);
        ed.on_pointer_move(Vec2::new(90.0, 0.0), VIEW);
        assert_eq!(ed.camera().yaw, start.yaw + 10.0);
    }

    #[test]
    fn secondary_button_does_not_orbit() {
        let mut ed = headless();
        let start = *ed.camera();
        ed.on_pointer_down(Vec2::new(0.0, 0.0), VIEW, MouseButton::Right);
        ed.on_pointer_move(Vec2::new(50.0, 50.0), VIEW);
        assert_eq!(*ed.camera(), start);
    }

    #[test]
    fn edit_mode_resets_orientation_and_blocks_orbit() {
        let mut ed = headless();
        ed.set_edit_mode(true);
        assert_eq!((ed.camera().yaw, ed.camera().pitch), (0.0, 0.0));

        ed.on_pointer_down(Vec2::new(0.0, 0.0), VIEW, MouseButton::Left);
        ed.on_pointer_move(Vec2::new(100.0, 100.0), VIEW);
        assert_eq!((ed.camera().yaw, ed.camera().pitch), (0.0, 0.0));
    }

    #[test]
    fn wheel_zooms_in_orbit_mode_only() {
        let mut ed = headless();
        ed.on_wheel(MouseWheelDelta::Line { x: 0.0, y: 2.0 });
        assert_eq!(ed.camera().zoom, -15.0);
        ed.on_wheel(MouseWheelDelta::Pixel { x: 0.0, y: -80.0 });
        assert_eq!(ed.camera().zoom, -16.0);

        ed.set_edit_mode(true);
        ed.on_wheel(MouseWheelDelta::Line { x: 0.0, y: 2.0 });
        assert_eq!(ed.camera().zoom, -16.0);
    }

    #[test]
    fn prepare_frame_only_rebuilds_when_dirty() {
        let mut ed = headless();
        assert!(ed.prepare_frame().is_some());
        assert!(ed.prepare_frame().is_none());

        ed.set_background_color(Rgba8::rgb(1, 2, 3));
        assert!(ed.prepare_frame().is_some());
        assert_eq!(ed.compositor().buffer().pixel(0, 0), Some(Rgba8::rgb(1, 2, 3)));
    }

    #[test]
    fn icon_drag_follows_pointer_in_edit_mode() {
        let dir = tempfile::tempdir().unwrap();
        let icon = write_png(dir.path(), "icon.png", 20, 20);

        let mut ed = headless();
        ed.add_icon_layer(&icon, 100.0, 100.0, 50.0, 50.0);
        ed.set_edit_mode(true);

        // 1024x512 viewport onto 2048x1024 texels: two texels per pixel.
        let hit = ed.on_pointer_down(Vec2::new(55.0, 55.0), VIEW, MouseButton::Left);
        assert_eq!(hit, Some(LayerRef::Icon(0)));

        // The rectangle is the 50x50 target box, so the anchor sits 25 texels up-left.
        ed.on_pointer_move(Vec2::new(200.0, 100.0), VIEW);
        assert_eq!(ed.scene().layers.icons()[0].anchor(), Vec2::new(375.0, 175.0));

        ed.on_pointer_up(MouseButton::Left);
        assert!(!ed.drag().is_dragging());
    }

    #[test]
    fn click_without_motion_leaves_layer_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let icon = write_png(dir.path(), "icon.png", 20, 20);

        let mut ed = headless();
        ed.add_icon_layer(&icon, 100.0, 100.0, 50.0, 50.0);
        ed.set_edit_mode(true);

        let hit = ed.on_pointer_down(Vec2::new(55.0, 55.0), VIEW, MouseButton::Left);
        assert_eq!(hit, Some(LayerRef::Icon(0)));
        ed.on_pointer_up(MouseButton::Left);

        assert_eq!(ed.scene().layers.icons()[0].anchor(), Vec2::new(100.0, 100.0));
        assert!(!ed.drag().is_dragging());
    }

    #[test]
    fn press_on_empty_texture_starts_nothing() {
        let mut ed = headless();
        ed.set_edit_mode(true);
        assert_eq!(ed.on_pointer_down(Vec2::new(5.0, 5.0), VIEW, MouseButton::Left), None);
        assert!(!ed.drag().is_dragging());
    }

    #[test]
    fn removing_a_layer_cancels_drag() {
        let dir = tempfile::tempdir().unwrap();
        let icon = write_png(dir.path(), "icon.png", 20, 20);

        let mut ed = headless();
        ed.add_icon_layer(&icon, 0.0, 0.0, 50.0, 50.0);
        ed.set_edit_mode(true);
        ed.on_pointer_down(Vec2::new(2.0, 2.0), VIEW, MouseButton::Left);
        assert!(ed.drag().is_dragging());

        ed.remove_icon_layer(0).unwrap();
        assert!(!ed.drag().is_dragging());
        assert!(ed.remove_icon_layer(0).is_err());
    }

    #[test]
    fn layer_count_tracks_adds_and_valid_removes() {
        let mut ed = headless();
        for _ in 0..3 {
            ed.add_text_layer();
        }
        ed.add_icon_layer("a.png", 0.0, 0.0, 10.0, 10.0);
        assert!(ed.remove_text_layer(7).is_err());
        ed.remove_text_layer(1).unwrap();
        assert_eq!(ed.scene().layers.len(), 3);
    }

    #[test]
    fn failed_backdrop_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "bg.png", 8, 4);

        let mut ed = headless();
        ed.set_backdrop_image(&good).unwrap();
        let err = ed.set_backdrop_image(dir.path().join("missing.png"));
        assert!(matches!(err, Err(AssetError::Io { .. })));
        assert_eq!(ed.backdrop_pending.as_ref().map(|i| i.dimensions()), Some((8, 4)));
    }

    #[test]
    fn wrap_image_round_trip_through_scene() {
        let mut ed = headless();
        ed.prepare_frame();
        ed.set_wrap_image("wrap.png");
        assert_eq!(ed.scene().wrap_image(), Some(Path::new("wrap.png")));
        assert!(ed.prepare_frame().is_some());

        ed.clear_wrap_image();
        assert_eq!(ed.scene().wrap_image(), None);
    }
}
