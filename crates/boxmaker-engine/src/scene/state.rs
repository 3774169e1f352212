use std::path::{Path, PathBuf};

use crate::camera::OrbitCamera;
use crate::paint::Rgba8;

use super::LayerStack;

/// How pointer input is routed.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum InteractionMode {
    /// Primary-button drags orbit the camera, the wheel zooms.
    #[default]
    Orbit,
    /// Primary-button presses hit-test layers and drag them; orbit is off.
    Edit,
}

/// Everything the editor mutates between frames.
///
/// Anything that changes the master texture marks the layer stack dirty, so
/// one flag drives the compositor.
#[derive(Debug, Clone)]
pub struct SceneState {
    pub layers: LayerStack,
    pub camera: OrbitCamera,
    background: Rgba8,
    wrap_image: Option<PathBuf>,
    mode: InteractionMode,
}

impl SceneState {
    pub fn new(background: Rgba8, camera: OrbitCamera) -> Self {
        Self {
            layers: LayerStack::new(),
            camera,
            background,
            wrap_image: None,
            mode: InteractionMode::default(),
        }
    }

    pub fn background(&self) -> Rgba8 {
        self.background
    }

    pub fn set_background(&mut self, color: Rgba8) {
        if self.background != color {
            self.background = color;
            self.layers.mark_dirty();
        }
    }

    pub fn wrap_image(&self) -> Option<&Path> {
        self.wrap_image.as_deref()
    }

    pub fn set_wrap_image(&mut self, path: Option<PathBuf>) {
        self.wrap_image = path;
        self.layers.mark_dirty();
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switches routing. Entering edit mode faces the box front-on.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode == InteractionMode::Edit && self.mode != InteractionMode::Edit {
            self.camera.reset_orientation();
        }
        self.mode = mode;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.layers.is_dirty()
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(Rgba8::WHITE, OrbitCamera::default())
    }
}
