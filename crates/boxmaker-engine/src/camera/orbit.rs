use glam::{Mat4, Vec3};

use crate::coords::Vec2;

/// Perspective parameters shared by every frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self { fov_y_deg: 45.0, near: 0.1, far: 100.0 }
    }
}

impl Projection {
    /// Right-handed perspective with wgpu's `0..1` depth range.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), aspect.max(1e-4), self.near, self.far)
    }
}

/// Camera state: yaw, pitch (degrees) and signed zoom distance along Z.
///
/// Mutated only through [`OrbitController`] deltas, [`OrbitCamera::zoom_by`] and
/// [`OrbitCamera::reset_orientation`]; read once per frame by the renderer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    /// Eye translation along Z. Negative values move the box away from the viewer.
    pub zoom: f32,
    pub projection: Projection,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: -25.0,
            pitch: 15.0,
            zoom: -16.0,
            projection: Projection::default(),
        }
    }
}

impl OrbitCamera {
    /// Canonical front-facing orientation used when entering edit mode.
    pub fn reset_orientation(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
        log::trace!("camera orientation reset");
    }

    pub fn apply(&mut self, delta: OrbitDelta) {
        self.yaw += delta.yaw;
        self.pitch += delta.pitch;
    }

    pub fn zoom_by(&mut self, amount: f32) {
        self.zoom += amount;
    }

    /// World → view: translate by `zoom`, then pitch about X, then yaw about Y.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, self.zoom))
            * Mat4::from_rotation_x(self.pitch.to_radians())
            * Mat4::from_rotation_y(self.yaw.to_radians())
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection.matrix(aspect) * self.view_matrix()
    }
}

/// Rotation produced by one pointer move.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct OrbitDelta {
    pub yaw: f32,
    pub pitch: f32,
}

/// Converts pointer drags into camera rotation deltas.
///
/// Horizontal motion maps to yaw, vertical motion to pitch, both scaled by
/// `sensitivity` degrees per pixel. No inertia.
#[derive(Debug, Clone)]
pub struct OrbitController {
    sensitivity: f32,
    last: Vec2,
}

impl OrbitController {
    pub fn new(sensitivity: f32) -> Self {
        Self { sensitivity, last: Vec2::zero() }
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Records the press position so the first move yields a relative delta.
    pub fn on_drag_start(&mut self, pos: Vec2) {
        self.last = pos;
    }

    /// Returns the delta since the previous pointer position and tracks `pos`.
    ///
    /// Tracking happens on every move, held button or not, so a later press
    /// never produces a jump.
    pub fn on_drag_move(&mut self, pos: Vec2) -> OrbitDelta {
        let d = (pos - self.last) * self.sensitivity;
        self.last = pos;
        OrbitDelta { yaw: d.x, pitch: d.y }
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec4;

    #[test]
    fn default_camera_matches_initial_framing() {
        let cam = OrbitCamera::default();
        assert_eq!((cam.yaw, cam.pitch, cam.zoom), (-25.0, 15.0, -16.0));
    }

    #[test]
    fn drag_delta_is_half_a_degree_per_pixel() {
        let mut ctl = OrbitController::default();
        ctl.on_drag_start(Vec2::new(100.0, 100.0));
        let d = ctl.on_drag_move(Vec2::new(110.0, 96.0));
        assert_eq!(d, OrbitDelta { yaw: 5.0, pitch: -2.0 });

        // Subsequent moves are relative to the last tracked position.
        let d = ctl.on_drag_move(Vec2::new(112.0, 96.0));
        assert_eq!(d, OrbitDelta { yaw: 1.0, pitch: 0.0 });
    }

    #[test]
    fn pitch_is_not_clamped() {
        let mut cam = OrbitCamera::default();
        cam.apply(OrbitDelta { yaw: 0.0, pitch: 400.0 });
        assert_eq!(cam.pitch, 415.0);
    }

    #[test]
    fn reset_orientation_keeps_zoom() {
        let mut cam = OrbitCamera::default();
        cam.zoom_by(2.0);
        cam.reset_orientation();
        assert_eq!((cam.yaw, cam.pitch, cam.zoom), (0.0, 0.0, -14.0));
    }

    #[test]
    fn front_facing_view_moves_origin_down_the_z_axis() {
        let mut cam = OrbitCamera::default();
        cam.reset_orientation();
        let p = cam.view_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.z, -16.0);
        assert_relative_eq!(p.x, 0.0);
    }

    #[test]
    fn box_center_projects_inside_clip_volume() {
        let cam = OrbitCamera::default();
        let clip = cam.view_proj(16.0 / 9.0) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc_z = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&ndc_z));
    }
}
