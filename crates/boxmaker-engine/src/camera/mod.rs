//! Free orbit camera.
//!
//! The camera looks at the box from a fixed distance; pointer drags rotate the
//! box about the X (pitch) and Y (yaw) axes. Angles are in degrees and are not
//! clamped, so pitch can flip past the poles.

mod orbit;

pub use orbit::{OrbitCamera, OrbitController, OrbitDelta, Projection};
