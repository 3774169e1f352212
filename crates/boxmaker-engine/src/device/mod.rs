//! GPU device, surface and depth buffer.
//!
//! - `Gpu` creates the wgpu Instance/Adapter/Device/Queue for one window
//! - the surface and its depth buffer are resized together
//! - `GpuFrame` carries everything a frame's passes need

mod depth;
mod gpu;
mod init;
mod surface;

pub use depth::DepthBuffer;
pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
