pub mod camera;
pub mod portal;
pub mod stage;
pub mod target;

pub use camera::Camera;
pub use portal::{PortalFrustum, PortalProjector, PortalSurface, PortalView};
pub use stage::{Stage, StageRenderer};
pub use target::RenderTargetSize;
