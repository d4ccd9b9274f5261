//! 场景侧数据：渲染代理、刚体注册表、相机边界

mod camera;
mod registry;
mod visual;

pub use camera::{CameraControls, CameraPose, OrbitCamera};
pub use registry::{BodyRegistry, RegistryEntry};
pub use visual::{Color, CylinderGeometry, Material, Transform, VisualProxy};
