//! 可渲染代理
//!
//! 每个刚体对应一个代理，变换每帧由刚体位姿覆盖，从不反写回物理。

use glam::{Quat, Vec3};

use crate::physics::BodyPose;

/// 圆柱几何（长轴为 Y，渲染器习惯）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylinderGeometry {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
}

impl CylinderGeometry {
    /// 渲染器默认的圆周分段数
    pub const DEFAULT_RADIAL_SEGMENTS: u32 = 8;

    pub fn new(radius: f32, height: f32) -> Self {
        Self {
            radius_top: radius,
            radius_bottom: radius,
            height,
            radial_segments: Self::DEFAULT_RADIAL_SEGMENTS,
        }
    }
}

/// 线性 RGB 颜色
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const GREEN: Color = Color::rgb(0.0, 0.5, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// 材质
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
}

/// 渲染变换
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl From<BodyPose> for Transform {
    fn from(pose: BodyPose) -> Self {
        Self {
            translation: pose.position,
            rotation: pose.rotation,
        }
    }
}

/// 可渲染代理
#[derive(Clone, Debug, PartialEq)]
pub struct VisualProxy {
    pub geometry: CylinderGeometry,
    pub material: Material,
    pub transform: Transform,
    pub cast_shadow: bool,
}

impl VisualProxy {
    pub fn cylinder(radius: f32, height: f32, color: Color) -> Self {
        Self {
            geometry: CylinderGeometry::new(radius, height),
            material: Material { color },
            transform: Transform::default(),
            cast_shadow: true,
        }
    }

    /// 用刚体位姿覆盖变换
    pub fn copy_pose(&mut self, pose: BodyPose) {
        self.transform = Transform::from(pose);
    }
}
