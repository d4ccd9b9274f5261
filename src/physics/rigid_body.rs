//! 刚体封装
//!
//! 圆柱体刚体，对应腿部的一节骨头。使用 Rapier3D 的 RigidBody + Collider 实现。

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use std::f32::consts::PI;

use super::config::PhysicsConfig;
use crate::{KneeError, Result};

/// 刚体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// 固定刚体（质量为 0），只作为约束锚点
    Fixed,
    /// 动态刚体，完全由物理驱动
    Dynamic,
}

impl BodyKind {
    /// 质量为 0 表示固定刚体
    pub fn from_mass(mass: f32) -> Self {
        if mass == 0.0 {
            BodyKind::Fixed
        } else {
            BodyKind::Dynamic
        }
    }
}

/// 刚体位姿（世界空间）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for BodyPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl BodyPose {
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn from_isometry(iso: &Isometry<Real>) -> Self {
        Self {
            position: rapier_to_vec3(&iso.translation.vector),
            rotation: rapier_to_quat(&iso.rotation),
        }
    }

    pub fn to_isometry(&self) -> Isometry<Real> {
        Isometry::from_parts(
            Translation3::from(vec3_to_rapier(self.position)),
            quat_to_rapier(self.rotation),
        )
    }
}

/// 圆柱碰撞形状
///
/// 物理侧的圆柱按习惯沿局部 Z 轴建模，渲染侧的圆柱沿 Y 轴。
/// 生成碰撞体时对所有顶点做一次固定的修正旋转（绕 X 轴 -90 度），之后不再处理。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderShape {
    pub radius: f32,
    pub height: f32,
    /// 圆周分段数
    pub segments: u32,
}

impl CylinderShape {
    pub fn new(radius: f32, height: f32, segments: u32) -> Result<Self> {
        let shape = Self {
            radius,
            height,
            segments,
        };
        shape.validate()?;
        Ok(shape)
    }

    fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(KneeError::InvalidShape(format!(
                "cylinder radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(KneeError::InvalidShape(format!(
                "cylinder height must be positive, got {}",
                self.height
            )));
        }
        if self.segments < 3 {
            return Err(KneeError::InvalidShape(format!(
                "cylinder needs at least 3 segments, got {}",
                self.segments
            )));
        }
        Ok(())
    }

    /// 半高
    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }

    /// 从物理圆柱（沿 Z）到渲染圆柱（沿 Y）的修正旋转
    pub fn authoring_correction() -> Quat {
        Quat::from_axis_angle(Vec3::X, -PI / 2.0)
    }

    /// 沿局部 Z 轴的原始顶点（两端各一圈）
    pub fn authored_points(&self) -> Vec<Vec3> {
        let half = self.half_height();
        let mut points = Vec::with_capacity(self.segments as usize * 2);
        for i in 0..self.segments {
            let theta = 2.0 * PI * i as f32 / self.segments as f32;
            let (sin, cos) = theta.sin_cos();
            let x = self.radius * cos;
            let y = self.radius * sin;
            points.push(Vec3::new(x, y, -half));
            points.push(Vec3::new(x, y, half));
        }
        points
    }

    /// 修正后的顶点（长轴为 Y）
    pub fn hull_points(&self) -> Vec<Vec3> {
        let correction = Self::authoring_correction();
        self.authored_points()
            .into_iter()
            .map(|p| correction * p)
            .collect()
    }
}

/// 仿真刚体
///
/// 封装 Rapier 的 RigidBody 和 Collider。
pub struct SimRigidBody {
    /// 刚体名称
    pub name: String,
    /// 刚体类型
    pub kind: BodyKind,
    /// 质量（0 表示固定）
    pub mass: f32,
    /// 碰撞形状
    pub shape: CylinderShape,
    /// 初始位姿（用于重置）
    pub initial_pose: BodyPose,
    /// 刚体句柄
    pub rigid_body_handle: Option<RigidBodyHandle>,
    /// 碰撞体句柄
    pub collider_handle: Option<ColliderHandle>,
}

impl SimRigidBody {
    pub fn new(
        name: impl Into<String>,
        mass: f32,
        shape: CylinderShape,
        position: Vec3,
    ) -> Result<Self> {
        let name = name.into();
        if !(mass.is_finite() && mass >= 0.0) {
            return Err(KneeError::InvalidShape(format!(
                "body '{}' has invalid mass {}",
                name, mass
            )));
        }
        shape.validate()?;

        Ok(Self {
            name,
            kind: BodyKind::from_mass(mass),
            mass,
            shape,
            initial_pose: BodyPose::from_translation(position),
            rigid_body_handle: None,
            collider_handle: None,
        })
    }

    /// 创建 Rapier 刚体
    pub fn build_rigid_body(&self, config: &PhysicsConfig) -> RigidBody {
        let builder = match self.kind {
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .linear_damping(config.linear_damping)
                .angular_damping(config.angular_damping),
        };

        builder
            .position(self.initial_pose.to_isometry())
            .ccd_enabled(false)
            .can_sleep(false)
            .build()
    }

    /// 创建 Rapier 碰撞体（凸包圆柱）
    pub fn build_collider(&self) -> Result<Collider> {
        let points: Vec<Point<Real>> = self
            .shape
            .hull_points()
            .into_iter()
            .map(|p| point![p.x, p.y, p.z])
            .collect();

        let builder = ColliderBuilder::convex_hull(&points).ok_or_else(|| {
            KneeError::InvalidShape(format!("failed to build convex hull for '{}'", self.name))
        })?;

        let builder = match self.kind {
            BodyKind::Fixed => builder,
            BodyKind::Dynamic => builder.mass(self.mass),
        };

        Ok(builder.friction(0.3).restitution(0.0).build())
    }
}

/// 将 glam Vec3 转换为 Rapier Vector
pub fn vec3_to_rapier(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

/// 将 Rapier Vector 转换为 glam Vec3
pub fn rapier_to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// 将 glam Quat 转换为 Rapier 旋转
pub fn quat_to_rapier(q: Quat) -> Rotation<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

/// 将 Rapier 旋转转换为 glam Quat
pub fn rapier_to_quat(r: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(r.i, r.j, r.k, r.w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mass_zero_is_fixed() {
        let shape = CylinderShape::new(0.4, 2.0, 10).unwrap();
        let body = SimRigidBody::new("anchor", 0.0, shape, Vec3::ZERO).unwrap();
        assert_eq!(body.kind, BodyKind::Fixed);

        let body = SimRigidBody::new("swing", 1.0, shape, Vec3::ZERO).unwrap();
        assert_eq!(body.kind, BodyKind::Dynamic);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(CylinderShape::new(0.0, 2.0, 10).is_err());
        assert!(CylinderShape::new(0.3, -1.0, 10).is_err());
        assert!(CylinderShape::new(0.3, 2.0, 2).is_err());
    }

    #[test]
    fn test_rejects_negative_mass() {
        let shape = CylinderShape::new(0.3, 2.0, 10).unwrap();
        assert!(SimRigidBody::new("bad", -1.0, shape, Vec3::ZERO).is_err());
    }

    #[test]
    fn test_hull_points_are_y_aligned() {
        let shape = CylinderShape::new(0.3, 2.0, 10).unwrap();
        let points = shape.hull_points();
        assert_eq!(points.len(), 20);

        for p in &points {
            // 两端在 y = ±1，半径在 XZ 平面
            assert_abs_diff_eq!(p.y.abs(), 1.0, epsilon = 1e-5);
            assert_abs_diff_eq!((p.x * p.x + p.z * p.z).sqrt(), 0.3, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_pose_roundtrip_through_rapier() {
        let pose = BodyPose {
            position: Vec3::new(1.0, -2.0, 3.0),
            rotation: Quat::from_axis_angle(Vec3::X, 0.7),
        };
        let back = BodyPose::from_isometry(&pose.to_isometry());
        assert_abs_diff_eq!(back.position.distance(pose.position), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(back.rotation.dot(pose.rotation).abs(), 1.0, epsilon = 1e-6);
    }
}
