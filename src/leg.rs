//! 腿部搭建
//!
//! 上段固定在空中作为锚点，下段通过带电机的铰链挂在上段底端。

use glam::Vec3;

use crate::physics::{
    BodyHandle, CylinderShape, HingeJoint, JointHandle, PhysicsConfig, PhysicsWorld, SimRigidBody,
};
use crate::scene::{BodyRegistry, Color, VisualProxy};
use crate::Result;

pub const UPPER_LEG_NAME: &str = "upper-leg";
pub const LOWER_LEG_NAME: &str = "lower-leg";

/// 物理圆柱的圆周分段数
pub const COLLISION_SEGMENTS: u32 = 10;

/// 单节骨头的参数
#[derive(Debug, Clone)]
pub struct SegmentSpec {
    pub name: &'static str,
    pub radius: f32,
    pub height: f32,
    /// 质量（0 表示固定）
    pub mass: f32,
    pub position: Vec3,
    pub color: Color,
}

impl SegmentSpec {
    /// 大腿：固定，半径 0.4，高 2，位于 y = 2 * 2.1
    pub fn upper_leg() -> Self {
        let height = 2.0;
        Self {
            name: UPPER_LEG_NAME,
            radius: 0.4,
            height,
            mass: 0.0,
            position: Vec3::new(0.0, height * 2.1, 0.0),
            color: Color::GREEN,
        }
    }

    /// 小腿：动态，质量 1，半径 0.3，高 2
    pub fn lower_leg() -> Self {
        Self {
            name: LOWER_LEG_NAME,
            radius: 0.3,
            height: 2.0,
            mass: 1.0,
            position: Vec3::new(0.0, 2.0, 0.0),
            color: Color::BLUE,
        }
    }
}

/// 搭好的腿
#[derive(Debug, Clone, Copy)]
pub struct LegRig {
    pub upper: BodyHandle,
    pub lower: BodyHandle,
    pub knee: JointHandle,
}

/// 添加一节骨头（刚体 + 渲染代理）
pub fn add_segment(
    world: &mut PhysicsWorld,
    registry: &mut BodyRegistry,
    spec: &SegmentSpec,
) -> Result<BodyHandle> {
    let shape = CylinderShape::new(spec.radius, spec.height, COLLISION_SEGMENTS)?;
    let body = SimRigidBody::new(spec.name, spec.mass, shape, spec.position)?;
    let handle = world.add_body(body)?;

    let mut visual = VisualProxy::cylinder(spec.radius, spec.height, spec.color);
    if let Some(pose) = world.body_pose(handle) {
        visual.copy_pose(pose);
    }
    registry.register(spec.name, handle, visual)?;
    Ok(handle)
}

/// 搭建整条腿：两节骨头和膝关节
///
/// 枢轴位于两节相接的一端：上段 (0, -h/2, 0)，下段 (0, +h/2, 0)，绕 X 轴转动。
pub fn build_leg(
    world: &mut PhysicsWorld,
    registry: &mut BodyRegistry,
    config: &PhysicsConfig,
) -> Result<LegRig> {
    let upper_spec = SegmentSpec::upper_leg();
    let lower_spec = SegmentSpec::lower_leg();

    add_segment(world, registry, &upper_spec)?;
    add_segment(world, registry, &lower_spec)?;

    let upper = registry.find(UPPER_LEG_NAME)?;
    let lower = registry.find(LOWER_LEG_NAME)?;

    let knee = HingeJoint::new(
        upper.index(),
        lower.index(),
        Vec3::new(0.0, -upper_spec.height / 2.0, 0.0),
        Vec3::new(0.0, lower_spec.height / 2.0, 0.0),
        Vec3::X,
    )?
    .with_motor(config.motor_speed);
    let knee = world.add_hinge(knee)?;

    log::info!(
        "腿部搭建完成: {} 个刚体, {} 个关节, 电机初速 {} rad/s",
        world.rigid_body_count(),
        world.joint_count(),
        config.motor_speed
    );

    Ok(LegRig { upper, lower, knee })
}
