//! 铰链关节（膝关节）
//!
//! 使用 Rapier3D 的 RevoluteJoint 实现，带速度电机。
//! 两个刚体之间的碰撞被禁用。

use glam::Vec3;
use rapier3d::prelude::*;

use super::config::PhysicsConfig;
use super::rigid_body::vec3_to_rapier;
use crate::{KneeError, Result};

/// 铰链关节
pub struct HingeJoint {
    /// 刚体 A 索引（上段）
    pub body_a_index: usize,
    /// 刚体 B 索引（下段）
    pub body_b_index: usize,
    /// 刚体 A 局部空间的枢轴点
    pub pivot_a: Vec3,
    /// 刚体 B 局部空间的枢轴点
    pub pivot_b: Vec3,
    /// 旋转轴（两侧局部空间共用）
    pub axis: Vec3,
    /// 是否启用电机
    pub motor_enabled: bool,
    /// 电机目标角速度 (rad/s)
    pub motor_target_velocity: f32,
    /// 关节句柄
    pub joint_handle: Option<ImpulseJointHandle>,
}

impl HingeJoint {
    pub fn new(
        body_a_index: usize,
        body_b_index: usize,
        pivot_a: Vec3,
        pivot_b: Vec3,
        axis: Vec3,
    ) -> Result<Self> {
        if body_a_index == body_b_index {
            return Err(KneeError::InvalidJoint(
                "hinge must connect two different bodies".to_string(),
            ));
        }
        if !(pivot_a.is_finite() && pivot_b.is_finite()) {
            return Err(KneeError::InvalidJoint("hinge pivots must be finite".to_string()));
        }
        let axis = axis.try_normalize().ok_or_else(|| {
            KneeError::InvalidJoint(format!("hinge axis {:?} cannot be normalized", axis))
        })?;

        Ok(Self {
            body_a_index,
            body_b_index,
            pivot_a,
            pivot_b,
            axis,
            motor_enabled: false,
            motor_target_velocity: 0.0,
            joint_handle: None,
        })
    }

    /// 启用电机并设置初始目标角速度
    pub fn with_motor(mut self, target_velocity: f32) -> Self {
        self.motor_enabled = true;
        self.motor_target_velocity = target_velocity;
        self
    }

    /// 创建 Rapier RevoluteJoint
    pub fn build_joint(&self, config: &PhysicsConfig) -> GenericJoint {
        let axis = UnitVector::new_normalize(vec3_to_rapier(self.axis));

        let mut builder = RevoluteJointBuilder::new(axis)
            .local_anchor1(point![self.pivot_a.x, self.pivot_a.y, self.pivot_a.z])
            .local_anchor2(point![self.pivot_b.x, self.pivot_b.y, self.pivot_b.z])
            .contacts_enabled(false);

        if self.motor_enabled {
            builder = builder
                .motor_velocity(self.motor_target_velocity, config.motor_damping)
                .motor_max_force(config.motor_max_force);
        }

        builder.build().into()
    }

    /// 更新 Rapier 关节的电机目标速度
    ///
    /// 电机未启用时返回 `InvalidJoint`，关节保持不变。
    pub fn apply_motor_velocity(
        &mut self,
        joint: &mut GenericJoint,
        target_velocity: f32,
        config: &PhysicsConfig,
    ) -> Result<()> {
        if !self.motor_enabled {
            return Err(KneeError::InvalidJoint(
                "cannot command a hinge without a motor".to_string(),
            ));
        }
        self.motor_target_velocity = target_velocity;
        joint
            .set_motor_velocity(JointAxis::AngX, target_velocity, config.motor_damping)
            .set_motor_max_force(JointAxis::AngX, config.motor_max_force);
        Ok(())
    }
}
