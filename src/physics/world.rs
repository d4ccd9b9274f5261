//! 物理世界管理器
//!
//! 持有 Rapier 的 PhysicsPipeline 及各个集合，按固定步长推进模拟。
//!
//! ## 组成
//! | 概念 | Rapier |
//! |------|--------|
//! | 世界 | PhysicsPipeline + RigidBodySet + ColliderSet + ImpulseJointSet |
//! | 宽相 | DefaultBroadPhase |
//! | 窄相 | NarrowPhase |
//! | 铰链 + 电机 | RevoluteJoint（AngX 速度电机） |

use glam::Vec3;
use rapier3d::prelude::*;
use std::num::NonZeroUsize;

use super::config::{PhysicsConfig, RemainderPolicy};
use super::hinge_joint::HingeJoint;
use super::rigid_body::{rapier_to_vec3, BodyPose, SimRigidBody};
use crate::{KneeError, Result};

/// 浮点误差容忍：帧间隔与固定步长只差舍入误差时仍算作一步
const STEP_TOLERANCE: f32 = 1.0e-6;

/// 刚体句柄（世界内的索引）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) usize);

impl BodyHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// 关节句柄（世界内的索引）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointHandle(pub(crate) usize);

impl JointHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// 计算本次调用需要执行的子步数
///
/// `floor(delta / fixed_timestep)`，上限为 `max_substeps`。
pub fn substep_count(fixed_timestep: f32, delta: f32, max_substeps: usize) -> usize {
    if !(fixed_timestep.is_finite() && fixed_timestep > 0.0) {
        return 0;
    }
    if !(delta.is_finite() && delta > 0.0) {
        return 0;
    }
    let steps = (delta / fixed_timestep + STEP_TOLERANCE).floor();
    (steps as usize).min(max_substeps)
}

/// 物理世界
pub struct PhysicsWorld {
    /// 物理流水线
    pub physics_pipeline: PhysicsPipeline,
    /// 积分参数
    pub integration_parameters: IntegrationParameters,
    /// 岛管理器
    pub island_manager: IslandManager,
    /// 宽相检测
    pub broad_phase: DefaultBroadPhase,
    /// 窄相检测
    pub narrow_phase: NarrowPhase,
    /// 刚体集合
    pub rigid_body_set: RigidBodySet,
    /// 碰撞体集合
    pub collider_set: ColliderSet,
    /// 关节集合
    pub impulse_joint_set: ImpulseJointSet,
    /// 多体关节集合（未使用，但流水线需要）
    pub multibody_joint_set: MultibodyJointSet,
    /// CCD 求解器
    pub ccd_solver: CCDSolver,
    /// 地面刚体句柄
    pub ground_handle: RigidBodyHandle,
    /// 重力向量
    pub gravity: Vector<Real>,
    bodies: Vec<SimRigidBody>,
    hinges: Vec<HingeJoint>,
    config: PhysicsConfig,
    /// 未消耗的时间（仅 Carry 策略使用）
    accumulator: f32,
    /// 累计执行的子步数
    total_substeps: u64,
}

impl PhysicsWorld {
    /// 创建新的物理世界
    pub fn new(config: &PhysicsConfig) -> Result<Self> {
        config.validate()?;

        let mut rigid_body_set = RigidBodySet::new();
        let mut collider_set = ColliderSet::new();

        // 地面：静态大盒子，上表面在 y = 0
        let ground = RigidBodyBuilder::fixed()
            .translation(vector![0.0, -50.0, 0.0])
            .build();
        let ground_handle = rigid_body_set.insert(ground);
        let ground_collider = ColliderBuilder::cuboid(1000.0, 50.0, 1000.0).build();
        collider_set.insert_with_parent(ground_collider, ground_handle, &mut rigid_body_set);

        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.fixed_timestep();
        integration_parameters.num_solver_iterations =
            NonZeroUsize::new(config.solver_iterations).unwrap_or(NonZeroUsize::MIN);
        integration_parameters.num_internal_pgs_iterations = config.pgs_iterations;

        if config.debug_log {
            log::info!(
                "[物理配置] FPS={}, 重力Y={}, 最大子步={}, 求解器迭代={}, 余量策略={:?}",
                config.physics_fps,
                config.gravity_y,
                config.max_substep_count,
                config.solver_iterations,
                config.remainder_policy
            );
        }

        Ok(Self {
            physics_pipeline: PhysicsPipeline::new(),
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set,
            collider_set,
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            ground_handle,
            gravity: vector![0.0, config.gravity_y, 0.0],
            bodies: Vec::new(),
            hinges: Vec::new(),
            config: config.clone(),
            accumulator: 0.0,
            total_substeps: 0,
        })
    }

    /// 当前配置
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// 添加刚体
    pub fn add_body(&mut self, mut body: SimRigidBody) -> Result<BodyHandle> {
        let rb = body.build_rigid_body(&self.config);
        let collider = body.build_collider()?;

        let rb_handle = self.rigid_body_set.insert(rb);
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, rb_handle, &mut self.rigid_body_set);
        body.rigid_body_handle = Some(rb_handle);
        body.collider_handle = Some(collider_handle);

        let index = self.bodies.len();
        if self.config.debug_log {
            let pos = body.initial_pose.position;
            log::info!(
                "[刚体] [{}] '{}': 类型={:?}, 质量={}, 半径={}, 高={}, 初始位置=({:.2},{:.2},{:.2})",
                index,
                body.name,
                body.kind,
                body.mass,
                body.shape.radius,
                body.shape.height,
                pos.x,
                pos.y,
                pos.z
            );
        }

        self.bodies.push(body);
        Ok(BodyHandle(index))
    }

    /// 添加铰链关节
    ///
    /// 世界中最多只允许一个带电机的铰链。
    pub fn add_hinge(&mut self, mut hinge: HingeJoint) -> Result<JointHandle> {
        if hinge.motor_enabled && self.hinges.iter().any(|h| h.motor_enabled) {
            return Err(KneeError::InvalidJoint(
                "only one motorized hinge is supported".to_string(),
            ));
        }

        let rb_a = self.rigid_body_handle(hinge.body_a_index)?;
        let rb_b = self.rigid_body_handle(hinge.body_b_index)?;

        let joint = hinge.build_joint(&self.config);
        let joint_handle = self.impulse_joint_set.insert(rb_a, rb_b, joint, true);
        hinge.joint_handle = Some(joint_handle);

        let index = self.hinges.len();
        log::debug!(
            "[关节] [{}] 刚体A={}, 刚体B={}, 轴=({:.2},{:.2},{:.2}), 电机={}",
            index,
            self.bodies[hinge.body_a_index].name,
            self.bodies[hinge.body_b_index].name,
            hinge.axis.x,
            hinge.axis.y,
            hinge.axis.z,
            hinge.motor_enabled
        );

        self.hinges.push(hinge);
        Ok(JointHandle(index))
    }

    fn rigid_body_handle(&self, index: usize) -> Result<RigidBodyHandle> {
        self.bodies
            .get(index)
            .and_then(|b| b.rigid_body_handle)
            .ok_or_else(|| KneeError::UnknownBody(format!("no rigid body at index {}", index)))
    }

    /// 设置铰链电机的目标角速度
    pub fn set_motor_velocity(&mut self, handle: JointHandle, target_velocity: f32) -> Result<()> {
        let hinge = self
            .hinges
            .get_mut(handle.0)
            .ok_or_else(|| KneeError::InvalidJoint(format!("no hinge at index {}", handle.0)))?;
        let joint_handle = hinge
            .joint_handle
            .ok_or_else(|| KneeError::InvalidJoint("hinge was never inserted".to_string()))?;
        let joint = self
            .impulse_joint_set
            .get_mut(joint_handle)
            .ok_or_else(|| KneeError::InvalidJoint("hinge missing from joint set".to_string()))?;

        hinge.apply_motor_velocity(&mut joint.data, target_velocity, &self.config)
    }

    /// 推进物理模拟
    ///
    /// 以 `fixed_timestep` 为步长执行 `floor(delta / fixed_timestep)` 个子步，
    /// 最多 `max_substeps` 个。超出的时间直接丢弃（宁可变慢也不雪崩）。
    /// 返回实际执行的子步数。
    pub fn step(&mut self, fixed_timestep: f32, delta: f32, max_substeps: usize) -> usize {
        if !(delta.is_finite() && delta >= 0.0) {
            log::warn!("忽略非法的帧间隔: {}", delta);
            return 0;
        }

        let available = match self.config.remainder_policy {
            RemainderPolicy::Drop => delta,
            RemainderPolicy::Carry => self.accumulator + delta,
        };

        let steps = substep_count(fixed_timestep, available, max_substeps);
        for _ in 0..steps {
            self.step_once(fixed_timestep);
        }

        let leftover = (available - steps as f32 * fixed_timestep).max(0.0);
        if steps == max_substeps && leftover >= fixed_timestep {
            log::debug!(
                "子步数达到上限 {}，丢弃 {:.4}s 模拟时间",
                max_substeps,
                leftover - leftover % fixed_timestep
            );
        }

        self.accumulator = match self.config.remainder_policy {
            RemainderPolicy::Drop => 0.0,
            RemainderPolicy::Carry if fixed_timestep > 0.0 => leftover % fixed_timestep,
            RemainderPolicy::Carry => 0.0,
        };

        steps
    }

    /// 按配置的固定步长和子步上限推进
    pub fn advance(&mut self, delta: f32) -> usize {
        let fixed_timestep = self.config.fixed_timestep();
        let max_substeps = self.config.max_substep_count;
        self.step(fixed_timestep, delta, max_substeps)
    }

    /// 执行一次物理步进
    fn step_once(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.total_substeps += 1;
    }

    /// 重置所有刚体到初始状态
    pub fn reset(&mut self) {
        for body in &self.bodies {
            if let Some(rb_handle) = body.rigid_body_handle {
                if let Some(rb) = self.rigid_body_set.get_mut(rb_handle) {
                    rb.set_position(body.initial_pose.to_isometry(), true);
                    rb.set_linvel(Vector::zeros(), true);
                    rb.set_angvel(Vector::zeros(), true);
                }
            }
        }
        self.accumulator = 0.0;
    }

    /// 获取刚体当前位姿
    pub fn body_pose(&self, handle: BodyHandle) -> Option<BodyPose> {
        let rb_handle = self.bodies.get(handle.0)?.rigid_body_handle?;
        let rb = self.rigid_body_set.get(rb_handle)?;
        Some(BodyPose::from_isometry(rb.position()))
    }

    /// 获取刚体当前角速度
    pub fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        let rb_handle = self.bodies.get(handle.0)?.rigid_body_handle?;
        let rb = self.rigid_body_set.get(rb_handle)?;
        Some(rapier_to_vec3(rb.angvel()))
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&SimRigidBody> {
        self.bodies.get(handle.0)
    }

    pub fn hinge(&self, handle: JointHandle) -> Option<&HingeJoint> {
        self.hinges.get(handle.0)
    }

    /// 获取刚体数量（不含地面）
    pub fn rigid_body_count(&self) -> usize {
        self.bodies.len()
    }

    /// 获取关节数量
    pub fn joint_count(&self) -> usize {
        self.hinges.len()
    }

    /// 累计执行的子步数
    pub fn total_substeps(&self) -> u64 {
        self.total_substeps
    }

    /// 未消耗的累积时间（秒）
    pub fn pending_time(&self) -> f32 {
        self.accumulator
    }
}
