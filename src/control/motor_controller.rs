//! 铰链电机振荡控制
//!
//! 每帧物理步进后读取两段骨头的相对旋转角，越过阈值时翻转电机目标速度。
//! 这是一个带滞回的开关控制器，不是 PID：角度本身不分正负，
//! 只能靠当前方向决定下一次检查哪一个阈值。

use glam::Quat;

use crate::physics::{BodyHandle, JointHandle, PhysicsConfig, PhysicsWorld};
use crate::{KneeError, Result};

/// 电机驱动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorDirection {
    /// 正向驱动（目标速度为负），等待角度回落到伸展阈值以下
    Forward,
    /// 反向驱动（目标速度为正），等待角度超过屈曲阈值
    #[default]
    Back,
}

impl MotorDirection {
    /// 该方向对应的电机目标角速度
    pub fn target_velocity(self, speed: f32) -> f32 {
        match self {
            MotorDirection::Forward => -speed,
            MotorDirection::Back => speed,
        }
    }
}

/// 振荡阈值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillationLimits {
    /// 屈曲上限（弧度），反向驱动时超过它即翻转
    pub flex: f32,
    /// 伸展下限（弧度），正向驱动时低于它即翻转
    pub extend: f32,
}

impl OscillationLimits {
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self {
            flex: config.flex_threshold,
            extend: config.extend_threshold,
        }
    }
}

/// 一次方向切换
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorTransition {
    /// 切换后的方向
    pub direction: MotorDirection,
    /// 下发给电机的目标角速度
    pub target_velocity: f32,
    /// 触发切换时的关节角
    pub angle: f32,
}

/// 两个朝向之间的摆角，范围 [0, PI]
///
/// `θ = 2·atan2(|xyz|, |w|)`，其中 xyz、w 为 `upper · lower⁻¹` 的向量和标量部分。
/// 在 w ≈ 1 附近 acos 精度很差，atan2 形式在相同朝向时给出精确的 0，
/// 也不依赖四元数已归一化。非有限输入返回 0。
pub fn hinge_angle(upper: Quat, lower: Quat) -> f32 {
    let relative = upper * lower.conjugate();
    if !relative.is_finite() {
        return 0.0;
    }
    2.0 * relative.xyz().length().atan2(relative.w.abs())
}

/// 铰链电机控制器
pub struct HingeMotorController {
    upper: BodyHandle,
    lower: BodyHandle,
    joint: JointHandle,
    direction: MotorDirection,
    limits: OscillationLimits,
    speed: f32,
    last_angle: f32,
    transition_count: u64,
}

impl HingeMotorController {
    pub fn new(
        upper: BodyHandle,
        lower: BodyHandle,
        joint: JointHandle,
        config: &PhysicsConfig,
    ) -> Self {
        Self {
            upper,
            lower,
            joint,
            direction: MotorDirection::default(),
            limits: OscillationLimits::from_config(config),
            speed: config.motor_speed,
            last_angle: 0.0,
            transition_count: 0,
        }
    }

    pub fn direction(&self) -> MotorDirection {
        self.direction
    }

    pub fn limits(&self) -> OscillationLimits {
        self.limits
    }

    /// 最近一次测得的关节角
    pub fn last_angle(&self) -> f32 {
        self.last_angle
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// 当前方向下应下发的目标角速度
    pub fn commanded_velocity(&self) -> f32 {
        self.direction.target_velocity(self.speed)
    }

    /// 用一个角度推进状态机
    ///
    /// 每次调用最多切换一次方向。
    pub fn observe(&mut self, angle: f32) -> Option<MotorTransition> {
        self.last_angle = angle;

        let next = match self.direction {
            MotorDirection::Back if angle > self.limits.flex => MotorDirection::Forward,
            MotorDirection::Forward if angle < self.limits.extend => MotorDirection::Back,
            _ => return None,
        };

        self.direction = next;
        self.transition_count += 1;
        Some(MotorTransition {
            direction: next,
            target_velocity: next.target_velocity(self.speed),
            angle,
        })
    }

    /// 读取当前关节角，必要时翻转电机
    pub fn update(&mut self, world: &mut PhysicsWorld) -> Result<Option<MotorTransition>> {
        let upper = world
            .body_pose(self.upper)
            .ok_or_else(|| KneeError::UnknownBody(format!("body {}", self.upper.index())))?;
        let lower = world
            .body_pose(self.lower)
            .ok_or_else(|| KneeError::UnknownBody(format!("body {}", self.lower.index())))?;

        let angle = hinge_angle(upper.rotation, lower.rotation);
        let Some(transition) = self.observe(angle) else {
            return Ok(None);
        };

        world.set_motor_velocity(self.joint, transition.target_velocity)?;
        log::debug!(
            "电机换向: {:?}, 目标速度={:.2} rad/s, 关节角={:.3} rad",
            transition.direction,
            transition.target_velocity,
            angle
        );
        Ok(Some(transition))
    }
}
