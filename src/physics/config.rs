//! 物理配置
//!
//! 所有参数扁平化，创建 [`PhysicsWorld`](super::PhysicsWorld) 和电机控制器时显式传入。

use std::f32::consts::PI;

use crate::{KneeError, Result};

/// 子步余量处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemainderPolicy {
    /// 每次调用后丢弃不足一个固定步长的剩余时间
    #[default]
    Drop,
    /// 保留不足一个固定步长的剩余时间，留给下一次调用
    /// （超出最大子步数的部分仍然丢弃）
    Carry,
}

/// 物理配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    // ========== 重力 ==========
    /// 重力 Y 分量（负数向下），默认 -9.82
    pub gravity_y: f32,

    // ========== 模拟参数 ==========
    /// 物理 FPS，默认 60.0（固定步长 1/60 秒）
    pub physics_fps: f32,
    /// 每帧最大子步数，默认 3
    pub max_substep_count: usize,
    /// 剩余时间处理策略，默认丢弃
    pub remainder_policy: RemainderPolicy,
    /// 求解器迭代次数，默认 4
    pub solver_iterations: usize,
    /// 内部 PGS 迭代次数，默认 1
    pub pgs_iterations: usize,

    // ========== 刚体阻尼 ==========
    /// 动态刚体线性阻尼，默认 0.01
    pub linear_damping: f32,
    /// 动态刚体角阻尼，默认 0.01
    pub angular_damping: f32,

    // ========== 电机 ==========
    /// 电机目标角速度大小 (rad/s)，默认 3.0
    pub motor_speed: f32,
    /// 电机速度跟踪系数，越大越接近硬约束
    pub motor_damping: f32,
    /// 电机最大力矩，默认 1e6
    pub motor_max_force: f32,
    /// 屈曲上限（超过后反向），默认 PI / 1.5（约 120 度）
    pub flex_threshold: f32,
    /// 伸展下限（低于后反向），默认 0.1 弧度
    pub extend_threshold: f32,

    // ========== 调试 ==========
    /// 是否输出调试日志，默认 false
    pub debug_log: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_y: -9.82,

            physics_fps: 60.0,
            // 卡顿时最多补 3 步，多出来的时间直接丢掉
            max_substep_count: 3,
            remainder_policy: RemainderPolicy::Drop,
            solver_iterations: 4,
            pgs_iterations: 1,

            linear_damping: 0.01,
            angular_damping: 0.01,

            motor_speed: 3.0,
            motor_damping: 1000.0,
            motor_max_force: 1.0e6,
            flex_threshold: PI / 1.5,
            extend_threshold: 0.1,

            debug_log: false,
        }
    }
}

impl PhysicsConfig {
    /// 固定步长（秒）
    pub fn fixed_timestep(&self) -> f32 {
        1.0 / self.physics_fps
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<()> {
        if !(self.physics_fps.is_finite() && self.physics_fps > 0.0) {
            return Err(KneeError::InvalidConfig(format!(
                "physics_fps must be positive, got {}",
                self.physics_fps
            )));
        }
        if self.max_substep_count == 0 {
            return Err(KneeError::InvalidConfig(
                "max_substep_count must be at least 1".to_string(),
            ));
        }
        if self.solver_iterations == 0 {
            return Err(KneeError::InvalidConfig(
                "solver_iterations must be at least 1".to_string(),
            ));
        }
        if !self.gravity_y.is_finite() {
            return Err(KneeError::InvalidConfig("gravity_y must be finite".to_string()));
        }
        if !(self.extend_threshold >= 0.0
            && self.extend_threshold < self.flex_threshold
            && self.flex_threshold <= PI)
        {
            return Err(KneeError::InvalidConfig(format!(
                "thresholds must satisfy 0 <= extend ({}) < flex ({}) <= PI",
                self.extend_threshold, self.flex_threshold
            )));
        }
        if !(self.motor_speed.is_finite() && self.motor_speed > 0.0) {
            return Err(KneeError::InvalidConfig(format!(
                "motor_speed must be positive, got {}",
                self.motor_speed
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.fixed_timestep(), 1.0 / 60.0);
        assert_eq!(config.max_substep_count, 3);
        assert_eq!(config.remainder_policy, RemainderPolicy::Drop);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let config = PhysicsConfig {
            extend_threshold: 2.5,
            flex_threshold: 0.5,
            ..PhysicsConfig::default()
        };
        assert!(matches!(config.validate(), Err(KneeError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_substeps() {
        let config = PhysicsConfig {
            max_substep_count: 0,
            ..PhysicsConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
