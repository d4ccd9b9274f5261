//! 相机与相机控制
//!
//! 相机交互本身由宿主实现，这里只定义边界和一个简单的轨道相机。

use glam::Vec3;

/// 相机位姿
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    /// 垂直视场角（度）
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(-8.0, 8.0, 8.0),
            target: Vec3::ZERO,
            fov_degrees: 65.0,
            near: 0.01,
            far: 500.0,
        }
    }
}

/// 相机控制边界
pub trait CameraControls {
    /// 当前相机位姿
    fn pose(&self) -> CameraPose;
    /// 恢复初始视角
    fn reset(&mut self);
}

/// 轨道相机：绕目标点旋转，距离限制在 [min_distance, max_distance]
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    initial: CameraPose,
    current: CameraPose,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraPose::default())
    }
}

impl OrbitCamera {
    pub fn new(initial: CameraPose) -> Self {
        Self {
            initial,
            current: initial,
            min_distance: 2.0,
            max_distance: 50.0,
        }
    }

    /// 移动相机到新位置，与目标的距离被夹在允许范围内
    pub fn move_to(&mut self, position: Vec3) {
        let offset = position - self.current.target;
        let distance = offset.length();
        let clamped = distance.clamp(self.min_distance, self.max_distance);
        let direction = offset.try_normalize().unwrap_or(Vec3::Z);
        self.current.position = self.current.target + direction * clamped;
    }

    pub fn distance(&self) -> f32 {
        self.current.position.distance(self.current.target)
    }
}

impl CameraControls for OrbitCamera {
    fn pose(&self) -> CameraPose {
        self.current
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_move_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.move_to(Vec3::new(0.0, 0.0, 0.5));
        assert_relative_eq!(camera.distance(), 2.0, epsilon = 1e-5);
        camera.move_to(Vec3::new(0.0, 100.0, 0.0));
        assert_relative_eq!(camera.distance(), 50.0, epsilon = 1e-4);
    }

    #[test]
    fn test_reset_restores_default() {
        let mut camera = OrbitCamera::default();
        camera.move_to(Vec3::new(3.0, 3.0, 3.0));
        camera.reset();
        assert_eq!(camera.pose(), CameraPose::default());
    }
}
