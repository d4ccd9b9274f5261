//! Knee Engine - 膝关节铰链仿真
//!
//! 两节圆柱骨头通过带电机的铰链相连，电机在两个角度阈值之间来回驱动，
//! 近似膝关节的屈伸循环：
//! - 固定步长的刚体模拟（Rapier3D）
//! - 每帧测量两节骨头的相对转角
//! - 越过阈值时翻转电机目标速度
//! - 渲染代理同步与帧循环驱动

pub mod clock;
pub mod control;
pub mod frame_loop;
pub mod leg;
pub mod physics;
pub mod scene;
pub mod simulation;

pub use clock::{ClockSource, FixedRateClock, FrameClock};
pub use control::{hinge_angle, HingeMotorController, MotorDirection};
pub use frame_loop::{FrameLoop, InputAction, Renderer, RunSummary};
pub use physics::{PhysicsConfig, PhysicsWorld};
pub use scene::{BodyRegistry, CameraControls, OrbitCamera, VisualProxy};
pub use simulation::{FrameReport, Simulation};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KneeError {
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Duplicate body: {0}")]
    DuplicateBody(String),

    #[error("Unknown body: {0}")]
    UnknownBody(String),

    #[error("Invalid joint: {0}")]
    InvalidJoint(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, KneeError>;
