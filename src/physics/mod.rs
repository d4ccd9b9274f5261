//! 物理系统模块
//!
//! 使用 Rapier3D 物理引擎实现两段腿的刚体模拟。
//!
//! ## 对应关系
//! | 概念 | Rapier |
//! |------|--------|
//! | 世界 | PhysicsPipeline + RigidBodySet + ColliderSet |
//! | 骨段（圆柱） | RigidBody + Collider（凸包） |
//! | 膝关节 | RevoluteJoint + 速度电机 |

mod hinge_joint;
mod rigid_body;
mod world;
pub mod config;

pub use config::{PhysicsConfig, RemainderPolicy};
pub use hinge_joint::HingeJoint;
pub use rigid_body::{BodyKind, BodyPose, CylinderShape, SimRigidBody};
pub use world::{substep_count, BodyHandle, JointHandle, PhysicsWorld};
