//! 电机控制

mod motor_controller;

pub use motor_controller::{
    hinge_angle, HingeMotorController, MotorDirection, MotorTransition, OscillationLimits,
};
