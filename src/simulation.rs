//! 仿真上下文
//!
//! 持有物理世界、刚体注册表、电机控制器、帧时钟和暂停标志。
//! 每帧的顺序固定：物理步进（未暂停时）→ 位姿同步 → 电机检查。

use crate::clock::FrameClock;
use crate::control::{HingeMotorController, MotorTransition};
use crate::leg::{build_leg, LegRig};
use crate::physics::{PhysicsConfig, PhysicsWorld};
use crate::scene::BodyRegistry;
use crate::Result;

/// 单帧结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// 本帧使用的时间间隔（秒），暂停或刚恢复时为 `None`
    pub delta: Option<f32>,
    /// 本帧执行的物理子步数
    pub substeps: usize,
    /// 本帧测得的关节角
    pub angle: f32,
    /// 电机换向（如有）
    pub transition: Option<MotorTransition>,
    pub paused: bool,
}

/// 仿真上下文
pub struct Simulation {
    world: PhysicsWorld,
    registry: BodyRegistry,
    controller: HingeMotorController,
    rig: LegRig,
    clock: FrameClock,
    paused: bool,
}

impl Simulation {
    /// 搭建世界和腿
    pub fn new(config: &PhysicsConfig) -> Result<Self> {
        let mut world = PhysicsWorld::new(config)?;
        let mut registry = BodyRegistry::new();
        let rig = build_leg(&mut world, &mut registry, config)?;
        let controller = HingeMotorController::new(rig.upper, rig.lower, rig.knee, config);

        Ok(Self {
            world,
            registry,
            controller,
            rig,
            clock: FrameClock::new(),
            paused: false,
        })
    }

    /// 处理一帧（不含渲染）
    pub fn frame(&mut self, now_ms: f64) -> Result<FrameReport> {
        let mut delta = None;
        let mut substeps = 0;

        if self.paused {
            self.clock.invalidate();
        } else if let Some(dt) = self.clock.tick(now_ms) {
            delta = Some(dt);
            substeps = self.world.advance(dt);
        }

        self.registry.sync_visuals(&self.world);
        let transition = self.controller.update(&mut self.world)?;

        Ok(FrameReport {
            delta,
            substeps,
            angle: self.controller.last_angle(),
            transition,
            paused: self.paused,
        })
    }

    /// 切换暂停状态
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "模拟已暂停" } else { "模拟已恢复" });
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &HingeMotorController {
        &self.controller
    }

    pub fn rig(&self) -> LegRig {
        self.rig
    }
}
