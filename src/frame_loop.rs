//! 帧循环驱动
//!
//! 宿主每帧调用一次 [`FrameLoop::frame`]：推进仿真，然后把所有渲染代理交给渲染器。
//! 时间来源通过 [`ClockSource`] 注入，便于用合成时间戳驱动。

use crate::clock::ClockSource;
use crate::control::MotorDirection;
use crate::scene::{CameraControls, CameraPose, VisualProxy};
use crate::simulation::{FrameReport, Simulation};
use crate::Result;

/// 渲染边界
pub trait Renderer {
    /// 每帧调用一次，此时所有代理的变换已经更新
    fn render(&mut self, proxies: &[VisualProxy], camera: &CameraPose);
}

/// 用户输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// 暂停 / 继续
    TogglePause,
    /// 相机复位（不影响物理）
    ResetCamera,
}

/// 一段运行的统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub substeps: u64,
    pub transitions: u64,
    pub paused_frames: u64,
    pub max_angle: f32,
    pub final_direction: Option<MotorDirection>,
}

/// 帧循环
pub struct FrameLoop<R: Renderer, C: CameraControls> {
    simulation: Simulation,
    renderer: R,
    camera: C,
}

impl<R: Renderer, C: CameraControls> FrameLoop<R, C> {
    pub fn new(simulation: Simulation, renderer: R, camera: C) -> Self {
        Self {
            simulation,
            renderer,
            camera,
        }
    }

    /// 处理一帧并渲染
    pub fn frame(&mut self, now_ms: f64) -> Result<FrameReport> {
        let report = self.simulation.frame(now_ms)?;
        self.renderer
            .render(self.simulation.registry().visuals(), &self.camera.pose());
        Ok(report)
    }

    /// 处理用户输入
    pub fn handle_input(&mut self, action: InputAction) {
        match action {
            InputAction::TogglePause => {
                self.simulation.toggle_pause();
            }
            InputAction::ResetCamera => self.camera.reset(),
        }
    }

    /// 从时钟取时间戳，逐帧运行直到时钟耗尽或达到 `max_frames`
    pub fn run<S: ClockSource>(&mut self, clock: &mut S, max_frames: u64) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        while summary.frames < max_frames {
            let Some(now) = clock.next_timestamp() else {
                break;
            };
            let report = self.frame(now)?;
            summary.frames += 1;
            summary.substeps += report.substeps as u64;
            summary.max_angle = summary.max_angle.max(report.angle);
            if report.paused {
                summary.paused_frames += 1;
            }
            if report.transition.is_some() {
                summary.transitions += 1;
            }
        }
        summary.final_direction = Some(self.simulation.controller().direction());
        Ok(summary)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedRateClock;
    use crate::physics::PhysicsConfig;
    use crate::scene::OrbitCamera;
    use glam::Vec3;

    /// 记录每次渲染调用
    #[derive(Default)]
    struct RecordingRenderer {
        calls: usize,
        last_positions: Vec<Vec3>,
        last_camera: Option<CameraPose>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, proxies: &[VisualProxy], camera: &CameraPose) {
            self.calls += 1;
            self.last_positions = proxies.iter().map(|p| p.transform.translation).collect();
            self.last_camera = Some(*camera);
        }
    }

    fn frame_loop() -> FrameLoop<RecordingRenderer, OrbitCamera> {
        let simulation = Simulation::new(&PhysicsConfig::default()).unwrap();
        FrameLoop::new(simulation, RecordingRenderer::default(), OrbitCamera::default())
    }

    #[test]
    fn test_renders_once_per_frame() {
        let mut fl = frame_loop();
        let mut clock = FixedRateClock::new(60.0).with_frame_limit(10);
        let summary = fl.run(&mut clock, 100).unwrap();
        assert_eq!(summary.frames, 10);
        assert_eq!(fl.renderer().calls, 10);
        assert_eq!(summary.substeps, 9);

        let rig = fl.simulation().rig();
        let pose = fl.simulation().world().body_pose(rig.lower).unwrap();
        assert!(fl.renderer().last_positions.contains(&pose.position));
    }

    #[test]
    fn test_pause_input_freezes_physics() {
        let mut fl = frame_loop();
        let mut clock = FixedRateClock::new(60.0);
        fl.run(&mut clock, 20).unwrap();

        fl.handle_input(InputAction::TogglePause);
        let frozen = fl.simulation().world().total_substeps();
        let summary = fl.run(&mut clock, 20).unwrap();
        assert_eq!(summary.paused_frames, 20);
        assert_eq!(summary.substeps, 0);
        assert_eq!(fl.simulation().world().total_substeps(), frozen);
        // 暂停时依然渲染
        assert_eq!(fl.renderer().calls, 40);

        fl.handle_input(InputAction::TogglePause);
        let summary = fl.run(&mut clock, 20).unwrap();
        assert_eq!(summary.paused_frames, 0);
        assert_eq!(summary.substeps, 19);
    }

    #[test]
    fn test_reset_camera_does_not_touch_physics() {
        let mut fl = frame_loop();
        let mut clock = FixedRateClock::new(60.0);
        fl.run(&mut clock, 10).unwrap();

        fl.camera_mut().move_to(Vec3::new(10.0, 1.0, 0.0));
        let steps = fl.simulation().world().total_substeps();
        fl.handle_input(InputAction::ResetCamera);

        assert_eq!(fl.camera().pose(), CameraPose::default());
        assert_eq!(fl.simulation().world().total_substeps(), steps);

        fl.run(&mut clock, 1).unwrap();
        assert_eq!(fl.renderer().last_camera, Some(CameraPose::default()));
    }

    #[test]
    fn test_long_run_oscillates() {
        let mut fl = frame_loop();
        let mut clock = FixedRateClock::new(60.0).with_frame_limit(601);
        let summary = fl.run(&mut clock, u64::MAX).unwrap();
        assert_eq!(summary.frames, 601);
        assert!(summary.transitions >= 2);
        assert!(summary.max_angle <= std::f32::consts::PI);
    }
}
