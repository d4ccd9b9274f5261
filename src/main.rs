//! 无窗口演示：用合成的 60Hz 时钟跑 10 秒，中途暂停 1 秒

use knee_engine::scene::CameraPose;
use knee_engine::{
    FixedRateClock, FrameLoop, InputAction, OrbitCamera, PhysicsConfig, Renderer, Simulation,
    VisualProxy,
};

/// 把代理位姿写进日志的渲染器
struct LogRenderer {
    frame: u64,
    every: u64,
}

impl Renderer for LogRenderer {
    fn render(&mut self, proxies: &[VisualProxy], _camera: &CameraPose) {
        if self.frame % self.every == 0 {
            for (i, proxy) in proxies.iter().enumerate() {
                let t = proxy.transform.translation;
                log::info!(
                    "[帧 {}] 代理[{}] 位置=({:.3},{:.3},{:.3})",
                    self.frame,
                    i,
                    t.x,
                    t.y,
                    t.z
                );
            }
        }
        self.frame += 1;
    }
}

fn main() -> knee_engine::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PhysicsConfig::default();
    let simulation = Simulation::new(&config)?;
    let renderer = LogRenderer { frame: 0, every: 60 };
    let mut frame_loop = FrameLoop::new(simulation, renderer, OrbitCamera::default());
    let mut clock = FixedRateClock::new(60.0);

    let first = frame_loop.run(&mut clock, 240)?;
    frame_loop.handle_input(InputAction::TogglePause);
    let paused = frame_loop.run(&mut clock, 60)?;
    frame_loop.handle_input(InputAction::TogglePause);
    let rest = frame_loop.run(&mut clock, 300)?;

    log::info!(
        "完成: {} 帧, {} 个子步, 电机换向 {} 次, 最大关节角 {:.3} rad, 最终方向 {:?}",
        first.frames + paused.frames + rest.frames,
        first.substeps + paused.substeps + rest.substeps,
        first.transitions + rest.transitions,
        first.max_angle.max(rest.max_angle),
        rest.final_direction
    );
    Ok(())
}
