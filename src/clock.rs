//! 帧时钟
//!
//! 宿主每帧提供一个单调递增的毫秒时间戳，这里把它换算成帧间隔。
//! 暂停时清空上一帧时间，恢复后第一帧只重新记时，不产生大跨度的时间差。

/// 上一帧时间戳记录
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_time_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录当前时间戳，返回距上一帧的间隔（秒）
    ///
    /// 第一帧（或失效后的第一帧）返回 `None`。
    pub fn tick(&mut self, now_ms: f64) -> Option<f32> {
        let delta = self.last_time_ms.map(|last| {
            if now_ms < last {
                log::warn!("时间戳倒退: {} -> {}", last, now_ms);
                0.0
            } else {
                ((now_ms - last) / 1000.0) as f32
            }
        });
        self.last_time_ms = Some(now_ms);
        delta
    }

    /// 使上一帧时间失效
    pub fn invalidate(&mut self) {
        self.last_time_ms = None;
    }

    pub fn last_time_ms(&self) -> Option<f64> {
        self.last_time_ms
    }
}

/// 时间戳来源（宿主的帧回调）
pub trait ClockSource {
    /// 下一帧的时间戳（毫秒），返回 `None` 表示不再有帧
    fn next_timestamp(&mut self) -> Option<f64>;
}

/// 固定帧率的合成时钟
#[derive(Debug, Clone)]
pub struct FixedRateClock {
    interval_ms: f64,
    frame: u64,
    frame_limit: Option<u64>,
}

impl FixedRateClock {
    pub fn new(fps: f64) -> Self {
        Self {
            interval_ms: 1000.0 / fps,
            frame: 0,
            frame_limit: None,
        }
    }

    /// 限制总帧数
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }
}

impl ClockSource for FixedRateClock {
    fn next_timestamp(&mut self) -> Option<f64> {
        if self.frame_limit.is_some_and(|limit| self.frame >= limit) {
            return None;
        }
        // 用帧号乘间隔，避免累加误差
        let now = self.frame as f64 * self.interval_ms;
        self.frame += 1;
        Some(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_tick_has_no_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1000.0), None);
        assert_relative_eq!(clock.tick(1016.0).unwrap(), 0.016, epsilon = 1e-6);
    }

    #[test]
    fn test_invalidate_drops_stale_time() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.invalidate();
        assert_eq!(clock.last_time_ms(), None);
        // 长时间暂停后恢复，不产生大间隔
        assert_eq!(clock.tick(60_000.0), None);
        assert_relative_eq!(clock.tick(60_010.0).unwrap(), 0.01, epsilon = 1e-6);
    }

    #[test]
    fn test_backwards_timestamp_is_zero() {
        let mut clock = FrameClock::new();
        clock.tick(500.0);
        assert_eq!(clock.tick(400.0), Some(0.0));
    }

    #[test]
    fn test_fixed_rate_clock() {
        let mut clock = FixedRateClock::new(60.0).with_frame_limit(3);
        let stamps: Vec<f64> = std::iter::from_fn(|| clock.next_timestamp()).collect();
        assert_eq!(stamps.len(), 3);
        assert_relative_eq!(stamps[2] - stamps[1], 1000.0 / 60.0, epsilon = 1e-9);
    }
}
