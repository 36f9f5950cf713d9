//! Frame timing for the fixed-step game loop

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Turns host frame timestamps into a number of fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    /// Last accepted host timestamp (ms)
    last_time: Option<f64>,
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the origin; the next `advance` measures from here
    pub fn begin(&mut self, now_ms: f64) {
        self.last_time = Some(now_ms);
        self.accumulator = 0.0;
    }

    /// Accept a frame timestamp and return how many sim steps to run.
    ///
    /// Non-increasing timestamps count as zero elapsed time; long gaps are
    /// clamped to `MAX_FRAME_DT` and never produce more than `MAX_SUBSTEPS`.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last_time else {
            self.begin(now_ms);
            return 0;
        };

        let dt = if now_ms > last {
            self.last_time = Some(now_ms);
            ((now_ms - last) / 1000.0) as f32
        } else {
            0.0
        };
        self.accumulator += dt.min(MAX_FRAME_DT);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        // Whatever the substep cap left over is dropped, not carried
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }
}
