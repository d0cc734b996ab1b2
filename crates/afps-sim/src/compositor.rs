//! Display-lag compositor.
//!
//! With `lag_frames == 0` the scene renders straight to the output. With
//! `lag_frames > 0` each frame renders into one slot of a ring of
//! `lag_frames + 1` off-screen targets and the oldest slot is presented,
//! so the player sees every frame exactly `lag_frames` ticks late.

use log::{debug, info, warn};

use afps_core::collab::RenderDevice;
use afps_core::constants::MAX_DISPLAY_LAG_FRAMES;
use afps_core::enums::{CompositorState, ImageFormat};
use afps_core::types::RenderTargetId;

#[derive(Debug, Clone, Default)]
pub struct DisplayLagCompositor {
    lag_frames: usize,
    /// Grown on demand, never shrunk.
    buffers: Vec<RenderTargetId>,
    current_index: usize,
    format: ImageFormat,
    /// Ring depth fixed by `begin_frame`, awaiting `end_frame`.
    rendering: Option<usize>,
}

impl DisplayLagCompositor {
    pub fn new(lag_frames: i32) -> Self {
        let mut compositor = Self::default();
        compositor.set_lag_frames(lag_frames);
        compositor
    }

    /// Change the delay depth. Negative values clamp to 0, large ones to
    /// `MAX_DISPLAY_LAG_FRAMES`. Buffers are allocated at the next frame.
    pub fn set_lag_frames(&mut self, frames: i32) {
        let clamped = frames.clamp(0, MAX_DISPLAY_LAG_FRAMES as i32) as usize;
        if clamped as i32 != frames {
            warn!("display lag {frames} clamped to {clamped}");
        }
        if clamped != self.lag_frames {
            info!("display lag {} -> {clamped} frames", self.lag_frames);
        }
        self.lag_frames = clamped;
        self.current_index = self.current_index.min(self.lag_frames);
    }

    pub fn lag_frames(&self) -> usize {
        self.lag_frames
    }

    pub fn state(&self) -> CompositorState {
        if self.lag_frames == 0 {
            CompositorState::Disabled
        } else {
            CompositorState::Buffering
        }
    }

    pub fn buffer_len(&self) -> usize {
        self.buffers.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn buffers(&self) -> &[RenderTargetId] {
        &self.buffers
    }

    /// Redirect rendering into the current slot when buffering. Returns the
    /// slot's target, or `None` when rendering goes straight to the output.
    pub fn begin_frame<D: RenderDevice + ?Sized>(&mut self, device: &mut D) -> Option<RenderTargetId> {
        if self.lag_frames == 0 {
            self.rendering = None;
            return None;
        }

        // One slot more than the delay depth holds the frame being rendered.
        let (width, height) = (device.width(), device.height());
        while self.buffers.len() <= self.lag_frames {
            let label = format!("Delay buffer {}", self.buffers.len());
            let target = device.create_empty(&label, width, height, self.format);
            debug!("allocated {label}");
            self.buffers.push(target);
        }

        self.current_index = self.current_index.min(self.lag_frames);
        let target = self.buffers[self.current_index];
        device.push_target(target);
        self.rendering = Some(self.lag_frames + 1);
        Some(target)
    }

    /// Restore the output, advance the ring and present the oldest frame.
    /// Returns the presented target, `None` in direct mode.
    pub fn end_frame<D: RenderDevice + ?Sized>(&mut self, device: &mut D) -> Option<RenderTargetId> {
        let depth = self.rendering.take()?.min(self.buffers.len());
        device.pop_target();

        // Lag changes made mid-frame apply from the next begin_frame.
        let next = (self.current_index + 1) % depth;
        let oldest = self.buffers[next];
        self.current_index = next.min(self.lag_frames);
        device.present(oldest);
        Some(oldest)
    }

    /// Run `draw` wrapped in `begin_frame`/`end_frame`.
    pub fn render<D, F>(&mut self, device: &mut D, draw: F) -> Option<RenderTargetId>
    where
        D: RenderDevice + ?Sized,
        F: FnOnce(&mut D),
    {
        self.begin_frame(device);
        draw(device);
        self.end_frame(device)
    }
}
