//! Software render device.
//!
//! Render targets are plain pixel buffers. "Rendering a frame" writes a
//! pattern derived from a caller-supplied tag into whatever target is
//! currently bound, so tests can tell presented frames apart bit for bit.

use log::warn;

use afps_core::collab::RenderDevice;
use afps_core::enums::ImageFormat;
use afps_core::types::RenderTargetId;

/// A labelled image.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(label: &str, width: u32, height: u32, format: ImageFormat) -> Self {
        Self {
            label: label.to_string(),
            width,
            height,
            format,
            pixels: vec![0; width as usize * height as usize * format.bytes_per_pixel()],
        }
    }

    /// Fill with the pattern for `tag`.
    pub fn fill_tagged(&mut self, tag: u64) {
        let bytes = tag.to_le_bytes();
        for (i, px) in self.pixels.iter_mut().enumerate() {
            *px = bytes[i % 8] ^ (i as u8);
        }
    }

    /// Recover the tag written by `fill_tagged`. Needs at least 8 bytes.
    pub fn tag(&self) -> Option<u64> {
        if self.pixels.len() < 8 {
            return None;
        }
        let mut bytes = [0u8; 8];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = self.pixels[i] ^ (i as u8);
        }
        Some(u64::from_le_bytes(bytes))
    }
}

/// Headless render device with an output image and offscreen targets.
pub struct SoftwareDevice {
    output: PixelBuffer,
    targets: Vec<PixelBuffer>,
    stack: Vec<RenderTargetId>,
    present_count: u64,
}

impl SoftwareDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            output: PixelBuffer::new("output", width, height, ImageFormat::Rgb8),
            targets: Vec::new(),
            stack: Vec::new(),
            present_count: 0,
        }
    }

    /// Render a frame into the bound destination.
    pub fn draw_frame(&mut self, tag: u64) {
        self.bound_mut().fill_tagged(tag);
    }

    pub fn output(&self) -> &PixelBuffer {
        &self.output
    }

    pub fn target(&self, id: RenderTargetId) -> Option<&PixelBuffer> {
        self.targets.get(id.0 as usize)
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Depth of the redirection stack (0 = rendering to the output).
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn present_count(&self) -> u64 {
        self.present_count
    }

    fn bound_mut(&mut self) -> &mut PixelBuffer {
        match self.stack.last() {
            Some(id) if (id.0 as usize) < self.targets.len() => &mut self.targets[id.0 as usize],
            _ => &mut self.output,
        }
    }
}

impl RenderDevice for SoftwareDevice {
    fn width(&self) -> u32 {
        self.output.width
    }

    fn height(&self) -> u32 {
        self.output.height
    }

    fn create_empty(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> RenderTargetId {
        self.targets
            .push(PixelBuffer::new(label, width, height, format));
        RenderTargetId(self.targets.len() as u32 - 1)
    }

    fn push_target(&mut self, target: RenderTargetId) {
        if target.0 as usize >= self.targets.len() {
            warn!("push of unknown render target {}", target.0);
        }
        self.stack.push(target);
    }

    fn pop_target(&mut self) {
        if self.stack.pop().is_none() {
            warn!("pop_target with nothing pushed");
        }
    }

    fn present(&mut self, target: RenderTargetId) {
        let Some(source) = self.targets.get(target.0 as usize) else {
            warn!("present of unknown render target {}", target.0);
            return;
        };
        let pixels = source.pixels.clone();
        let dest = self.bound_mut();
        let n = dest.pixels.len().min(pixels.len());
        dest.pixels[..n].copy_from_slice(&pixels[..n]);
        self.present_count += 1;
    }

    fn render_scene(&mut self, frame_index: u64) {
        self.draw_frame(frame_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trips_through_pixels() {
        let mut buffer = PixelBuffer::new("t", 4, 4, ImageFormat::Rgb8);
        buffer.fill_tagged(0xDEAD_BEEF_1234);
        assert_eq!(buffer.tag(), Some(0xDEAD_BEEF_1234));
    }

    #[test]
    fn test_push_redirects_drawing() {
        let mut device = SoftwareDevice::new(4, 4);
        let target = device.create_empty("Delay buffer 0", 4, 4, ImageFormat::Rgb8);
        device.draw_frame(1);
        device.push_target(target);
        device.draw_frame(2);
        device.pop_target();

        assert_eq!(device.output().tag(), Some(1));
        assert_eq!(device.target(target).unwrap().tag(), Some(2));
        assert_eq!(device.stack_depth(), 0);
    }

    #[test]
    fn test_present_copies_target_to_output() {
        let mut device = SoftwareDevice::new(4, 4);
        let target = device.create_empty("Delay buffer 0", 4, 4, ImageFormat::Rgb8);
        device.push_target(target);
        device.draw_frame(7);
        device.pop_target();
        device.present(target);
        assert_eq!(device.output().tag(), Some(7));
        assert_eq!(device.present_count(), 1);
    }
}
