/// Pixel size of the off-screen portal target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetSize {
    pub width: u32,
    pub height: u32,
}

impl RenderTargetSize {
    /// Never smaller than one pixel per side.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Size for a window of `width`×`height` logical pixels.
    ///
    /// The device pixel ratio is capped at `max_pixel_ratio`; a missing or
    /// non-positive ratio counts as 1. Degenerate window sizes clamp to one pixel.
    pub fn for_window(width: f32, height: f32, device_pixel_ratio: f32, max_pixel_ratio: f32) -> Self {
        let ratio = if device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(max_pixel_ratio)
        } else {
            1.0
        };
        Self {
            width: scaled(width, ratio),
            height: scaled(height, ratio),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

fn scaled(dimension: f32, ratio: f32) -> u32 {
    // NaN falls through `max` to 1; the cast saturates.
    (dimension * ratio).floor().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(
            RenderTargetSize::for_window(800.0, 600.0, 3.0, 2.0),
            RenderTargetSize::new(1600, 1200)
        );
        assert_eq!(
            RenderTargetSize::for_window(801.0, 601.0, 1.5, 2.0),
            RenderTargetSize::new(1201, 901)
        );
    }

    #[test]
    fn degenerate_windows_clamp_to_one_pixel() {
        assert_eq!(
            RenderTargetSize::for_window(0.0, -20.0, 2.0, 2.0),
            RenderTargetSize::new(1, 1)
        );
        assert_eq!(
            RenderTargetSize::for_window(f32::NAN, 10.0, 0.0, 2.0),
            RenderTargetSize::new(1, 10)
        );
        assert_eq!(RenderTargetSize::new(0, 0), RenderTargetSize { width: 1, height: 1 });
    }
}
