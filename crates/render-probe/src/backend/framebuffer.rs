//! In-memory double-buffered window shared by the built-in backends.
//!
//! Uploads land in a back buffer; presenting copies it to the front buffer
//! after checking the surface limits a backend advertised. A present that
//! violates them records the error instead of presenting.

use std::sync::Arc;

use displaykit_common::error::{DisplaykitError, DisplaykitResult};
use displaykit_platform_core::Rect;
use serde::{Deserialize, Serialize};

use super::{ClientWindow, PaintCallback, WindowSpec};
use crate::host::HostContext;

/// Pixel depths a surface can be created with. `0` is the default depth.
pub const SUPPORTED_PIXEL_DEPTHS: &[u32] = &[0, 16, 24, 30, 32];

/// Layout of uploaded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    #[serde(rename = "BGRX")]
    Bgrx,
    #[serde(rename = "BGRA")]
    Bgra,
    #[serde(rename = "RGB")]
    Rgb,
}

impl PixelFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::Bgrx => "BGRX",
            PixelFormat::Bgra => "BGRA",
            PixelFormat::Rgb => "RGB",
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.as_str().len()
    }
}

/// Raw image data for one paint.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub pixel_format: PixelFormat,
    /// Encoding name, `rgb32` for 4-byte formats.
    pub coding: &'static str,
    pub data: Vec<u8>,
}

impl ImageBuffer {
    /// A `width`x`height` image with every byte set to `fill`.
    pub fn filled(width: usize, height: usize, pixel_format: PixelFormat, fill: u8) -> Self {
        let stride = pixel_format.bytes_per_pixel() * width;
        let coding = if pixel_format.bytes_per_pixel() == 4 {
            "rgb32"
        } else {
            "rgb24"
        };
        Self {
            width,
            height,
            stride,
            pixel_format,
            coding,
            data: vec![fill; stride * height],
        }
    }
}

/// Limits a backend places on its surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceLimits {
    pub max_texture_size: u32,
}

/// Window drawing into host memory, presented by copy.
pub struct FramebufferWindow {
    host: Arc<dyn HostContext>,
    spec: WindowSpec,
    limits: SurfaceLimits,
    back: Vec<u8>,
    front: Vec<u8>,
    realized: bool,
    shown: bool,
    destroyed: bool,
    presented_frames: u64,
    last_present_error: Option<String>,
}

const SURFACE_BPP: usize = 4;

impl FramebufferWindow {
    pub fn new(host: Arc<dyn HostContext>, spec: WindowSpec, limits: SurfaceLimits) -> Self {
        Self {
            host,
            spec,
            limits,
            back: Vec::new(),
            front: Vec::new(),
            realized: false,
            shown: false,
            destroyed: false,
            presented_frames: 0,
            last_present_error: None,
        }
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Front buffer bytes for the pixel at `(x, y)`.
    pub fn front_pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        let offset = (y * self.width() + x) * SURFACE_BPP;
        self.front.get(offset..offset + SURFACE_BPP)
    }

    fn width(&self) -> usize {
        self.spec.width.max(0) as usize
    }

    fn height(&self) -> usize {
        self.spec.height.max(0) as usize
    }

    fn upload(&mut self, region: Rect, image: &ImageBuffer) -> DisplaykitResult<()> {
        let bpp = image.pixel_format.bytes_per_pixel();
        if region.width < 0 || region.height < 0 {
            return Err(DisplaykitError::render(format!("negative paint region {region:?}")));
        }
        if !region.is_within(&Rect::full(self.spec.width, self.spec.height)) {
            return Err(DisplaykitError::render(format!(
                "paint region {region:?} outside {}x{} window",
                self.spec.width, self.spec.height
            )));
        }
        let (rw, rh) = (region.width as usize, region.height as usize);
        if image.width < rw || image.height < rh {
            return Err(DisplaykitError::render(format!(
                "{}x{} image cannot fill a {rw}x{rh} region",
                image.width, image.height
            )));
        }
        if image.stride < image.width * bpp || image.data.len() < image.stride * image.height {
            return Err(DisplaykitError::render(format!(
                "image data too short: {} bytes, stride {}",
                image.data.len(),
                image.stride
            )));
        }

        let width = self.width();
        for row in 0..rh {
            let src = &image.data[row * image.stride..];
            let dst_row = (region.y as usize + row) * width;
            for col in 0..rw {
                let s = &src[col * bpp..col * bpp + bpp];
                let d = (dst_row + region.x as usize + col) * SURFACE_BPP;
                let alpha = match image.pixel_format {
                    PixelFormat::Bgra => s[3],
                    _ => 0xff,
                };
                let pixel = match image.pixel_format {
                    PixelFormat::Rgb => [s[2], s[1], s[0], alpha],
                    PixelFormat::Bgrx | PixelFormat::Bgra => [s[0], s[1], s[2], alpha],
                };
                self.back[d..d + SURFACE_BPP].copy_from_slice(&pixel);
            }
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), String> {
        if !SUPPORTED_PIXEL_DEPTHS.contains(&self.spec.pixel_depth) {
            return Err(format!(
                "unsupported pixel depth {}",
                self.spec.pixel_depth
            ));
        }
        let max = self.limits.max_texture_size as i32;
        if self.spec.width > max || self.spec.height > max {
            return Err(format!(
                "window size {}x{} exceeds maximum texture size {}",
                self.spec.width, self.spec.height, max
            ));
        }
        self.front.copy_from_slice(&self.back);
        self.presented_frames += 1;
        Ok(())
    }
}

impl ClientWindow for FramebufferWindow {
    fn realize(&mut self) -> DisplaykitResult<()> {
        if self.destroyed {
            return Err(DisplaykitError::render("window already destroyed"));
        }
        if self.spec.width <= 0 || self.spec.height <= 0 {
            return Err(DisplaykitError::render(format!(
                "invalid window size {}x{}",
                self.spec.width, self.spec.height
            )));
        }
        let len = self.width() * self.height() * SURFACE_BPP;
        self.back = vec![0; len];
        self.front = vec![0; len];
        self.realized = true;
        Ok(())
    }

    fn show(&mut self) -> DisplaykitResult<()> {
        if !self.realized {
            self.realize()?;
        }
        self.shown = true;
        Ok(())
    }

    fn draw_region(
        &mut self,
        region: Rect,
        image: ImageBuffer,
        callback: PaintCallback<'_>,
    ) -> DisplaykitResult<()> {
        if !self.realized {
            return Err(DisplaykitError::render("draw on a window that was never realized"));
        }
        let (x, y) = self.host.to_server(region.x, region.y);
        tracing::trace!(
            x,
            y,
            width = region.width,
            height = region.height,
            coding = image.coding,
            pixel_format = image.pixel_format.as_str(),
            "Painting region"
        );
        self.upload(region, &image)?;

        let (success, message) = match self.present() {
            Ok(()) => {
                self.last_present_error = None;
                (true, String::new())
            }
            Err(e) => {
                tracing::debug!(error = %e, "Present failed");
                self.last_present_error = Some(e.clone());
                (false, e)
            }
        };
        self.host
            .idle_add(Box::new(move || callback(success, &message)));
        Ok(())
    }

    fn last_present_error(&self) -> Option<String> {
        self.last_present_error.clone()
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.back = Vec::new();
        self.front = Vec::new();
        self.realized = false;
        self.shown = false;
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::WindowBorder;
    use crate::host::FakeHost;
    use std::cell::RefCell;

    fn spec(width: i32, height: i32, pixel_depth: u32) -> WindowSpec {
        WindowSpec {
            x: -100,
            y: -100,
            width,
            height,
            has_alpha: true,
            border: WindowBorder::default(),
            max_window_size: (1024, 1024),
            pixel_depth,
        }
    }

    fn window(spec: WindowSpec) -> FramebufferWindow {
        FramebufferWindow::new(
            Arc::new(FakeHost),
            spec,
            SurfaceLimits {
                max_texture_size: 512,
            },
        )
    }

    #[test]
    fn bgrx_fill_reaches_front_buffer() {
        let mut w = window(spec(4, 4, 24));
        w.realize().unwrap();
        let result = RefCell::new(None);
        w.draw_region(
            Rect::full(4, 4),
            ImageBuffer::filled(4, 4, PixelFormat::Bgrx, 0x80),
            Box::new(|ok, msg| *result.borrow_mut() = Some((ok, msg.to_string()))),
        )
        .unwrap();

        assert_eq!(result.into_inner(), Some((true, String::new())));
        assert_eq!(w.front_pixel(3, 3), Some(&[0x80, 0x80, 0x80, 0xff][..]));
        assert_eq!(w.presented_frames(), 1);
    }

    #[test]
    fn filled_image_layout() {
        let image = ImageBuffer::filled(250, 250, PixelFormat::Bgrx, 0x7f);
        assert_eq!(image.stride, 1000);
        assert_eq!(image.coding, "rgb32");
        assert_eq!(image.data.len(), 250_000);
    }

    #[test]
    fn unsupported_depth_fails_present() {
        let mut w = window(spec(4, 4, 8));
        w.realize().unwrap();
        let result = RefCell::new(None);
        w.draw_region(
            Rect::full(4, 4),
            ImageBuffer::filled(4, 4, PixelFormat::Bgrx, 1),
            Box::new(|ok, msg| *result.borrow_mut() = Some((ok, msg.to_string()))),
        )
        .unwrap();

        assert_eq!(w.last_present_error().as_deref(), Some("unsupported pixel depth 8"));
        assert_eq!(result.into_inner().map(|(ok, _)| ok), Some(false));
        assert_eq!(w.presented_frames(), 0);
    }

    #[test]
    fn oversized_window_fails_present() {
        let mut w = window(spec(600, 10, 24));
        w.realize().unwrap();
        w.draw_region(
            Rect::full(600, 10),
            ImageBuffer::filled(600, 10, PixelFormat::Bgrx, 1),
            Box::new(|_, _| {}),
        )
        .unwrap();
        assert!(w
            .last_present_error()
            .is_some_and(|e| e.contains("maximum texture size 512")));
    }

    #[test]
    fn short_image_is_rejected() {
        let mut w = window(spec(4, 4, 24));
        w.realize().unwrap();
        let mut image = ImageBuffer::filled(4, 4, PixelFormat::Bgrx, 1);
        image.data.truncate(10);
        assert!(w.draw_region(Rect::full(4, 4), image, Box::new(|_, _| {})).is_err());
    }

    #[test]
    fn draw_before_realize_is_an_error() {
        let mut w = window(spec(4, 4, 24));
        let image = ImageBuffer::filled(4, 4, PixelFormat::Bgrx, 1);
        assert!(w.draw_region(Rect::full(4, 4), image, Box::new(|_, _| {})).is_err());
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut w = window(spec(4, 4, 24));
        w.show().unwrap();
        assert!(w.is_shown());
        w.destroy();
        w.destroy();
        assert!(w.is_destroyed());
        assert!(w.realize().is_err());
    }
}
