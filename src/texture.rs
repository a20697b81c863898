//! Single-slot presentation target.

use std::sync::Arc;

use image::RgbaImage;

/// The texture presented frames are published to.
///
/// Holds at most one image. Every publish replaces the previous one; readers
/// see whatever was published last.
#[derive(Clone, Debug, Default)]
pub struct Texture {
    image: Option<Arc<RgbaImage>>,
    revision: u64,
}

impl Texture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current image with `rgba` pixels of the given size.
    ///
    /// Panics if `rgba` does not hold exactly `width * height * 4` bytes.
    pub fn publish(&mut self, rgba: Vec<u8>, width: u32, height: u32) {
        let len = rgba.len();
        let Some(image) = RgbaImage::from_raw(width, height, rgba) else {
            panic!("cannot publish {len} bytes as a {width}x{height} RGBA texture");
        };
        assert_eq!(len, width as usize * height as usize * 4, "texture publish size mismatch");
        self.image = Some(Arc::new(image));
        self.revision += 1;
    }

    /// The last published image.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_deref()
    }

    /// Shared handle to the last published image.
    ///
    /// The snapshot stays valid after later publishes.
    pub fn snapshot(&self) -> Option<Arc<RgbaImage>> {
        self.image.clone()
    }

    /// Number of publishes so far.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Size of the last published image, or (0, 0).
    pub fn dimensions(&self) -> (u32, u32) {
        self.image().map(|img| img.dimensions()).unwrap_or((0, 0))
    }
}

/// Web-specific presentation.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use wasm_bindgen::{Clamped, JsCast};
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

    /// Draw the texture's current image onto `canvas`.
    ///
    /// The canvas is resized to the image. Returns `Ok(false)` when nothing
    /// has been published yet.
    pub fn draw_to_canvas(texture: &Texture, canvas: &HtmlCanvasElement) -> Result<bool, String> {
        let Some(image) = texture.image() else {
            return Ok(false);
        };
        let (width, height) = image.dimensions();
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx = canvas
            .get_context("2d")
            .map_err(|_| "Failed to get 2d context")?
            .ok_or("No 2d context available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;

        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(image.as_raw().as_slice()), width, height)
            .map_err(|_| "Failed to create ImageData")?;
        ctx.put_image_data(&data, 0.0, 0.0)
            .map_err(|_| "Failed to put image data")?;
        Ok(true)
    }
}
