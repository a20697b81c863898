//! Channel order conversion between the rasterizer and the texture.

/// Split a native `0xAARRGGBB` pixel into `(r, g, b, a)`.
#[inline]
pub fn unpack_native(pixel: u32) -> (u8, u8, u8, u8) {
    let [b, g, r, a] = pixel.to_le_bytes();
    (r, g, b, a)
}

/// Convert native pixels into tightly packed RGBA bytes.
///
/// In memory this swaps the red and blue bytes of every pixel.
///
/// ## Example
///
/// ```rust
/// use lottie_stream_core::color::native_to_rgba;
///
/// let pixels = [0xff_11_22_33_u32, 0x80_00_00_ff];
/// assert_eq!(
///     native_to_rgba(&pixels),
///     vec![0x11, 0x22, 0x33, 0xff, 0x00, 0x00, 0xff, 0x80]
/// );
/// ```
pub fn native_to_rgba(pixels: &[u32]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(pixels.len() * 4);
    for &pixel in pixels {
        let (r, g, b, a) = unpack_native(pixel);
        rgba.extend_from_slice(&[r, g, b, a]);
    }
    rgba
}
