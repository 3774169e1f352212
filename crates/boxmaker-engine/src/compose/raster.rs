use image::{Pixel, Rgba, RgbaImage, imageops};

use crate::coords::TextureSize;
use crate::paint::Rgba8;
use crate::text::GlyphRun;

/// CPU-side RGBA8 raster in texture space (origin top-left, +Y down).
///
/// All drawing is straight-alpha source-over and clips to the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBuffer {
    image: RgbaImage,
}

impl RasterBuffer {
    pub fn new(size: TextureSize, fill: Rgba8) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width, size.height, fill.to_image()),
        }
    }

    pub fn size(&self) -> TextureSize {
        TextureSize::new(self.image.width(), self.image.height())
    }

    pub fn fill(&mut self, color: Rgba8) {
        let px = color.to_image();
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        self.image.get_pixel_checked(x, y).map(|p| Rgba8::from(p.0))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Composites an image with its top-left corner at `(x, y)`.
    pub fn overlay(&mut self, top: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(&mut self.image, top, x, y);
    }

    /// Blends an 8-bit coverage mask tinted with `color`.
    pub fn blend_coverage(&mut self, x: i32, y: i32, width: usize, coverage: &[u8], color: Rgba8) {
        if width == 0 {
            return;
        }
        let (bw, bh) = (self.image.width() as i64, self.image.height() as i64);

        for (row, line) in coverage.chunks_exact(width).enumerate() {
            let py = y as i64 + row as i64;
            if py < 0 || py >= bh {
                continue;
            }
            for (col, &cov) in line.iter().enumerate() {
                let px = x as i64 + col as i64;
                if cov == 0 || px < 0 || px >= bw {
                    continue;
                }
                let a = (color.a as u32 * cov as u32 + 127) / 255;
                let src = Rgba([color.r, color.g, color.b, a as u8]);
                self.image.get_pixel_mut(px as u32, py as u32).blend(&src);
            }
        }
    }

    pub fn draw_glyph_run(&mut self, run: &GlyphRun, color: Rgba8) {
        for g in &run.glyphs {
            self.blend_coverage(g.x, g.y, g.width, &g.coverage, color);
        }
    }

    /// Rows reversed for upload, so texture row 0 is the bottom of the image.
    pub fn flipped_bytes(&self) -> Vec<u8> {
        imageops::flip_vertical(&self.image).into_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(w: u32, h: u32) -> RasterBuffer {
        RasterBuffer::new(TextureSize::new(w, h), Rgba8::BLACK)
    }

    #[test]
    fn new_buffer_is_filled() {
        let b = RasterBuffer::new(TextureSize::new(4, 2), Rgba8::rgb(1, 2, 3));
        assert_eq!(b.pixel(3, 1), Some(Rgba8::rgb(1, 2, 3)));
        assert_eq!(b.pixel(4, 0), None);
    }

    #[test]
    fn full_coverage_replaces_opaque_pixel() {
        let mut b = buf(4, 4);
        b.blend_coverage(1, 1, 2, &[255, 0, 0, 255], Rgba8::WHITE);
        assert_eq!(b.pixel(1, 1), Some(Rgba8::WHITE));
        assert_eq!(b.pixel(2, 1), Some(Rgba8::BLACK));
        assert_eq!(b.pixel(2, 2), Some(Rgba8::WHITE));
    }

    #[test]
    fn coverage_outside_buffer_is_clipped() {
        let mut b = buf(2, 2);
        b.blend_coverage(-1, -1, 3, &[255; 9], Rgba8::WHITE);
        assert_eq!(b.pixel(0, 0), Some(Rgba8::WHITE));
        assert_eq!(b.pixel(1, 1), Some(Rgba8::WHITE));
    }

    #[test]
    fn overlay_respects_source_alpha() {
        let mut b = buf(2, 1);
        let mut top = RgbaImage::new(2, 1);
        top.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        b.overlay(&top, 0, 0);
        assert_eq!(b.pixel(0, 0), Some(Rgba8::rgb(255, 0, 0)));
        assert_eq!(b.pixel(1, 0), Some(Rgba8::BLACK));
    }

    #[test]
    fn flipped_bytes_reverse_rows() {
        let mut b = buf(1, 2);
        b.blend_coverage(0, 0, 1, &[255], Rgba8::WHITE);
        let bytes = b.flipped_bytes();
        assert_eq!(&bytes[0..4], &[0, 0, 0, 255]);
        assert_eq!(&bytes[4..8], &[255, 255, 255, 255]);
    }
}
