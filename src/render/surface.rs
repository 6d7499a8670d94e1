use crate::{
    foundation::core::Affine,
    foundation::error::{StarlitError, StarlitResult},
    render::blend::composite_pixel,
    timeline::model::BlendMode,
};

/// Minimal raster-surface contract the compositing algorithm is written
/// against, so the algorithm ports to any 2D raster backend without
/// rewriting.
pub trait RasterSurface: Sized {
    /// Surface dimensions in pixels.
    fn size(&self) -> (u32, u32);

    /// Fresh transparent surface with the same dimensions.
    fn new_like(&self) -> Self;

    /// Premultiplied RGBA8 pixel bytes.
    fn get_pixels(&self) -> &[u8];

    /// Replace all pixel bytes. Length must match `width * height * 4`.
    fn set_pixels(&mut self, data: &[u8]) -> StarlitResult<()>;

    /// Draw `src` through `transform` (source pixel space to destination
    /// pixel space) with `opacity` and `blend`.
    fn draw_transformed_image(
        &mut self,
        src: &Self,
        transform: Affine,
        opacity: f64,
        blend: BlendMode,
    );

    /// Composite an equal-sized surface over this one with `blend`.
    fn composite_with_blend_mode(&mut self, src: &Self, opacity: f64, blend: BlendMode);

    /// Keep destination only where `mask` is opaque (classic alpha
    /// matte, "destination-in").
    fn mask_destination_in(&mut self, mask: &Self);
}

/// Software raster surface: a premultiplied RGBA8 buffer.
///
/// This is both the shared frame buffer the compositor draws into and the
/// scratch target for offscreen mask/deform passes. Not persisted;
/// rebuilt from scratch each evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    /// Wrap an existing premultiplied RGBA8 buffer.
    pub fn from_pixels(width: u32, height: u32, data: Vec<u8>) -> StarlitResult<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(StarlitError::render(
                "surface byte length must be width * height * 4",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Mutable pixel bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixel at integer coordinates; transparent outside bounds.
    pub fn pixel(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return [0, 0, 0, 0];
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Store a pixel; out-of-bounds writes are dropped.
    pub fn put_pixel(&mut self, x: i64, y: i64, px: [u8; 4]) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data[idx..idx + 4].copy_from_slice(&px);
    }

    /// Fill with a premultiplied color.
    pub fn fill(&mut self, px: [u8; 4]) {
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Bilinear sample at fractional source coordinates. Samples outside
    /// the surface clamp to the edge; fully out-of-range coordinates are
    /// handled by the caller's coverage test.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> [u8; 4] {
        let max_x = f64::from(self.width.saturating_sub(1));
        let max_y = f64::from(self.height.saturating_sub(1));
        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);

        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let x0 = x0 as i64;
        let y0 = y0 as i64;

        let p00 = self.pixel(x0, y0);
        let p10 = self.pixel(x0 + 1, y0);
        let p01 = self.pixel(x0, y0 + 1);
        let p11 = self.pixel(x0 + 1, y0 + 1);

        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
            let bottom = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

impl RasterSurface for Surface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn new_like(&self) -> Self {
        Self::new(self.width, self.height)
    }

    fn get_pixels(&self) -> &[u8] {
        &self.data
    }

    fn set_pixels(&mut self, data: &[u8]) -> StarlitResult<()> {
        if data.len() != self.data.len() {
            return Err(StarlitError::render(
                "set_pixels length mismatch against surface size",
            ));
        }
        self.data.copy_from_slice(data);
        Ok(())
    }

    fn draw_transformed_image(
        &mut self,
        src: &Self,
        transform: Affine,
        opacity: f64,
        blend: BlendMode,
    ) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 || src.width == 0 || src.height == 0 {
            return;
        }

        // Destination bounding box of the transformed source rect.
        let corners = [
            transform * kurbo::Point::new(0.0, 0.0),
            transform * kurbo::Point::new(f64::from(src.width), 0.0),
            transform * kurbo::Point::new(0.0, f64::from(src.height)),
            transform * kurbo::Point::new(f64::from(src.width), f64::from(src.height)),
        ];
        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        let x0 = (min_x.floor().max(0.0)) as i64;
        let y0 = (min_y.floor().max(0.0)) as i64;
        let x1 = (max_x.ceil().min(f64::from(self.width))) as i64;
        let y1 = (max_y.ceil().min(f64::from(self.height))) as i64;
        if x1 <= x0 || y1 <= y0 {
            return;
        }

        let det = transform.determinant();
        if det.abs() < 1e-12 {
            return;
        }
        let inverse = transform.inverse();
        let src_w = f64::from(src.width);
        let src_h = f64::from(src.height);

        for y in y0..y1 {
            for x in x0..x1 {
                // Inverse-map the destination pixel center into source space.
                let p = inverse * kurbo::Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if p.x < 0.0 || p.y < 0.0 || p.x >= src_w || p.y >= src_h {
                    continue;
                }
                let mut s = src.sample_bilinear(p.x - 0.5, p.y - 0.5);
                if opacity < 1.0 {
                    for c in &mut s {
                        *c = (f64::from(*c) * opacity).round() as u8;
                    }
                }
                if s[3] == 0 {
                    continue;
                }
                let d = self.pixel(x, y);
                self.put_pixel(x, y, composite_pixel(d, s, blend));
            }
        }
    }

    fn composite_with_blend_mode(&mut self, src: &Self, opacity: f64, blend: BlendMode) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 || src.data.len() != self.data.len() {
            return;
        }
        for (d, s) in self.data.chunks_exact_mut(4).zip(src.data.chunks_exact(4)) {
            let mut sp = [s[0], s[1], s[2], s[3]];
            if opacity < 1.0 {
                for c in &mut sp {
                    *c = (f64::from(*c) * opacity).round() as u8;
                }
            }
            if sp[3] == 0 && blend == BlendMode::Normal {
                continue;
            }
            let out = composite_pixel([d[0], d[1], d[2], d[3]], sp, blend);
            d.copy_from_slice(&out);
        }
    }

    fn mask_destination_in(&mut self, mask: &Self) {
        if mask.data.len() != self.data.len() {
            return;
        }
        for (d, m) in self.data.chunks_exact_mut(4).zip(mask.data.chunks_exact(4)) {
            let ma = u16::from(m[3]);
            for c in d.iter_mut() {
                *c = crate::foundation::math::mul_div255(u16::from(*c), ma);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
