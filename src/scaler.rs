use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::canvas::FrameBuffer;

/// Source neighbors and 8.8 fixed-point weight along one axis.
#[derive(Debug, Clone, Default)]
struct AxisLut {
    lo: Vec<usize>,
    hi: Vec<usize>,
    weight: Vec<u32>,
}

impl AxisLut {
    fn build(dst: usize, src: usize) -> Self {
        let step = src as f32 / dst as f32;
        let last = src.saturating_sub(1);
        let mut lut = Self {
            lo: Vec::with_capacity(dst),
            hi: Vec::with_capacity(dst),
            weight: Vec::with_capacity(dst),
        };
        for i in 0..dst {
            let f = i as f32 * step;
            let lo = (f.floor() as usize).min(last);
            lut.lo.push(lo);
            lut.hi.push((lo + 1).min(last));
            lut.weight.push(((f - lo as f32) * 256.0).round().clamp(0.0, 256.0) as u32);
        }
        lut
    }
}

/// Bilinear stretch from the internal frame buffer to the window surface.
///
/// The lookup tables only depend on the two sizes, so they are rebuilt on
/// resize and reused every frame.
#[derive(Debug, Clone, Default)]
pub struct Upscaler {
    dst_w: usize,
    dst_h: usize,
    src_w: usize,
    src_h: usize,
    x: AxisLut,
    y: AxisLut,
}

impl Upscaler {
    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        Self {
            dst_w,
            dst_h,
            src_w,
            src_h,
            x: AxisLut::build(dst_w, src_w),
            y: AxisLut::build(dst_h, src_h),
        }
    }

    pub fn matches(&self, dst_w: usize, dst_h: usize, src: &FrameBuffer) -> bool {
        self.dst_w == dst_w
            && self.dst_h == dst_h
            && self.src_w == src.width
            && self.src_h == src.height
    }

    /// Rows are processed in parallel.
    pub fn blit(&self, dst: &mut [u32], src: &FrameBuffer) {
        let sw = src.width;
        let pixels = &src.pixels;
        dst.par_chunks_mut(self.dst_w)
            .take(self.dst_h)
            .enumerate()
            .for_each(|(y, row)| {
                let row0 = self.y.lo[y] * sw;
                let row1 = self.y.hi[y] * sw;
                let wy = self.y.weight[y];
                for (x, out) in row.iter_mut().enumerate() {
                    let (x0, x1, wx) = (self.x.lo[x], self.x.hi[x], self.x.weight[x]);
                    let top = lerp_color(pixels[row0 + x0], pixels[row0 + x1], wx);
                    let bottom = lerp_color(pixels[row1 + x0], pixels[row1 + x1], wx);
                    *out = lerp_color(top, bottom, wy);
                }
            });
    }
}

#[inline]
fn lerp_color(a: u32, b: u32, w256: u32) -> u32 {
    let inv = 256 - w256;
    // R and B share one multiply (00RR00BB), G goes alone (0000GG00)
    let rb = (((a & 0x00FF00FF) * inv + (b & 0x00FF00FF) * w256) >> 8) & 0x00FF00FF;
    let g = (((a & 0x0000FF00) * inv + (b & 0x0000FF00) * w256) >> 8) & 0x0000FF00;
    rb | g
}
