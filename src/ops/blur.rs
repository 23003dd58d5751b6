use crate::foundation::error::{WeaselError, WeaselResult};
use crate::frame::model::Frame;

use super::{copy, prepare};

/// One-dimensional Gaussian weights for `sigma`, centre tap in the middle.
///
/// The tap count is `int(6 * sigma)` rounded up to even (at least 2), plus the centre, with the
/// radius capped at `max_radius`. Weights are unnormalized; the blur divides by the sum of the taps
/// that land inside the frame.
pub fn gauss_kernel(sigma: f32, max_radius: usize) -> Vec<f32> {
    let width = (6.0 * f64::from(sigma)) as u64;
    let radius = usize::try_from(width.div_ceil(2).max(1))
        .unwrap_or(usize::MAX)
        .min(max_radius.max(1));
    let denom = 2.0 * sigma * sigma;
    let r = radius as f32;
    (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - r;
            (-(d * d) / denom).exp()
        })
        .collect()
}

/// Separable Gaussian blur. A non-positive `sigma` copies the frame unchanged.
pub fn gauss_blur(src: &Frame, dst: &mut Frame, sigma: f32) -> WeaselResult<()> {
    let extent = prepare(src, dst, "gauss blur")?;
    if sigma.is_nan() || sigma <= 0.0 {
        return copy(src, dst);
    }
    // Taps further out than the frame never land inside it.
    let kernel = gauss_kernel(sigma, extent.width.max(extent.height) as usize);
    let (w, h) = (extent.width as usize, extent.height as usize);
    let mut tmp = vec![0.0f32; w * h];
    horizontal_pass(src.pixels(), &mut tmp, w, h, &kernel);
    vertical_pass(&tmp, dst.pixels_mut(), w, h, &kernel);
    Ok(())
}

fn horizontal_pass(src: &[f32], dst: &mut [f32], w: usize, h: usize, k: &[f32]) {
    let radius = (k.len() / 2) as isize;
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let (mut acc, mut total) = (0.0f32, 0.0f32);
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x as isize + ki as isize - radius;
                if sx >= 0 && (sx as usize) < w {
                    acc += row[sx as usize] * kw;
                    total += kw;
                }
            }
            dst[y * w + x] = acc / total;
        }
    }
}

fn vertical_pass(src: &[f32], dst: &mut [f32], w: usize, h: usize, k: &[f32]) {
    let radius = (k.len() / 2) as isize;
    for y in 0..h {
        for x in 0..w {
            let (mut acc, mut total) = (0.0f32, 0.0f32);
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y as isize + ki as isize - radius;
                if sy >= 0 && (sy as usize) < h {
                    acc += src[sy as usize * w + x] * kw;
                    total += kw;
                }
            }
            dst[y * w + x] = acc / total;
        }
    }
}

/// `(v - k * mean4) / (1 - k)` using the four direct neighbours. The one-pixel border is copied.
pub fn sharpen(src: &Frame, dst: &mut Frame, k: f32) -> WeaselResult<()> {
    let denom = 1.0 - k;
    if denom == 0.0 {
        return Err(WeaselError::execution("sharpen factor must not be 1.0"));
    }
    copy(src, dst)?;
    let (w, h) = (src.width() as usize, src.height() as usize);
    let px = src.pixels();
    let out = dst.pixels_mut();
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let i = y * w + x;
            let mean4 = (px[i - w] + px[i + w] + px[i - 1] + px[i + 1]) / 4.0;
            out[i] = (px[i] - k * mean4) / denom;
        }
    }
    Ok(())
}

/// Unsharp masking: `v + amount * (v - blur(v, sigma))`.
pub fn unsharp_mask(src: &Frame, dst: &mut Frame, sigma: f32, amount: f32) -> WeaselResult<()> {
    gauss_blur(src, dst, sigma)?;
    for (o, &v) in dst.pixels_mut().iter_mut().zip(src.pixels()) {
        *o = v + amount * (v - *o);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/ops/blur.rs"]
mod tests;
